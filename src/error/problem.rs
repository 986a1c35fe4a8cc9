//! Structured server error bodies.
//!
//! Servers that follow the "problem details" convention return a JSON object
//! with optional `type`, `title`, `status`, `detail` and `errors` fields. When
//! a failing response carries such a body, its content becomes the detail of
//! the resulting [`UrlManagerError::ServerError`].

use super::types::UrlManagerError;
use bytes::Bytes;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Wire shape of a structured error body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiProblem {
    #[serde(rename = "type")]
    pub problem_type: Option<String>,
    pub title: Option<String>,
    pub status: Option<i64>,
    pub detail: Option<String>,
    /// Field name to validation messages.
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiProblem {
    /// Parse a body as a problem. Returns `None` unless the body is a JSON
    /// object carrying at least one of `title`, `detail` or `errors`.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let problem: Self = serde_json::from_slice(body).ok()?;
        let has_errors = problem.errors.as_ref().is_some_and(|e| !e.is_empty());
        if problem.title.is_none() && problem.detail.is_none() && !has_errors {
            return None;
        }
        Some(problem)
    }

    /// Human-readable summary: `title: detail`, then field errors.
    pub fn message(&self) -> String {
        let mut parts: Vec<String> = [self.title.as_deref(), self.detail.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let mut message = parts.join(": ");

        if let Some(errors) = &self.errors {
            parts = errors
                .iter()
                .map(|(field, msgs)| format!("{field}: {}", msgs.join(", ")))
                .collect();
            if !parts.is_empty() {
                if !message.is_empty() {
                    message.push_str(" (");
                    message.push_str(&parts.join("; "));
                    message.push(')');
                } else {
                    message = parts.join("; ");
                }
            }
        }
        message
    }
}

/// Map a failing status and its body into a terminal server error.
pub fn map_server_error(status_code: u16, body: impl Into<Bytes>) -> UrlManagerError {
    let body = body.into();
    let detail = ApiProblem::parse(&body)
        .map(|p| p.message())
        .filter(|m| !m.is_empty());
    UrlManagerError::ServerError {
        status_code,
        body,
        detail,
    }
}
