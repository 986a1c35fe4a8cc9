//! Core error types.

use bytes::Bytes;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, UrlManagerError>;

/// Errors surfaced by the request executor and its collaborators.
///
/// The type is `Clone` because a single token refresh failure is handed to
/// every call waiting on that refresh.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UrlManagerError {
    /// The URL could not be composed or parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The transport returned something that is not a usable HTTP response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Non-success status that was not retried, or retries were exhausted.
    #[error("{}", server_error_message(*status_code, body, detail.as_deref()))]
    ServerError {
        status_code: u16,
        body: Bytes,
        /// Human-readable detail extracted from a structured error body.
        detail: Option<String>,
    },

    /// The response body did not match the expected shape.
    #[error("decoding error: {0}")]
    DecodingError(String),

    /// A request body could not be encoded.
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// Transport-level failure (connect, reset, timeout).
    #[error("network error: {0}")]
    NetworkError(String),

    /// A header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Filesystem failure in the persistence collaborator.
    #[error("I/O error: {0}")]
    Io(String),

    /// The logical call was cancelled by the caller.
    #[error("request cancelled")]
    Cancelled,

    /// Catch-all.
    #[error("{0}")]
    Custom(String),
}

const BODY_PREVIEW_LIMIT: usize = 200;

fn server_error_message(status_code: u16, body: &Bytes, detail: Option<&str>) -> String {
    if let Some(detail) = detail {
        return format!("server error (HTTP {status_code}): {detail}");
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return format!("server error (HTTP {status_code})");
    }
    let preview: String = text.chars().take(BODY_PREVIEW_LIMIT).collect();
    if preview.len() < text.len() {
        format!("server error (HTTP {status_code}): {preview}...")
    } else {
        format!("server error (HTTP {status_code}): {preview}")
    }
}

impl UrlManagerError {
    /// Build a server error without structured detail.
    pub fn server_error(status_code: u16, body: impl Into<Bytes>) -> Self {
        Self::ServerError {
            status_code,
            body: body.into(),
            detail: None,
        }
    }

    /// HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ServerError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Raw response body carried by a server error.
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            Self::ServerError { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether the condition would have been retried under the given status set.
    pub fn is_retryable(&self, retryable_status: &[u16]) -> bool {
        match self {
            Self::NetworkError(_) => true,
            Self::ServerError { status_code, .. } => retryable_status.contains(status_code),
            _ => false,
        }
    }

    /// Re-parse the structured problem body of a server error.
    pub fn problem(&self) -> Option<super::ApiProblem> {
        self.body().and_then(|b| super::ApiProblem::parse(b))
    }

    /// Whether this error is a caller cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
