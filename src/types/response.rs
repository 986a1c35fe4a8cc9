//! Classified response variants.

use bytes::Bytes;

/// A completed response routed by its content type. Exactly one variant holds.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedResponse {
    /// Body parsed as a generic JSON value.
    Json(serde_json::Value),
    /// Body decoded as UTF-8 text.
    Text(String),
    /// Opaque bytes, e.g. a downloaded file.
    File {
        bytes: Bytes,
        mime_type: Option<String>,
        suggested_name: Option<String>,
    },
}

impl ClassifiedResponse {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Suggested file name of a `File` variant.
    pub fn suggested_name(&self) -> Option<&str> {
        match self {
            Self::File { suggested_name, .. } => suggested_name.as_deref(),
            _ => None,
        }
    }
}
