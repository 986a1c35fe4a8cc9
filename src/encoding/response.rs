//! Response classification.
//!
//! Routes a completed body into the JSON, text or file variant based on the
//! response `Content-Type`, extracting a suggested file name from
//! `Content-Disposition` for files.

use crate::error::{Result, UrlManagerError};
use crate::types::{ClassifiedResponse, HttpResponse};
use crate::utils::mime::guess_mime_from_bytes;
use bytes::Bytes;
use reqwest::header::CONTENT_DISPOSITION;

/// How to decide that a non-JSON body is text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifyMode {
    /// Text only when the content type contains `text` and the body is UTF-8.
    #[default]
    ContentType,
    /// Any body that decodes as UTF-8 is text.
    Lenient,
}

/// Classify `body` using the metadata of `response`.
pub fn classify_response(
    body: Bytes,
    response: &HttpResponse,
    mode: ClassifyMode,
) -> Result<ClassifiedResponse> {
    let content_type = response
        .content_type()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if content_type.contains("json") {
        let value: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            UrlManagerError::DecodingError(format!("invalid JSON response body: {e}"))
        })?;
        return Ok(ClassifiedResponse::Json(value));
    }

    let text_allowed = match mode {
        ClassifyMode::ContentType => content_type.contains("text"),
        ClassifyMode::Lenient => true,
    };
    if text_allowed && let Ok(text) = std::str::from_utf8(&body) {
        return Ok(ClassifiedResponse::Text(text.to_string()));
    }

    let mime_type = response.mime_type().or_else(|| guess_mime_from_bytes(&body));
    let suggested_name = response
        .header(CONTENT_DISPOSITION.as_str())
        .and_then(suggested_filename);
    Ok(ClassifiedResponse::File {
        bytes: body,
        mime_type,
        suggested_name,
    })
}

/// Extract the file name from a `Content-Disposition` value.
///
/// `filename*=` (RFC 5987, percent-encoded) wins over `filename=`; quotes
/// are stripped.
pub fn suggested_filename(disposition: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;
    for param in disposition.split(';') {
        let Some((key, value)) = param.trim().split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename" => plain = Some(value.trim().replace('"', "")),
            "filename*" => {
                let value = value.trim().trim_matches('"');
                // charset'language'percent-encoded
                let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
                extended = urlencoding::decode(encoded).ok().map(|s| s.into_owned());
            }
            _ => {}
        }
    }
    extended.or(plain).filter(|name| !name.is_empty())
}
