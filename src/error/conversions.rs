//! Type Conversions for UrlManagerError
//!
//! This module contains From trait implementations for converting
//! common error types into UrlManagerError.

use super::types::UrlManagerError;

impl From<serde_json::Error> for UrlManagerError {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodingError(err.to_string())
    }
}

impl From<url::ParseError> for UrlManagerError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for UrlManagerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for UrlManagerError {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for UrlManagerError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}
