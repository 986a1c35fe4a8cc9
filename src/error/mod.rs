//! Error Handling Module
//!
//! This module provides the error taxonomy for the request executor:
//! - Core error type (`UrlManagerError`)
//! - Structured server error bodies (`ApiProblem`) and status mapping
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use url_manager::error::{map_server_error, UrlManagerError};
//!
//! let error = map_server_error(404, br#"{"title":"Not Found"}"#);
//! assert_eq!(error.status_code(), Some(404));
//! assert!(!error.is_retryable(&[429, 500, 502, 503, 504]));
//! ```

// Module declarations
mod conversions;
pub mod problem;
pub mod types;

// Re-exports for public API
pub use problem::*;
pub use types::*;
