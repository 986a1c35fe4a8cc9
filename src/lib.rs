//! # URL Manager - HTTP request execution core
//!
//! Turns a declarative request (URL, method, headers, body) into one or more
//! network attempts and a validated, decoded or classified result.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Retry with backoff**: retryable statuses and transport failures are retried with exponential delays.
//! - **Bearer refresh**: a 401 triggers at most one token refresh per call; concurrent refreshes are coalesced.
//! - **Middleware**: ordered `prepare` / `on_receive` hooks around every attempt.
//! - **Classification**: JSON, text or file responses, with `Content-Disposition` file names.
//! - **Multipart uploads**: byte-exact `multipart/form-data` bodies.
//! - **Cancellation**: calls abort promptly through a [`CancelHandle`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use url_manager::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tokens = TokenStore::with_refresh_fn(Some("initial-token".into()), || async {
//!         Ok("fresh-token".to_string())
//!     });
//!
//!     let manager = RequestManager::builder()
//!         .middleware(LoggingMiddleware::new())
//!         .middleware(BearerAuthMiddleware::new(Arc::new(tokens)))
//!         .build()?;
//!
//!     let url = UrlBuilder::new("https://api.example.com")
//!         .adding_path("/v1/items")
//!         .adding_query([("page", "1")])
//!         .build()?;
//!     let items: serde_json::Value = manager.execute_json(HttpRequest::get(url)).await?;
//!     println!("{items}");
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod encoding;
pub mod error;
pub mod execution;
pub mod persistence;
pub mod retry;
pub mod telemetry;
pub mod types;
pub mod url_builder;
pub mod utils;

pub use auth::{BearerAuthMiddleware, StaticTokenProvider, TokenProvider, TokenStore};
pub use encoding::{ClassifyMode, FileUpload, JsonCodec, KeyCase, MultipartForm};
pub use error::{ApiProblem, Result, UrlManagerError, map_server_error};
pub use execution::http::{
    HttpConfig, HttpTransport, HttpTransportResponse, LoggingMiddleware, RequestMiddleware,
    ReqwestTransport, TransportError,
};
pub use execution::{RequestManager, RequestManagerBuilder};
pub use persistence::{DirectoryFileStore, FileStore};
pub use retry::RetryPolicy;
pub use types::{ClassifiedResponse, Endpoint, HttpMethod, HttpRequest, HttpResponse};
pub use url_builder::UrlBuilder;
pub use utils::{CancelHandle, new_cancel_handle};

/// Commonly used types.
pub mod prelude {
    pub use crate::auth::{BearerAuthMiddleware, StaticTokenProvider, TokenProvider, TokenStore};
    pub use crate::encoding::{ClassifyMode, FileUpload, JsonCodec, KeyCase};
    pub use crate::error::{Result, UrlManagerError};
    pub use crate::execution::http::{LoggingMiddleware, RequestMiddleware};
    pub use crate::execution::{RequestManager, RequestManagerBuilder};
    pub use crate::persistence::{DirectoryFileStore, FileStore};
    pub use crate::retry::RetryPolicy;
    pub use crate::types::{ClassifiedResponse, Endpoint, HttpMethod, HttpRequest, HttpResponse};
    pub use crate::url_builder::UrlBuilder;
    pub use crate::utils::CancelHandle;
}
