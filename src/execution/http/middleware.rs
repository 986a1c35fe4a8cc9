//! Request middleware
//!
//! Middleware can tweak each attempt's request before it is sent and observe
//! successful responses. Hooks run in registration order and a failing hook
//! aborts the logical call. `prepare` runs on every attempt, so anything it
//! sets (such as a refreshed bearer token) is re-applied after retries.

use crate::auth::TokenProvider;
use crate::error::Result;
use crate::types::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Logging target shared by the executor and [`LoggingMiddleware`].
pub const HTTP_LOG_TARGET: &str = "url_manager::http";

/// Pluggable request/response hook.
#[async_trait]
pub trait RequestMiddleware: Send + Sync {
    /// Called before each attempt. Return the (possibly modified) request or
    /// an error to short-circuit the call.
    async fn prepare(&self, request: HttpRequest) -> Result<HttpRequest> {
        Ok(request)
    }

    /// Called after a 2xx response is received, before decoding.
    async fn on_receive(&self, _body: &[u8], _response: &HttpResponse) -> Result<()> {
        Ok(())
    }

    /// Token provider backing this middleware, if it handles authentication.
    fn token_provider(&self) -> Option<Arc<dyn TokenProvider>> {
        None
    }
}

/// A simple logging middleware backed by `tracing` (no sensitive data unless
/// body logging is turned on).
#[derive(Clone, Debug, Default)]
pub struct LoggingMiddleware {
    log_bodies: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log request and response bodies at `trace` level.
    pub fn with_bodies(mut self) -> Self {
        self.log_bodies = true;
        self
    }
}

#[async_trait]
impl RequestMiddleware for LoggingMiddleware {
    async fn prepare(&self, request: HttpRequest) -> Result<HttpRequest> {
        tracing::debug!(target: HTTP_LOG_TARGET, method=%request.method, url=%request.url, "sending request");
        if self.log_bodies
            && let Some(body) = &request.body
        {
            tracing::trace!(target: HTTP_LOG_TARGET, body=%String::from_utf8_lossy(body), "request body");
        }
        Ok(request)
    }

    async fn on_receive(&self, body: &[u8], response: &HttpResponse) -> Result<()> {
        tracing::debug!(target: HTTP_LOG_TARGET, url=%response.url, status=%response.status, bytes=body.len(), "response received");
        if self.log_bodies {
            tracing::trace!(target: HTTP_LOG_TARGET, body=%String::from_utf8_lossy(body), "response body");
        }
        Ok(())
    }
}
