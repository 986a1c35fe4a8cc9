//! Bearer authorization middleware.

use super::TokenProvider;
use crate::error::Result;
use crate::execution::http::RequestMiddleware;
use crate::types::HttpRequest;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use std::sync::Arc;

/// Sets `Authorization: Bearer <token>` from a [`TokenProvider`] on every
/// attempt, and exposes the provider to the executor for 401 recovery.
#[derive(Clone)]
pub struct BearerAuthMiddleware {
    provider: Arc<dyn TokenProvider>,
}

impl BearerAuthMiddleware {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RequestMiddleware for BearerAuthMiddleware {
    async fn prepare(&self, mut request: HttpRequest) -> Result<HttpRequest> {
        if let Some(token) = self.provider.access_token().await? {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            request.headers.insert(AUTHORIZATION, value);
        }
        Ok(request)
    }

    fn token_provider(&self) -> Option<Arc<dyn TokenProvider>> {
        Some(Arc::clone(&self.provider))
    }
}
