//! Authentication helpers and token providers.
//!
//! A [`TokenProvider`] supplies the bearer token attached to outgoing
//! requests and decides whether a 401 response is recoverable by refreshing
//! that token. [`BearerAuthMiddleware`] plugs a provider into the request
//! pipeline; the executor asks the first middleware exposing a provider to
//! refresh when it observes a 401.

use crate::error::Result;
use crate::types::{HttpRequest, HttpResponse};
use async_trait::async_trait;

pub mod bearer;
pub mod store;

pub use bearer::BearerAuthMiddleware;
pub use store::TokenStore;

/// An asynchronous Bearer token provider.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current token for the `Authorization: Bearer <token>` header, if any.
    async fn access_token(&self) -> Result<Option<String>>;

    /// Inspect a failed response and refresh the token when that can help.
    ///
    /// Returns `true` when the caller should retry the same request with the
    /// (possibly new) token. A failing refresh is returned as the error.
    async fn refresh_token_if_needed(
        &self,
        _request: &HttpRequest,
        _response: &HttpResponse,
        _body: &[u8],
    ) -> Result<bool> {
        Ok(false)
    }
}

/// A static token provider useful for tests and basic scenarios where the
/// token is managed externally. It never refreshes.
pub struct StaticTokenProvider {
    token: secrecy::SecretString,
}

impl StaticTokenProvider {
    /// Create a new static token provider.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: secrecy::SecretString::from(token.into()),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<Option<String>> {
        use secrecy::ExposeSecret;
        Ok(Some(self.token.expose_secret().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[tokio::test]
    async fn static_provider_never_refreshes() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.access_token().await.unwrap().as_deref(), Some("abc"));

        let url = Url::parse("https://api.example.com/me").unwrap();
        let request = HttpRequest::get(url.clone());
        let response = HttpResponse::new(401, Default::default(), url);
        assert!(!provider
            .refresh_token_if_needed(&request, &response, b"")
            .await
            .unwrap());
    }

    #[test]
    fn debug_output_hides_token() {
        let provider = StaticTokenProvider::new("super-secret");
        assert!(!format!("{provider:?}").contains("super-secret"));
    }
}
