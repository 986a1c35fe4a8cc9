//! In-memory token store with single-flight refresh.
//!
//! The first caller that needs a refresh spawns the refresh procedure and
//! parks a shared handle to it in `in_flight`; every caller arriving while it
//! runs awaits that same handle and observes the same token or the same
//! failure. The spawned task updates the token and clears the slot itself,
//! so the refresh finishes even when every waiter has been cancelled.

use super::TokenProvider;
use crate::error::{Result, UrlManagerError};
use crate::types::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

type RefreshFn = Arc<dyn Fn() -> BoxFuture<'static, Result<String>> + Send + Sync>;
type RefreshHandle = Shared<BoxFuture<'static, Result<String>>>;

struct Inner {
    token: RwLock<Option<SecretString>>,
    refresh: Option<RefreshFn>,
    in_flight: Mutex<Option<RefreshHandle>>,
}

/// Process-scoped bearer token holder. Cloning shares the same state.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<Inner>,
}

impl TokenStore {
    /// Create a store holding `initial` and no refresh procedure.
    pub fn new(initial: Option<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: RwLock::new(initial.map(SecretString::from)),
                refresh: None,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Create a store holding `initial` that obtains new tokens with `refresh`.
    pub fn with_refresh_fn<F, Fut>(initial: Option<String>, refresh: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        let refresh: RefreshFn = Arc::new(move || refresh().boxed());
        Self {
            inner: Arc::new(Inner {
                token: RwLock::new(initial.map(SecretString::from)),
                refresh: Some(refresh),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn has_refresh(&self) -> bool {
        self.inner.refresh.is_some()
    }

    /// Replace the stored token.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.inner.token.write().await = token.map(SecretString::from);
    }

    async fn current_token(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .await
            .as_ref()
            .map(|t| t.expose_secret().to_string())
    }

    /// Run the refresh procedure, or join the one already running.
    pub async fn refresh(&self) -> Result<String> {
        let handle = {
            let mut slot = self.inner.in_flight.lock().await;
            match slot.as_ref() {
                Some(running) => running.clone(),
                None => {
                    let refresh = self.inner.refresh.clone().ok_or_else(|| {
                        UrlManagerError::Custom("no token refresh procedure configured".into())
                    })?;
                    let inner = Arc::clone(&self.inner);
                    let task = tokio::spawn(async move {
                        tracing::debug!(target: "url_manager::auth", "refreshing access token");
                        let result = refresh().await;
                        match &result {
                            Ok(token) => {
                                *inner.token.write().await = Some(SecretString::from(token.clone()));
                            }
                            Err(e) => {
                                tracing::warn!(target: "url_manager::auth", error = %e, "token refresh failed");
                            }
                        }
                        inner.in_flight.lock().await.take();
                        result
                    });
                    let handle = async move {
                        match task.await {
                            Ok(result) => result,
                            Err(e) => Err(UrlManagerError::Custom(format!(
                                "token refresh task failed: {e}"
                            ))),
                        }
                    }
                    .boxed()
                    .shared();
                    *slot = Some(handle.clone());
                    handle
                }
            }
        };
        handle.await
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("token", &"[REDACTED]")
            .field("has_refresh", &self.has_refresh())
            .finish()
    }
}

#[async_trait]
impl TokenProvider for TokenStore {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.current_token().await)
    }

    async fn refresh_token_if_needed(
        &self,
        request: &HttpRequest,
        response: &HttpResponse,
        _body: &[u8],
    ) -> Result<bool> {
        if response.status != 401 || !self.has_refresh() {
            return Ok(false);
        }
        // Another call already stored a token this request was not sent with.
        if let Some(current) = self.current_token().await
            && request.bearer_token() != Some(current.as_str())
        {
            return Ok(true);
        }
        self.refresh().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use url::Url;

    fn unauthorized(token: Option<&str>) -> (HttpRequest, HttpResponse) {
        let url = Url::parse("https://api.example.com/me").unwrap();
        let mut request = HttpRequest::get(url.clone());
        if let Some(t) = token {
            request.set_header("authorization", &format!("Bearer {t}")).unwrap();
        }
        (request, HttpResponse::new(401, Default::default(), url))
    }

    fn counting_store(calls: Arc<AtomicUsize>) -> TokenStore {
        TokenStore::with_refresh_fn(Some("old".into()), move || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(format!("new-{n}"))
            }
        })
    }

    #[tokio::test]
    async fn set_and_read_token() {
        let store = TokenStore::default();
        assert_eq!(store.access_token().await.unwrap(), None);
        store.set_access_token(Some("abc".into())).await;
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("abc"));
        store.set_access_token(None).await;
        assert_eq!(store.access_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn refresh_replaces_token() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = counting_store(Arc::clone(&calls));
        let (request, response) = unauthorized(Some("old"));

        assert!(store.refresh_token_if_needed(&request, &response, b"").await.unwrap());
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("new-1"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_refreshes_run_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = counting_store(Arc::clone(&calls));

        let tasks: Vec<_> = (0..5)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.refresh().await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "new-1");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Completed refreshes free the slot for the next one.
        assert_eq!(store.refresh().await.unwrap(), "new-2");
    }

    #[tokio::test(start_paused = true)]
    async fn waiters_share_the_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let store = TokenStore::with_refresh_fn(Some("old".into()), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err(UrlManagerError::Custom("refresh endpoint down".into()))
            }
        });

        let (a, b) = tokio::join!(store.refresh(), store.refresh());
        let expected = UrlManagerError::Custom("refresh endpoint down".into());
        assert_eq!(a.unwrap_err(), expected);
        assert_eq!(b.unwrap_err(), expected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn stale_request_token_skips_refresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = counting_store(Arc::clone(&calls));
        store.set_access_token(Some("already-new".into())).await;

        let (request, response) = unauthorized(Some("old"));
        assert!(store.refresh_token_if_needed(&request, &response, b"").await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn request_without_token_skips_refresh_once_a_token_is_stored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = counting_store(Arc::clone(&calls));

        let (request, response) = unauthorized(None);
        assert!(store.refresh_token_if_needed(&request, &response, b"").await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn request_without_token_refreshes_an_empty_store() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let store = TokenStore::with_refresh_fn(None, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok("first".to_string()) }
        });

        let (request, response) = unauthorized(None);
        assert!(store.refresh_token_if_needed(&request, &response, b"").await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn clones_share_the_refresh_procedure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = counting_store(Arc::clone(&calls));
        let shared = store.clone();

        assert!(shared.has_refresh());
        assert_eq!(shared.refresh().await.unwrap(), "new-1");
        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("new-1"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn only_401_with_refresh_is_recoverable() {
        let plain = TokenStore::new(Some("t".into()));
        let (request, response) = unauthorized(Some("t"));
        assert!(!plain.refresh_token_if_needed(&request, &response, b"").await.unwrap());

        let calls = Arc::new(AtomicUsize::new(0));
        let store = counting_store(Arc::clone(&calls));
        let forbidden = HttpResponse::new(403, Default::default(), response.url.clone());
        assert!(!store.refresh_token_if_needed(&request, &forbidden, b"").await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refresh_without_procedure_fails() {
        let store = TokenStore::new(None);
        assert!(matches!(store.refresh().await, Err(UrlManagerError::Custom(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_completes_after_waiter_is_dropped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = counting_store(Arc::clone(&calls));

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        waiter.abort();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("new-1"));
    }
}
