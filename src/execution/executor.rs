//! Request executor
//!
//! [`RequestManager`] turns one [`HttpRequest`] into zero or more network
//! attempts. Each attempt runs the middleware `prepare` hooks on a fresh copy
//! of the request, sends it, and then either finishes (2xx), refreshes the
//! bearer token once on a 401, waits and retries a retryable outcome, or maps
//! the response into a terminal error.
//!
//! The manager itself is immutable; all per-call state lives in the owned
//! request and in local variables of the call, so one manager can serve any
//! number of concurrent calls.

use crate::auth::TokenProvider;
use crate::encoding::{ClassifyMode, FileUpload, JsonCodec, MultipartForm, classify_response};
use crate::error::{Result, UrlManagerError, map_server_error};
use crate::execution::http::{
    HTTP_LOG_TARGET, HttpConfig, HttpTransport, HttpTransportResponse, ReqwestTransport,
    RequestMiddleware, headers_from_map, merge_headers,
};
use crate::persistence::FileStore;
use crate::retry::RetryPolicy;
use crate::types::{ClassifiedResponse, Endpoint, HttpRequest, HttpResponse};
use crate::url_builder::UrlBuilder;
use crate::utils::CancelHandle;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Name used when a downloaded file carries no suggested name.
const FALLBACK_DOWNLOAD_NAME: &str = "download.bin";

fn delay_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

struct ManagerInner {
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
    middlewares: Vec<Arc<dyn RequestMiddleware>>,
    default_headers: HeaderMap,
    codec: JsonCodec,
    file_store: Option<Arc<dyn FileStore>>,
}

/// Executes requests with retry, token refresh, middleware and decoding.
#[derive(Clone)]
pub struct RequestManager {
    inner: Arc<ManagerInner>,
    cancel: Option<CancelHandle>,
}

impl std::fmt::Debug for RequestManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestManager")
            .field("retry", &self.inner.retry)
            .field("middlewares", &self.inner.middlewares.len())
            .field("default_headers", &self.inner.default_headers)
            .field("codec", &self.inner.codec)
            .field("has_file_store", &self.inner.file_store.is_some())
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

impl RequestManager {
    /// Manager with the default `reqwest` transport and no middleware.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> RequestManagerBuilder {
        RequestManagerBuilder::default()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry
    }

    pub fn codec(&self) -> &JsonCodec {
        &self.inner.codec
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.inner.default_headers
    }

    /// A manager sharing this one's configuration whose calls fail with
    /// `Cancelled` as soon as `handle` is cancelled.
    pub fn with_cancel_handle(&self, handle: CancelHandle) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cancel: Some(handle),
        }
    }

    /// Run the full attempt loop and return the successful body and metadata.
    pub async fn execute(&self, request: HttpRequest) -> Result<(Bytes, HttpResponse)> {
        let mut request = request;
        if !self.inner.default_headers.is_empty() {
            request.headers = merge_headers(&self.inner.default_headers, &request.headers);
        }
        match &self.cancel {
            Some(cancel) => cancel.run(self.attempt_loop(request)).await?,
            None => self.attempt_loop(request).await,
        }
    }

    async fn attempt_loop(&self, request: HttpRequest) -> Result<(Bytes, HttpResponse)> {
        let policy = &self.inner.retry;
        let auth = self.token_provider();
        let mut attempt: u32 = 0;
        let mut refreshed = false;

        loop {
            let prepared = self.prepare(request.clone()).await?;
            tracing::debug!(target: HTTP_LOG_TARGET, method=%prepared.method, url=%prepared.url, attempt, "sending request");

            let sent = match self.inner.transport.send(prepared.clone()).await {
                Ok(sent) => sent,
                Err(err) if policy.has_attempts_left(attempt) => {
                    attempt += 1;
                    let delay = policy.backoff(attempt);
                    tracing::warn!(target: HTTP_LOG_TARGET, url=%prepared.url, attempt, delay_ms=delay_millis(delay), error=%err, "transport failure, retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(err) => return Err(UrlManagerError::NetworkError(err.to_string())),
            };

            if !(100..=599).contains(&sent.status) {
                return Err(UrlManagerError::InvalidResponse(format!(
                    "unrecognised HTTP status {}",
                    sent.status
                )));
            }
            let HttpTransportResponse {
                status,
                headers,
                body,
                url,
            } = sent;
            let response =
                HttpResponse::new(status, headers, url.unwrap_or_else(|| prepared.url.clone()));

            if response.is_success() {
                for middleware in &self.inner.middlewares {
                    middleware.on_receive(&body, &response).await?;
                }
                tracing::debug!(target: HTTP_LOG_TARGET, url=%response.url, status=response.status, attempt, "request succeeded");
                return Ok((body, response));
            }

            if response.status == 401
                && !refreshed
                && let Some(provider) = &auth
                && provider
                    .refresh_token_if_needed(&prepared, &response, &body)
                    .await?
            {
                refreshed = true;
                tracing::warn!(target: HTTP_LOG_TARGET, url=%response.url, "unauthorized, retrying with refreshed token");
                continue;
            }

            if policy.is_retryable(response.status, attempt) {
                attempt += 1;
                let delay = policy.backoff(attempt);
                tracing::warn!(target: HTTP_LOG_TARGET, url=%response.url, status=response.status, attempt, delay_ms=delay_millis(delay), "retryable status, retrying");
                tokio::time::sleep(delay).await;
                continue;
            }

            tracing::debug!(target: HTTP_LOG_TARGET, url=%response.url, status=response.status, attempt, "request failed");
            return Err(map_server_error(response.status, body));
        }
    }

    async fn prepare(&self, mut request: HttpRequest) -> Result<HttpRequest> {
        for middleware in &self.inner.middlewares {
            request = middleware.prepare(request).await?;
        }
        Ok(request)
    }

    fn token_provider(&self) -> Option<Arc<dyn TokenProvider>> {
        self.inner
            .middlewares
            .iter()
            .find_map(|middleware| middleware.token_provider())
    }

    /// Execute and return only the body bytes.
    pub async fn execute_raw(&self, request: HttpRequest) -> Result<Bytes> {
        Ok(self.execute(request).await?.0)
    }

    /// Execute and decode the body as UTF-8 text.
    pub async fn execute_text(&self, request: HttpRequest) -> Result<String> {
        let body = self.execute_raw(request).await?;
        String::from_utf8(body.to_vec()).map_err(|e| {
            UrlManagerError::InvalidResponse(format!("response body is not valid UTF-8: {e}"))
        })
    }

    /// Execute and decode the JSON body into `T`.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let body = self.execute_raw(request).await?;
        self.inner.codec.decode(&body)
    }

    /// Execute and classify the body by its content type.
    pub async fn execute_classified(&self, request: HttpRequest) -> Result<ClassifiedResponse> {
        let (body, response) = self.execute(request).await?;
        classify_response(body, &response, ClassifyMode::ContentType)
    }

    /// Send `value` as a JSON body. Any UTF-8 response body comes back as text.
    pub async fn upload_object<T: Serialize + ?Sized>(
        &self,
        request: HttpRequest,
        value: &T,
    ) -> Result<ClassifiedResponse> {
        let request = request.with_json(&self.inner.codec, value)?;
        let (body, response) = self.execute(request).await?;
        classify_response(body, &response, ClassifyMode::Lenient)
    }

    /// Upload one file as the multipart field `file`.
    pub async fn upload_file(
        &self,
        request: HttpRequest,
        upload: FileUpload,
    ) -> Result<ClassifiedResponse> {
        let file_name = upload.file_name.clone();
        let form = MultipartForm::new().file_part("file", upload);
        self.send_multipart(request, form, file_name).await
    }

    /// Upload `value` as a JSON field followed by a file field.
    pub async fn upload_file_with_object<T: Serialize + ?Sized>(
        &self,
        request: HttpRequest,
        upload: FileUpload,
        file_field: &str,
        value: &T,
        object_field: &str,
    ) -> Result<ClassifiedResponse> {
        let file_name = upload.file_name.clone();
        let form = MultipartForm::new()
            .json_part(object_field, &self.inner.codec, value)?
            .file_part(file_field, upload);
        self.send_multipart(request, form, file_name).await
    }

    async fn send_multipart(
        &self,
        request: HttpRequest,
        form: MultipartForm,
        file_name: String,
    ) -> Result<ClassifiedResponse> {
        let mut request = request.with_body(form.encode());
        request.set_header(CONTENT_TYPE.as_str(), &form.content_type())?;
        let (body, response) = self.execute(request).await?;
        Ok(
            match classify_response(body, &response, ClassifyMode::ContentType)? {
                ClassifiedResponse::File {
                    bytes,
                    mime_type,
                    suggested_name,
                } => ClassifiedResponse::File {
                    bytes,
                    mime_type,
                    suggested_name: suggested_name.or(Some(file_name)),
                },
                other => other,
            },
        )
    }

    /// Persist `bytes` through the configured file store.
    pub async fn save_file(&self, bytes: &[u8], name: &str) -> Result<PathBuf> {
        let store = self
            .inner
            .file_store
            .as_ref()
            .ok_or_else(|| UrlManagerError::Io("no file store configured".to_string()))?;
        store.save(bytes, name).await
    }

    /// Execute, classify, and save `File` responses through the file store.
    pub async fn download(
        &self,
        request: HttpRequest,
    ) -> Result<(ClassifiedResponse, Option<PathBuf>)> {
        let classified = self.execute_classified(request).await?;
        let path = match &classified {
            ClassifiedResponse::File {
                bytes,
                suggested_name,
                ..
            } => {
                let name = suggested_name.as_deref().unwrap_or(FALLBACK_DOWNLOAD_NAME);
                Some(self.save_file(bytes, name).await?)
            }
            _ => None,
        };
        Ok((classified, path))
    }

    /// Run a declarative endpoint against `base` and decode its response.
    pub async fn run<T: DeserializeOwned>(&self, base: &Url, endpoint: &Endpoint<T>) -> Result<T> {
        let url = UrlBuilder::from_url(base)
            .adding_path(&endpoint.path)
            .adding_query(endpoint.query.iter().cloned())
            .build()?;
        let mut request = HttpRequest::new(url, endpoint.method).with_headers(&endpoint.headers)?;
        if let Some(body) = &endpoint.body {
            request = request.with_body(body.clone());
        }
        self.execute_json(request).await
    }
}

/// Builder for [`RequestManager`].
#[derive(Default)]
pub struct RequestManagerBuilder {
    transport: Option<Arc<dyn HttpTransport>>,
    http_config: HttpConfig,
    retry: RetryPolicy,
    middlewares: Vec<Arc<dyn RequestMiddleware>>,
    default_headers: HashMap<String, String>,
    codec: JsonCodec,
    file_store: Option<Arc<dyn FileStore>>,
}

impl RequestManagerBuilder {
    /// Use a custom transport instead of `reqwest`.
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn transport_arc(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Configuration of the default `reqwest` transport.
    pub fn http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Append a middleware; hooks run in the order they were added.
    pub fn middleware(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn middleware_arc(mut self, middleware: Arc<dyn RequestMiddleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Header sent with every request unless the request sets it itself.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn codec(mut self, codec: JsonCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn file_store(mut self, store: impl FileStore + 'static) -> Self {
        self.file_store = Some(Arc::new(store));
        self
    }

    pub fn build(self) -> Result<RequestManager> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_config(&self.http_config)?),
        };
        Ok(RequestManager {
            inner: Arc::new(ManagerInner {
                transport,
                retry: self.retry,
                middlewares: self.middlewares,
                default_headers: headers_from_map(&self.default_headers)?,
                codec: self.codec,
                file_store: self.file_store,
            }),
            cancel: None,
        })
    }
}
