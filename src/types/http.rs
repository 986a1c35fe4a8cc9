//! HTTP request/response value types.
//!
//! A [`HttpRequest`] is created per logical call and owned by that call; the
//! executor clones it for every attempt so middleware mutations never leak
//! between attempts or between concurrent calls.

use crate::encoding::JsonCodec;
use crate::error::{Result, UrlManagerError};
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
}

impl HttpMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = UrlManagerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            "CONNECT" => Ok(Self::Connect),
            other => Err(UrlManagerError::Custom(format!(
                "unsupported HTTP method: {other}"
            ))),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Options => Self::OPTIONS,
            HttpMethod::Trace => Self::TRACE,
            HttpMethod::Connect => Self::CONNECT,
        }
    }
}

/// An outgoing HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a request with no headers and no body.
    pub fn new(url: Url, method: HttpMethod) -> Self {
        Self {
            url,
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Parse `url` and create a request.
    pub fn parse(url: &str, method: HttpMethod) -> Result<Self> {
        Ok(Self::new(Url::parse(url)?, method))
    }

    pub fn get(url: Url) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    pub fn post(url: Url) -> Self {
        Self::new(url, HttpMethod::Post)
    }

    pub fn put(url: Url) -> Self {
        Self::new(url, HttpMethod::Put)
    }

    pub fn patch(url: Url) -> Self {
        Self::new(url, HttpMethod::Patch)
    }

    pub fn delete(url: Url) -> Self {
        Self::new(url, HttpMethod::Delete)
    }

    /// Set a header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        self.set_header(name, value)?;
        Ok(self)
    }

    /// Merge headers over the current ones (last write wins).
    pub fn with_headers(mut self, headers: &HashMap<String, String>) -> Result<Self> {
        for (name, value) in headers {
            self.set_header(name, value)?;
        }
        Ok(self)
    }

    /// Set a header in place, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Encode `value` with `codec` as the body and mark it as JSON.
    pub fn with_json<T: Serialize + ?Sized>(mut self, codec: &JsonCodec, value: &T) -> Result<Self> {
        self.body = Some(codec.encode(value)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Token of the `Authorization: Bearer <token>` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// Metadata of a completed response. The body travels separately as bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// URL the response came from after redirects. Transports that do not
    /// report one leave the requested URL here.
    pub url: Url,
}

impl HttpResponse {
    pub fn new(status: u16, headers: HeaderMap, url: Url) -> Self {
        Self {
            status,
            headers,
            url,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw `Content-Type` header value.
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// MIME type without parameters, lowercased (`text/plain; charset=utf-8` -> `text/plain`).
    pub fn mime_type(&self) -> Option<String> {
        self.content_type()
            .and_then(|ct| ct.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://api.example.com/items").unwrap()
    }

    #[test]
    fn method_round_trips_through_strings() {
        for m in [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Patch,
            HttpMethod::Head,
            HttpMethod::Options,
            HttpMethod::Trace,
            HttpMethod::Connect,
        ] {
            assert_eq!(m.as_str().parse::<HttpMethod>().unwrap(), m);
            assert_eq!(reqwest::Method::from(m).as_str(), m.as_str());
        }
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("BREW".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn headers_merge_last_write_wins() {
        let mut extra = HashMap::new();
        extra.insert("X-Trace".to_string(), "second".to_string());
        let req = HttpRequest::get(url())
            .with_header("x-trace", "first")
            .unwrap()
            .with_headers(&extra)
            .unwrap();
        assert_eq!(req.header("x-trace"), Some("second"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn invalid_header_is_rejected() {
        let err = HttpRequest::get(url()).with_header("bad header", "v").unwrap_err();
        assert!(matches!(err, UrlManagerError::InvalidHeader(_)));
    }

    #[test]
    fn json_body_sets_content_type() {
        let req = HttpRequest::post(url())
            .with_json(&JsonCodec::default(), &serde_json::json!({"a": 1}))
            .unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(&br#"{"a":1}"#[..]));
    }

    #[test]
    fn bearer_token_is_extracted() {
        let req = HttpRequest::get(url())
            .with_header("Authorization", "Bearer abc")
            .unwrap();
        assert_eq!(req.bearer_token(), Some("abc"));
        assert_eq!(HttpRequest::get(url()).bearer_token(), None);
    }

    #[test]
    fn response_mime_type_drops_parameters() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("Text/Plain; charset=utf-8"),
        );
        let resp = HttpResponse::new(200, headers, url());
        assert_eq!(resp.mime_type().as_deref(), Some("text/plain"));
        assert!(resp.is_success());
        assert!(!HttpResponse::new(404, HeaderMap::new(), url()).is_success());
    }
}
