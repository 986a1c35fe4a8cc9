//! Declarative endpoint descriptions.

use crate::types::HttpMethod;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Describes one API endpoint relative to a base URL; `T` is the decoded
/// response type. Run it with [`RequestManager::run`](crate::RequestManager::run).
pub struct Endpoint<T> {
    pub path: String,
    pub method: HttpMethod,
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    _response: PhantomData<fn() -> T>,
}

impl<T> Endpoint<T> {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::Get,
            query: Vec::new(),
            headers: HashMap::new(),
            body: None,
            _response: PhantomData,
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl<T> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            method: self.method,
            query: self.query.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            _response: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .finish()
    }
}
