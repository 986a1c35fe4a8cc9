//! Core data types
//!
//! - `http`: methods, outgoing requests, response metadata
//! - `response`: classified response variants
//! - `endpoint`: declarative endpoint descriptions

pub mod endpoint;
pub mod http;
pub mod response;

pub use endpoint::Endpoint;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::ClassifiedResponse;
