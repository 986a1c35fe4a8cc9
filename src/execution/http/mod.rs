//! HTTP Utilities
//!
//! This module contains HTTP-related utilities:
//! - HTTP client configuration and the `reqwest` transport
//! - Header management
//! - Request middleware
//! - Transport abstraction

pub mod client;
pub mod headers;
pub mod middleware;
pub mod transport;

// Re-export main types
pub use client::*;
pub use headers::*;
pub use middleware::*;
pub use transport::*;
