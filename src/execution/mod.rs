//! Request execution
//!
//! - `http`: transport contract, client configuration, headers, middleware
//! - `executor`: the `RequestManager` retry/refresh loop and caller-facing operations

pub mod executor;
pub mod http;

pub use executor::{RequestManager, RequestManagerBuilder};
