//! Retry module (ergonomic namespace)
//! - policy.rs: status-based retry decisions and exponential backoff

pub mod policy;

pub use policy::*;
