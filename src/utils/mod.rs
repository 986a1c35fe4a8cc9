//! Utility modules
//!
//! - `cancel`: cancellation handles for logical calls
//! - `mime`: MIME type guessing for uploads and downloads

pub mod cancel;
pub mod mime;

pub use cancel::{CancelHandle, new_cancel_handle};
