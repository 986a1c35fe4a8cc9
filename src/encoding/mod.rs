//! Wire encoders and decoders.
//!
//! - `json`: JSON codec with wire key-case translation
//! - `response`: content-type based response classification
//! - `multipart`: `multipart/form-data` body builder

pub mod json;
pub mod multipart;
pub mod response;

pub use json::{JsonCodec, KeyCase};
pub use multipart::{FileUpload, MultipartForm, MultipartPart};
pub use response::{ClassifyMode, classify_response, suggested_filename};
