//! `multipart/form-data` body builder.
//!
//! Wire layout for every part:
//!
//! ```text
//! --<boundary>\r\n
//! Content-Disposition: form-data; name="<name>"[; filename="<file>"]\r\n
//! Content-Type: <type>\r\n
//! \r\n
//! <bytes>\r\n
//! ```
//!
//! followed by the closing delimiter `--<boundary>--\r\n`.

use crate::encoding::JsonCodec;
use crate::error::{Result, UrlManagerError};
use crate::utils::mime::guess_mime;
use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use std::path::Path;

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FileUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, guessing its content type from magic bytes,
    /// then from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| UrlManagerError::Io(format!("not a file path: {}", path.display())))?;
        let content_type = guess_mime(Some(bytes.as_slice()), Some(file_name.as_str()));
        Ok(Self::new(file_name, content_type, bytes))
    }
}

/// One named part of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartPart {
    /// JSON-encoded object field.
    Json { name: String, bytes: Bytes },
    /// Binary file field.
    File { name: String, upload: FileUpload },
}

/// Ordered multipart form with its boundary token.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<MultipartPart>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    /// Create an empty form with a random boundary.
    pub fn new() -> Self {
        Self::with_boundary(format!("Boundary-{}", uuid::Uuid::new_v4()))
    }

    /// Create an empty form with a fixed boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Append a JSON-encoded field.
    pub fn json_part<T: Serialize + ?Sized>(
        mut self,
        name: impl Into<String>,
        codec: &JsonCodec,
        value: &T,
    ) -> Result<Self> {
        let bytes = codec.encode(value)?;
        self.parts.push(MultipartPart::Json {
            name: name.into(),
            bytes,
        });
        Ok(self)
    }

    /// Append a file field.
    pub fn file_part(mut self, name: impl Into<String>, upload: FileUpload) -> Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            upload,
        });
        self
    }

    /// Serialize the form into its wire body.
    pub fn encode(&self) -> Bytes {
        let mut body = BytesMut::new();
        for part in &self.parts {
            body.put_slice(format!("--{}\r\n", self.boundary).as_bytes());
            match part {
                MultipartPart::Json { name, bytes } => {
                    body.put_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n",
                            escape_quoted(name)
                        )
                        .as_bytes(),
                    );
                    body.put_slice(b"Content-Type: application/json\r\n\r\n");
                    body.put_slice(bytes);
                }
                MultipartPart::File { name, upload } => {
                    body.put_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                            escape_quoted(name),
                            escape_quoted(&upload.file_name)
                        )
                        .as_bytes(),
                    );
                    body.put_slice(format!("Content-Type: {}\r\n\r\n", upload.content_type).as_bytes());
                    body.put_slice(&upload.bytes);
                }
            }
            body.put_slice(b"\r\n");
        }
        body.put_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        body.freeze()
    }
}

// Quoted parameter values cannot carry raw quotes or line breaks.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
