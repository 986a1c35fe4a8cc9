//! MIME type detection utilities

/// Fallback for bytes of unknown type.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess MIME by inspecting bytes (magic numbers)
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|k| k.mime_type().to_string())
}

/// Guess MIME by file name or path (extension-based)
pub fn guess_mime_from_path(path: &str) -> Option<String> {
    mime_guess::from_path(path)
        .first_raw()
        .map(|s| s.to_string())
}

/// Combined guess: prefer bytes, fall back to extension, otherwise octet-stream
pub fn guess_mime(bytes: Option<&[u8]>, path: Option<&str>) -> String {
    if let Some(b) = bytes
        && let Some(m) = guess_mime_from_bytes(b)
    {
        return m;
    }
    if let Some(p) = path
        && let Some(m) = guess_mime_from_path(p)
    {
        return m;
    }
    OCTET_STREAM.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_win_over_extension() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];
        assert_eq!(guess_mime(Some(&jpeg[..]), Some("photo.png")), "image/jpeg");
    }

    #[test]
    fn extension_then_fallback() {
        assert_eq!(guess_mime(Some(&b"plain"[..]), Some("notes.txt")), "text/plain");
        assert_eq!(guess_mime(None, Some("archive.unknownext")), OCTET_STREAM);
        assert_eq!(guess_mime(None, None), OCTET_STREAM);
    }
}
