//! Blobs and named files.
//!
//! Binary data handling for form values.

use std::sync::Arc;

use crate::FileError;

/// Immutable raw binary data with a MIME type.
///
/// Clones share the underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    data: Arc<Vec<u8>>,
    mime_type: String,
}

impl Blob {
    /// Create a new blob
    pub fn new(data: Vec<u8>, mime_type: &str) -> Self {
        Self {
            data: Arc::new(data),
            mime_type: mime_type.to_string(),
        }
    }

    /// Create a blob from UTF-8 text
    pub fn from_text(text: &str, mime_type: &str) -> Self {
        Self::new(text.as_bytes().to_vec(), mime_type)
    }

    /// Get size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get MIME type
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Slice the blob
    pub fn slice(&self, start: usize, end: Option<usize>, content_type: Option<&str>) -> Blob {
        let end = end.unwrap_or(self.data.len()).min(self.data.len());
        let start = start.min(end);

        Blob {
            data: Arc::new(self.data[start..end].to_vec()),
            mime_type: content_type.unwrap_or(&self.mime_type).to_string(),
        }
    }

    /// Convert to text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).to_string()
    }

    /// Encode as a `data:<mime>;base64,<payload>` URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, base64_encode(&self.data))
    }

    /// Decode a `data:<mime>;base64,<payload>` URL back into a blob
    pub fn from_data_url(url: &str) -> Result<Blob, FileError> {
        let rest = url.strip_prefix("data:").ok_or(FileError::InvalidDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(FileError::InvalidDataUrl)?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or(FileError::InvalidDataUrl)?;
        Ok(Blob::new(base64_decode(payload)?, mime_type))
    }
}

/// File - a blob with a file name, as held by file inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    blob: Blob,
    name: String,
}

impl File {
    pub fn new(blob: Blob, name: &str) -> Self {
        Self {
            blob,
            name: name.to_string(),
        }
    }

    /// Wrap a blob that arrived without a name
    pub fn unnamed(blob: Blob) -> Self {
        Self::new(blob, "blob")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.blob.size()
    }

    pub fn mime_type(&self) -> &str {
        self.blob.mime_type()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.blob.as_bytes()
    }

    pub fn as_blob(&self) -> &Blob {
        &self.blob
    }

    pub fn into_blob(self) -> Blob {
        self.blob
    }
}

fn base64_encode(data: &[u8]) -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut result = String::new();

    for chunk in data.chunks(3) {
        let n = match chunk.len() {
            3 => ((chunk[0] as u32) << 16) | ((chunk[1] as u32) << 8) | (chunk[2] as u32),
            2 => ((chunk[0] as u32) << 16) | ((chunk[1] as u32) << 8),
            1 => (chunk[0] as u32) << 16,
            _ => 0,
        };

        result.push(CHARS[((n >> 18) & 0x3F) as usize] as char);
        result.push(CHARS[((n >> 12) & 0x3F) as usize] as char);

        if chunk.len() > 1 {
            result.push(CHARS[((n >> 6) & 0x3F) as usize] as char);
        } else {
            result.push('=');
        }

        if chunk.len() > 2 {
            result.push(CHARS[(n & 0x3F) as usize] as char);
        } else {
            result.push('=');
        }
    }

    result
}

fn base64_decode(input: &str) -> Result<Vec<u8>, FileError> {
    fn sextet(c: u8) -> Result<u32, FileError> {
        match c {
            b'A'..=b'Z' => Ok((c - b'A') as u32),
            b'a'..=b'z' => Ok((c - b'a' + 26) as u32),
            b'0'..=b'9' => Ok((c - b'0' + 52) as u32),
            b'+' => Ok(62),
            b'/' => Ok(63),
            _ => Err(FileError::InvalidBase64),
        }
    }

    let trimmed = input.trim_end_matches('=');
    let mut result = Vec::with_capacity(trimmed.len() * 3 / 4);

    for chunk in trimmed.as_bytes().chunks(4) {
        // A lone trailing sextet cannot encode a whole byte
        if chunk.len() == 1 {
            return Err(FileError::InvalidBase64);
        }
        let mut n = 0u32;
        for (i, &c) in chunk.iter().enumerate() {
            n |= sextet(c)? << (18 - 6 * i);
        }
        result.push((n >> 16) as u8);
        if chunk.len() > 2 {
            result.push((n >> 8) as u8);
        }
        if chunk.len() > 3 {
            result.push(n as u8);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob() {
        let blob = Blob::from_text("Hello", "text/plain");

        assert_eq!(blob.size(), 5);
        assert_eq!(blob.text(), "Hello");
        assert_eq!(blob.mime_type(), "text/plain");
    }

    #[test]
    fn test_blob_slice() {
        let blob = Blob::from_text("Hello, world", "text/plain");
        let slice = blob.slice(7, None, None);

        assert_eq!(slice.text(), "world");
        assert_eq!(slice.mime_type(), "text/plain");
    }

    #[test]
    fn test_file() {
        let file = File::new(Blob::from_text("content", "text/plain"), "test.txt");

        assert_eq!(file.name(), "test.txt");
        assert_eq!(file.size(), 7);
    }

    #[test]
    fn test_unnamed_file() {
        let file = File::unnamed(Blob::new(vec![1, 2, 3], "application/octet-stream"));

        assert_eq!(file.name(), "blob");
        assert_eq!(file.size(), 3);
    }

    #[test]
    fn test_data_url_round_trip() {
        let blob = Blob::from_text("Man", "text/plain");
        let url = blob.to_data_url();

        assert_eq!(url, "data:text/plain;base64,TWFu");

        let back = Blob::from_data_url(&url).unwrap();
        assert_eq!(back, blob);
    }

    #[test]
    fn test_data_url_padding() {
        for text in ["M", "Ma", "Man", "Mane"] {
            let blob = Blob::from_text(text, "text/plain");
            let back = Blob::from_data_url(&blob.to_data_url()).unwrap();
            assert_eq!(back.text(), text);
        }
    }

    #[test]
    fn test_data_url_rejects_garbage() {
        assert_eq!(
            Blob::from_data_url("http://example.com"),
            Err(FileError::InvalidDataUrl)
        );
        assert_eq!(
            Blob::from_data_url("data:text/plain;base64,@@@@"),
            Err(FileError::InvalidBase64)
        );
    }
}
