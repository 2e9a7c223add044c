//! multipart/form-data framing.

use bunny_file::Blob;

/// One body part of a multipart payload
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        blob: Blob,
    },
}

impl Part {
    pub fn text(name: &str, value: &str) -> Self {
        Part::Text {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn file(name: &str, filename: &str, blob: Blob) -> Self {
        Part::File {
            name: name.to_string(),
            filename: filename.to_string(),
            blob,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Part::Text { name, .. } => name,
            Part::File { name, .. } => name,
        }
    }
}

/// Frame parts into a multipart/form-data body.
///
/// Returns the Content-Type header value and the body bytes.
pub fn encode_multipart(parts: &[Part]) -> (String, Vec<u8>) {
    let boundary = format!("----BunnyFormBoundary{:x}", rand_boundary());
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());

        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                blob,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name,
                        filename,
                        part_content_type(blob)
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(blob.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    let content_type = format!("multipart/form-data; boundary={}", boundary);
    (content_type, body)
}

fn part_content_type(blob: &Blob) -> &str {
    if blob.mime_type().is_empty() {
        "application/octet-stream"
    } else {
        blob.mime_type()
    }
}

fn rand_boundary() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(12345)
}
