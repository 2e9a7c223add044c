//! Blob download.

use bunny_file::Blob;
use tracing::debug;

use crate::request::Request;
use crate::transport::Transport;
use crate::{NetError, Response};

/// GET a URL and wrap the payload as a blob.
///
/// Anything but a 200 surfaces as [`NetError::Http`] carrying the raw
/// response, so callers can inspect what the server said.
pub async fn download(transport: &dyn Transport, url: &str) -> Result<Blob, NetError> {
    let response = transport.send(Request::get(url)).await?;
    if response.status != 200 {
        return Err(NetError::Http(response));
    }

    let mime_type = response.header("Content-Type").unwrap_or("").to_string();
    debug!("downloaded {} bytes from {}", response.body.len(), url);
    Ok(Blob::new(response.body, &mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockTransport;

    #[test]
    fn test_download_wraps_body_as_blob() {
        let mock = MockTransport::new();
        mock.push_response(Response {
            status: 200,
            headers: vec![("Content-Type".to_string(), "image/png".to_string())],
            body: vec![0x89, 0x50, 0x4e, 0x47],
        });

        let blob = smol::block_on(download(&mock, "http://cdn/pic.png")).unwrap();
        assert_eq!(blob.mime_type(), "image/png");
        assert_eq!(blob.as_bytes(), [0x89, 0x50, 0x4e, 0x47]);

        let sent = mock.requests();
        assert_eq!(sent[0].method, crate::Method::Get);
        assert_eq!(sent[0].url, "http://cdn/pic.png");
    }

    #[test]
    fn test_non_200_rejects_with_response() {
        let mock = MockTransport::with_response(404, "gone");

        let err = smol::block_on(download(&mock, "http://cdn/missing")).unwrap_err();
        match err {
            NetError::Http(response) => {
                assert_eq!(response.status, 404);
                assert_eq!(response.text().unwrap(), "gone");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }
}
