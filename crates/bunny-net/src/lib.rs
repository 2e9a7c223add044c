//! Bunny Networking
//!
//! HTTP transport for form submission and file download. The form
//! layer talks to the [`Transport`] trait; [`HttpClient`] is the
//! reqwest-backed implementation and [`MockTransport`] stands in
//! where no network is wanted.

mod download;
mod mock;
mod multipart;
mod request;
mod transport;

pub use download::download;
pub use mock::MockTransport;
pub use multipart::{Part, encode_multipart};
pub use request::{Method, Request};
pub use transport::{ClientConfig, HttpClient, HttpClientBuilder, Transport};
pub use url::Url;

/// HTTP Response
#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Build a response from a status and UTF-8 body
    pub fn with_status(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    /// True for 2xx statuses
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with this name, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> Result<String, NetError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| NetError::Network(format!("body is not UTF-8: {e}")))
    }

    /// Parse the body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| NetError::Network(format!("JSON parse failed: {e}")))
    }
}

/// Network error
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Non-success response, carrying the raw response for callers
    /// that inspect status and body
    #[error("HTTP error: {}", .0.status)]
    Http(Response),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
