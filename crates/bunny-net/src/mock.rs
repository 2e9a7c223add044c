//! Canned transport for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::request::Request;
use crate::transport::Transport;
use crate::{NetError, Response};

/// Transport that replays queued responses and records every request
/// it was handed.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Response>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport preloaded with a single canned response
    pub fn with_response(status: u16, body: &str) -> Self {
        let mock = Self::new();
        mock.push_response(Response::with_status(status, body));
        mock
    }

    /// Queue another canned response
    pub fn push_response(&self, response: Response) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Copies of the requests seen so far
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, NetError> {
        self.requests.lock().unwrap().push(request);
        match self.responses.lock().unwrap().pop_front() {
            Some(response) => Ok(response),
            None => Err(NetError::Network("no canned response queued".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order() {
        let mock = MockTransport::new();
        mock.push_response(Response::with_status(200, "first"));
        mock.push_response(Response::with_status(404, "second"));

        smol::block_on(async {
            let first = mock.send(Request::get("http://x/1")).await.unwrap();
            assert_eq!(first.status, 200);

            let second = mock.send(Request::get("http://x/2")).await.unwrap();
            assert_eq!(second.status, 404);

            assert!(mock.send(Request::get("http://x/3")).await.is_err());
        });

        let seen = mock.requests();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].url, "http://x/1");
    }
}
