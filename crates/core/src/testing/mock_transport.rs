//! Scripted transport for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::fetcher::{ApiRequest, ApiResponse, Session, Transport, TransportError};

type Reply = Result<ApiResponse, TransportError>;

/// Mock implementation of the [`Transport`] trait.
///
/// Replies are scripted per URL path (query excluded) and served in order.
/// The last reply for a path repeats once the queue is drained, and paths
/// without any script answer `404 text/plain`.
///
/// # Example
///
/// ```rust,ignore
/// use jackett_bridge_core::testing::MockTransport;
///
/// let transport = MockTransport::new();
/// transport.push_error("/api/v2.0/indexers", TransportError::Timeout);
/// transport.push_json("/api/v2.0/indexers", 200, json!([{"id": "1337x", "name": "1337x"}]));
///
/// // first call times out, every later call returns the list
/// assert_eq!(transport.calls_to("/api/v2.0/indexers"), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `path`.
    pub fn push(&self, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Queue a JSON reply with `application/json; charset=utf-8`.
    pub fn push_json(&self, path: &str, status: u16, body: serde_json::Value) {
        self.push(
            path,
            Ok(ApiResponse::new(
                status,
                Some("application/json; charset=utf-8"),
                body.to_string(),
            )),
        );
    }

    pub fn push_text(&self, path: &str, status: u16, content_type: &str, body: &str) {
        self.push(path, Ok(ApiResponse::new(status, Some(content_type), body)));
    }

    pub fn push_error(&self, path: &str, error: TransportError) {
        self.push(path, Err(error));
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path() == path)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_reply(&self, path: &str) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Ok(ApiResponse::new(404, Some("text/plain"), "Not Found")),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, _session: &Session, request: ApiRequest) -> Reply {
        let path = request.path().to_string();
        self.requests.lock().unwrap().push(request);
        self.next_reply(&path)
    }
}
