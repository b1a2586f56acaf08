//! Mock transport for testing.
//!
//! Lets integrators exercise the client without a network: queue replies,
//! run checks, then assert on the recorded requests.

use crate::error::Result;
use crate::transport::Transport;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// One call recorded by a [`MockTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    /// HTTP method, `"GET"` or `"POST"`.
    pub method: &'static str,
    /// Request path relative to the base URL.
    pub path: String,
    /// JSON body; [`Value::Null`] for GET.
    pub body: Value,
}

/// Transport double that replays queued replies and records every request.
///
/// Replies are consumed front-to-back; once the queue is empty, calls
/// yield [`Value::Null`], which normalizes to a raw passthrough.
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<Result<Value>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Create a mock with an empty reply queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful JSON reply.
    pub fn enqueue(&self, reply: Value) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(reply));
    }

    /// Queue an error reply.
    pub fn enqueue_error(&self, error: crate::error::LoginLlamaError) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    /// Requests recorded so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, method: &'static str, path: &str, body: Value) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                method,
                path: path.to_string(),
                body,
            });
    }

    fn next_reply(&self) -> Result<Value> {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }
}

impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<Value> {
        self.record("GET", path, Value::Null);
        self.next_reply()
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.record("POST", path, body.clone());
        self.next_reply()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_replays_queued_replies_in_order() {
        let mock = MockTransport::new();
        mock.enqueue(json!({"first": true}));
        mock.enqueue(json!({"second": true}));

        assert_eq!(
            mock.post("/a", &Value::Null).await.unwrap(),
            json!({"first": true})
        );
        assert_eq!(mock.get("/b").await.unwrap(), json!({"second": true}));
        assert_eq!(mock.get("/c").await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockTransport::new();
        mock.post("/login/check", &json!({"identity_key": "u"}))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/login/check");
        assert_eq!(requests[0].body, json!({"identity_key": "u"}));
    }
}
