//! Mock HTTP client for testing

use super::{ClientError, HttpClient, HttpResponse};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A request captured by [`MockHttpClient`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub body: Value,
}

enum Reply {
    Response(HttpResponse),
    Failure(String),
}

/// Mock HTTP client that captures requests and replays queued replies.
///
/// Clones share state, so a test can keep one handle and move another into
/// the transport.
#[derive(Clone, Default)]
pub struct MockHttpClient {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose first reply is `status` with `body`
    pub fn responding(status: u16, body: impl Into<String>) -> Self {
        Self::with_reply(Reply::Response(HttpResponse::new(status, body)))
    }

    /// Create a mock whose first request fails at the client level
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Failure(message.into()))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            requests: Arc::default(),
            replies: Arc::new(Mutex::new(VecDeque::from([reply]))),
        }
    }

    /// Queue another response
    pub async fn push_response(&self, status: u16, body: impl Into<String>) {
        self.replies
            .lock()
            .await
            .push_back(Reply::Response(HttpResponse::new(status, body)));
    }

    /// Get all captured requests
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Body of the most recent request
    pub async fn last_body(&self) -> Option<Value> {
        self.requests.lock().await.last().map(|r| r.body.clone())
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, ClientError> {
        self.requests.lock().await.push(RecordedRequest {
            url: url.to_string(),
            body: body.clone(),
        });

        match self.replies.lock().await.pop_front() {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Failure(message)) => Err(ClientError::Other(message)),
            None => Err(ClientError::Other("no mock response queued".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_records_and_replays() {
        let client = MockHttpClient::responding(200, "[]");
        let handle = client.clone();

        let response = client
            .post_json("https://example.com/send", &json!({"a": 1}))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(handle.request_count().await, 1);
        assert_eq!(handle.requests().await[0].url, "https://example.com/send");
        assert_eq!(handle.last_body().await, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_mock_fails_when_exhausted() {
        let client = MockHttpClient::new();
        let result = client.post_json("https://example.com", &json!({})).await;

        assert!(matches!(result, Err(ClientError::Other(_))));
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let client = MockHttpClient::failing("connection refused");
        let err = client
            .post_json("https://example.com", &json!({}))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("connection refused"));
    }
}
