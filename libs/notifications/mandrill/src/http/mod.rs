//! Narrow HTTP client seam used by the transport.
//!
//! The transport only ever issues one JSON POST per send, so the contract is a
//! single method. `reqwest::Client` implements it directly; [`MockHttpClient`]
//! records requests and replays canned responses for tests.

pub mod mock;

pub use mock::{MockHttpClient, RecordedRequest};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Failure of the HTTP client itself (connection, TLS, timeout, ...).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error("HTTP client error: {0}")]
    Other(String),
}

/// Status and raw body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON, regardless of the status code
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Minimal HTTP client contract
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST `body` as JSON to `url` and return the response.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, ClientError>;
}

#[async_trait]
impl HttpClient for reqwest::Client {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, ClientError> {
        let response = self.post(url).json(body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse::new(status, body))
    }
}
