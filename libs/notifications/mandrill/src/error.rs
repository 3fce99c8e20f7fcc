//! Error types for the Mandrill transport.

use crate::http::{ClientError, HttpResponse};
use core_config::ConfigError;
use thiserror::Error;

/// Result type for mailer operations.
pub type MailerResult<T> = Result<T, MailerError>;

/// Errors that can occur while sending through the transport.
#[derive(Debug, Error)]
pub enum MailerError {
    /// The provider answered, but not with a successful send
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The HTTP client failed before a response was received
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Envelope without a sender or without recipients
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Provider-level failure, carrying the HTTP response it was read from.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    response: HttpResponse,
}

impl TransportError {
    pub fn new(message: impl Into<String>, response: HttpResponse) -> Self {
        Self {
            message: message.into(),
            response,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The response that caused the failure
    pub fn response(&self) -> &HttpResponse {
        &self.response
    }
}
