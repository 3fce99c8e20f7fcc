//! Transport trait and the Mandrill implementation

pub mod mandrill;

pub use mandrill::MandrillApiTransport;

use crate::error::MailerResult;
use crate::http::HttpResponse;
use crate::models::{Email, Envelope};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

/// Per-recipient acknowledgement returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipientStatus {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// e.g. `sent`, `queued`, `rejected`
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reject_reason: Option<String>,
}

/// Handle for a message the provider accepted
#[derive(Debug, Clone)]
pub struct SentMessage {
    envelope: Envelope,
    message_id: Option<String>,
    recipients: Vec<RecipientStatus>,
    response: Option<HttpResponse>,
}

impl SentMessage {
    pub fn new(envelope: Envelope) -> Self {
        Self {
            envelope,
            message_id: None,
            recipients: Vec::new(),
            response: None,
        }
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Provider-assigned id, used to correlate delivery events
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn set_message_id(&mut self, id: impl Into<String>) {
        self.message_id = Some(id.into());
    }

    /// Acknowledgements as decoded from the provider response
    pub fn recipients(&self) -> &[RecipientStatus] {
        &self.recipients
    }

    /// Raw response, kept for diagnostics
    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    pub(crate) fn with_response(
        mut self,
        recipients: Vec<RecipientStatus>,
        response: HttpResponse,
    ) -> Self {
        self.recipients = recipients;
        self.response = Some(response);
        self
    }
}

/// Transport that hands a composed email to an HTTP email API.
///
/// `Display` yields a URI-like description for logs, e.g.
/// `mandrill+api://mandrillapp.com`.
#[async_trait]
pub trait ApiTransport: Send + Sync + fmt::Display {
    /// Send `email` to the recipients of `envelope`
    async fn send(&self, email: &Email, envelope: &Envelope) -> MailerResult<SentMessage>;

    /// Send `email` using the envelope derived from its own addresses
    async fn send_email(&self, email: &Email) -> MailerResult<SentMessage> {
        let envelope = Envelope::from_email(email)?;
        self.send(email, &envelope).await
    }

    /// Get provider name
    fn name(&self) -> &'static str;
}
