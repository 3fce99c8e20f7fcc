use super::{Address, Email};
use crate::error::{MailerError, MailerResult};
use serde::Deserialize;

/// Addresses actually used for delivery.
///
/// These may differ from the `From`/`To` headers of the message. An envelope
/// always has a sender and at least one recipient, including when it is
/// deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub struct Envelope {
    sender: Address,
    recipients: Vec<Address>,
}

#[derive(Deserialize)]
struct RawEnvelope {
    sender: Address,
    #[serde(default)]
    recipients: Vec<Address>,
}

impl TryFrom<RawEnvelope> for Envelope {
    type Error = MailerError;

    fn try_from(raw: RawEnvelope) -> MailerResult<Self> {
        Self::new(raw.sender, raw.recipients)
    }
}

impl Envelope {
    pub fn new(sender: Address, recipients: Vec<Address>) -> MailerResult<Self> {
        if sender.email.trim().is_empty() {
            return Err(MailerError::InvalidEnvelope(
                "sender address is empty".to_string(),
            ));
        }

        if recipients.is_empty() {
            return Err(MailerError::InvalidEnvelope(
                "at least one recipient is required".to_string(),
            ));
        }

        Ok(Self { sender, recipients })
    }

    /// Derive the envelope from the message headers.
    ///
    /// The sender is the first `from` mailbox; recipients are `to`, `cc` and
    /// `bcc` in that order, keeping the first occurrence of each address.
    pub fn from_email(email: &Email) -> MailerResult<Self> {
        let sender = email
            .from
            .first()
            .cloned()
            .ok_or_else(|| MailerError::InvalidEnvelope("email has no from address".to_string()))?;

        let mut recipients: Vec<Address> = Vec::new();
        for address in email.to.iter().chain(&email.cc).chain(&email.bcc) {
            if !recipients.iter().any(|known| known.matches(address)) {
                recipients.push(address.clone());
            }
        }

        Self::new(sender, recipients)
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }
}
