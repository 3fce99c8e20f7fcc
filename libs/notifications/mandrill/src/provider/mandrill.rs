//! Mandrill email provider
//!
//! Sends emails via the Mandrill `messages/send` HTTP API and maps its
//! response back to a [`SentMessage`].

use crate::config::MandrillConfig;
use crate::error::{MailerResult, TransportError};
use crate::http::{ClientError, HttpClient, HttpResponse};
use crate::models::{Address, Email, Envelope};
use crate::provider::{ApiTransport, RecipientStatus, SentMessage};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use core_config::FromEnv;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

/// Default API host
const HOST: &str = "mandrillapp.com";

const SEND_PATH: &str = "/api/1.0/messages/send.json";

/// Headers Mandrill derives from the message fields itself
const HEADERS_TO_BYPASS: [&str; 6] = ["from", "to", "cc", "bcc", "subject", "content-type"];

/// Mandrill API transport
pub struct MandrillApiTransport<C = reqwest::Client> {
    key: String,
    host: Option<String>,
    port: Option<u16>,
    client: C,
}

impl MandrillApiTransport<reqwest::Client> {
    /// Create a transport with a default reqwest client
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_client(key, reqwest::Client::new())
    }

    pub fn from_config(config: MandrillConfig) -> MailerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ClientError::from)?;

        Ok(Self {
            key: config.api_key,
            host: config.host.filter(|host| !host.is_empty()),
            port: config.port,
            client,
        })
    }

    /// Create from environment variables, see [`MandrillConfig::from_env`]
    pub fn from_env() -> MailerResult<Self> {
        Self::from_config(MandrillConfig::from_env()?)
    }
}

impl<C: HttpClient> MandrillApiTransport<C> {
    pub fn with_client(key: impl Into<String>, client: C) -> Self {
        Self {
            key: key.into(),
            host: None,
            port: None,
            client,
        }
    }

    /// Override the API host. An empty host restores the default.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into();
        self.host = (!host.is_empty()).then_some(host);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// `host` or `host:port`
    pub fn endpoint(&self) -> String {
        let host = self.host.as_deref().unwrap_or(HOST);
        match self.port {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    fn url(&self) -> String {
        format!("https://{}{}", self.endpoint(), SEND_PATH)
    }

    /// JSON request body for `email` delivered to `envelope`
    pub fn payload(&self, email: &Email, envelope: &Envelope) -> MailerResult<Value> {
        Ok(serde_json::to_value(self.build_request(email, envelope))?)
    }

    fn build_request<'a>(&'a self, email: &'a Email, envelope: &'a Envelope) -> SendRequest<'a> {
        let sender = envelope.sender();

        let mut request = SendRequest {
            key: &self.key,
            message: Message {
                html: email.body_html.as_deref(),
                text: email.body_text.as_deref(),
                subject: &email.subject,
                from_email: &sender.email,
                from_name: non_empty(&sender.name),
                to: recipients(email, envelope),
                headers: Vec::new(),
                tags: email.tags.iter().map(String::as_str).collect(),
                metadata: email
                    .metadata
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect(),
            },
            attachments: Vec::new(),
            images: Vec::new(),
        };

        for attachment in &email.attachments {
            let entry = AttachmentPayload {
                content: STANDARD.encode(&attachment.body),
                content_type: &attachment.content_type,
                name: attachment.filename.as_deref().and_then(non_empty),
            };

            if attachment.is_inline() {
                request.images.push(entry);
            } else {
                request.attachments.push(entry);
            }
        }

        for header in &email.headers {
            let name = header.name.trim();
            if HEADERS_TO_BYPASS
                .iter()
                .any(|bypass| name.eq_ignore_ascii_case(bypass))
            {
                continue;
            }

            request
                .message
                .headers
                .push(format!("{}: {}", name, header.value));
        }

        request
    }

    fn handle_response(&self, envelope: &Envelope, response: HttpResponse) -> MailerResult<SentMessage> {
        if response.status() != 200 {
            // Unparseable error bodies still produce a failure, just without details
            let body: ErrorBody = response.json().unwrap_or_default();
            let code = text(&body.code);

            error!(
                status = response.status(),
                code = %code,
                error_name = %text(&body.name),
                "Mandrill API error"
            );

            let message = if body.status.as_ref().and_then(Value::as_str) == Some("error") {
                format!(
                    "Unable to send an email: {} (code {}).",
                    text(&body.message),
                    code
                )
            } else {
                format!("Unable to send an email (code {}).", code)
            };

            return Err(TransportError::new(message, response).into());
        }

        let recipients: Vec<RecipientStatus> = match response.json() {
            Ok(recipients) => recipients,
            Err(e) => {
                return Err(TransportError::new(
                    format!("Unable to send an email: unexpected response body ({}).", e),
                    response,
                )
                .into());
            }
        };

        let first_id = recipients
            .first()
            .map(|first| first.id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let Some(message_id) = first_id else {
            return Err(TransportError::new(
                "Unable to send an email: the response carried no message id.",
                response,
            )
            .into());
        };

        debug!(message_id = %message_id, "Email sent successfully");

        let mut sent = SentMessage::new(envelope.clone());
        sent.set_message_id(message_id);
        Ok(sent.with_response(recipients, response))
    }
}

#[async_trait]
impl<C: HttpClient> ApiTransport for MandrillApiTransport<C> {
    async fn send(&self, email: &Email, envelope: &Envelope) -> MailerResult<SentMessage> {
        let payload = self.payload(email, envelope)?;

        debug!(
            endpoint = %self.endpoint(),
            recipients = envelope.recipients().len(),
            subject = %email.subject,
            "Sending email via Mandrill"
        );

        let response = self.client.post_json(&self.url(), &payload).await?;

        self.handle_response(envelope, response)
    }

    fn name(&self) -> &'static str {
        "mandrill"
    }
}

impl<C: HttpClient> fmt::Display for MandrillApiTransport<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mandrill+api://{}", self.endpoint())
    }
}

impl<C> fmt::Debug for MandrillApiTransport<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MandrillApiTransport")
            .field("key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// Classify each envelope recipient against the email's Bcc, then Cc lists
fn recipients<'a>(email: &Email, envelope: &'a Envelope) -> Vec<Recipient<'a>> {
    envelope
        .recipients()
        .iter()
        .map(|recipient| {
            let kind = if contains(&email.bcc, recipient) {
                RecipientType::Bcc
            } else if contains(&email.cc, recipient) {
                RecipientType::Cc
            } else {
                RecipientType::To
            };

            Recipient {
                email: &recipient.email,
                kind,
                name: non_empty(&recipient.name),
            }
        })
        .collect()
}

fn contains(list: &[Address], address: &Address) -> bool {
    list.iter().any(|candidate| candidate.matches(address))
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Render a loosely typed error field; strings without quotes, missing as empty
fn text(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Mandrill API request payload
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    key: &'a str,
    message: Message<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<AttachmentPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    html: Option<&'a str>,
    text: Option<&'a str>,
    subject: &'a str,
    from_email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_name: Option<&'a str>,
    to: Vec<Recipient<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    headers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<&'a str, &'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum RecipientType {
    To,
    Cc,
    Bcc,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    email: &'a str,
    #[serde(rename = "type")]
    kind: RecipientType,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct AttachmentPayload<'a> {
    content: String,
    #[serde(rename = "type")]
    content_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// Error body returned with non-200 statuses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;
    use crate::models::Attachment;
    use serde_json::json;

    fn transport() -> MandrillApiTransport<MockHttpClient> {
        MandrillApiTransport::with_client("KEY", MockHttpClient::new())
    }

    fn envelope_for(email: &Email) -> Envelope {
        Envelope::from_email(email).unwrap()
    }

    #[test]
    fn test_endpoint_default() {
        let transport = transport();
        assert_eq!(transport.endpoint(), "mandrillapp.com");
        assert_eq!(transport.to_string(), "mandrill+api://mandrillapp.com");
    }

    #[test]
    fn test_endpoint_with_host_and_port() {
        let transport = transport().with_host("example.com").with_port(8025);
        assert_eq!(transport.endpoint(), "example.com:8025");
        assert_eq!(transport.to_string(), "mandrill+api://example.com:8025");
        assert_eq!(
            transport.url(),
            "https://example.com:8025/api/1.0/messages/send.json"
        );
    }

    #[test]
    fn test_endpoint_empty_host_falls_back() {
        let transport = transport().with_host("").with_port(99);
        assert_eq!(transport.endpoint(), "mandrillapp.com:99");
    }

    #[test]
    fn test_payload_basic_fields() {
        let email = Email::new()
            .from(Address::named("Fabien", "fabien@example.com"))
            .to(Address::named("Saif", "saif@example.com"))
            .subject("Hello!")
            .with_text("Hello There!")
            .with_html("<b>Hello There!</b>");

        let payload = transport().payload(&email, &envelope_for(&email)).unwrap();

        assert_eq!(
            payload,
            json!({
                "key": "KEY",
                "message": {
                    "html": "<b>Hello There!</b>",
                    "text": "Hello There!",
                    "subject": "Hello!",
                    "from_email": "fabien@example.com",
                    "from_name": "Fabien",
                    "to": [{"email": "saif@example.com", "type": "to", "name": "Saif"}]
                }
            })
        );
    }

    #[test]
    fn test_payload_omits_empty_names() {
        let email = Email::new()
            .from("sender@example.com")
            .to("user@example.com")
            .subject("Hi");

        let payload = transport().payload(&email, &envelope_for(&email)).unwrap();

        assert!(payload["message"].get("from_name").is_none());
        assert!(payload["message"]["to"][0].get("name").is_none());
        assert!(payload["message"].get("headers").is_none());
        assert!(payload.get("attachments").is_none());
        assert!(payload.get("images").is_none());
        assert_eq!(payload["message"]["html"], Value::Null);
    }

    #[test]
    fn test_payload_classifies_recipients_bcc_first() {
        let email = Email::new()
            .from("sender@example.com")
            .to("to@example.com")
            .cc("cc@example.com")
            .bcc("bcc@example.com")
            .cc("both@example.com")
            .bcc("both@example.com");

        let envelope = Envelope::new(
            Address::new("sender@example.com"),
            vec![
                Address::new("both@example.com"),
                Address::new("to@example.com"),
                Address::new("cc@example.com"),
                Address::new("bcc@example.com"),
                Address::new("outsider@example.com"),
            ],
        )
        .unwrap();

        let payload = transport().payload(&email, &envelope).unwrap();
        let kinds: Vec<(&str, &str)> = payload["message"]["to"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| (r["email"].as_str().unwrap(), r["type"].as_str().unwrap()))
            .collect();

        assert_eq!(
            kinds,
            [
                ("both@example.com", "bcc"),
                ("to@example.com", "to"),
                ("cc@example.com", "cc"),
                ("bcc@example.com", "bcc"),
                ("outsider@example.com", "to"),
            ]
        );
    }

    #[test]
    fn test_payload_splits_inline_attachments() {
        let email = Email::new()
            .from("sender@example.com")
            .to("user@example.com")
            .attach(Attachment::new("report.txt", "text/plain", b"report".to_vec()))
            .attach(Attachment::inline("logo", "image/png", b"png".to_vec()));

        let payload = transport().payload(&email, &envelope_for(&email)).unwrap();

        assert_eq!(
            payload["attachments"],
            json!([{"content": "cmVwb3J0", "type": "text/plain", "name": "report.txt"}])
        );
        assert_eq!(
            payload["images"],
            json!([{"content": "cG5n", "type": "image/png", "name": "logo"}])
        );
    }

    #[test]
    fn test_payload_bypasses_reserved_headers() {
        let email = Email::new()
            .from("sender@example.com")
            .to("user@example.com")
            .with_header("From", "sender@example.com")
            .with_header("Subject", "ignored")
            .with_header("X-Custom", "first")
            .with_header("to", "user@example.com")
            .with_header("CONTENT-TYPE", "text/html")
            .with_header("Cc", "copy@example.com")
            .with_header("Bcc", "hidden@example.com")
            .with_header("Reply-To", "reply@example.com");

        let payload = transport().payload(&email, &envelope_for(&email)).unwrap();

        assert_eq!(
            payload["message"]["headers"],
            json!(["X-Custom: first", "Reply-To: reply@example.com"])
        );
    }

    #[test]
    fn test_payload_tags_and_metadata() {
        let email = Email::new()
            .from("sender@example.com")
            .to("user@example.com")
            .with_tag("password-reset")
            .with_metadata("user_id", "42");

        let payload = transport().payload(&email, &envelope_for(&email)).unwrap();

        assert_eq!(payload["message"]["tags"], json!(["password-reset"]));
        assert_eq!(payload["message"]["metadata"], json!({"user_id": "42"}));
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", transport());
        assert!(!debug.contains("KEY"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_error_field_text() {
        assert_eq!(text(&Some(json!(12))), "12");
        assert_eq!(text(&Some(json!("-1"))), "-1");
        assert_eq!(text(&None), "");
    }
}
