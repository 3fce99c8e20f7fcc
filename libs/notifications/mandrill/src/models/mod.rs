//! Composed email model consumed by the transport.

mod envelope;

pub use envelope::Envelope;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Mailbox: an address with an optional display name (empty when absent)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Address {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl Address {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: String::new(),
        }
    }

    pub fn named(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }

    /// Two mailboxes match when their addresses are equal, ignoring ASCII case
    /// and display names.
    pub fn matches(&self, other: &Address) -> bool {
        self.email.eq_ignore_ascii_case(&other.email)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.email)
        } else {
            write!(f, "{} <{}>", self.name, self.email)
        }
    }
}

impl From<&str> for Address {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

impl From<String> for Address {
    fn from(email: String) -> Self {
        Self::new(email)
    }
}

/// A single header with its serialized value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// How an attachment is presented to the recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    Attachment,
    /// Embedded in the HTML body, referenced by `cid:`
    Inline,
}

/// File attached to an email
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Raw, unencoded content
    pub body: Vec<u8>,
    /// MIME type, e.g. `application/pdf`
    pub content_type: String,
    pub disposition: Disposition,
    /// File name, or content-id for inline parts
    pub filename: Option<String>,
}

impl Attachment {
    /// Regular attachment
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
            disposition: Disposition::Attachment,
            filename: Some(filename.into()),
        }
    }

    /// Inline part, e.g. an image the HTML body refers to as `cid:{name}`
    pub fn inline(
        name: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            disposition: Disposition::Inline,
            ..Self::new(name, content_type, body)
        }
    }

    pub fn is_inline(&self) -> bool {
        self.disposition == Disposition::Inline
    }
}

/// Fully composed email, ready for transport-specific serialization
#[derive(Debug, Clone, Default)]
pub struct Email {
    /// Author mailboxes; the first one is the envelope sender by default
    pub from: Vec<Address>,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    pub subject: String,
    /// Plain text body
    pub body_text: Option<String>,
    /// HTML body
    pub body_html: Option<String>,
    /// Headers in declaration order
    pub headers: Vec<Header>,
    pub attachments: Vec<Attachment>,
    /// Provider tags used for reporting
    pub tags: Vec<String>,
    /// Provider metadata attached to the message
    pub metadata: BTreeMap<String, String>,
}

impl Email {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, address: impl Into<Address>) -> Self {
        self.from.push(address.into());
        self
    }

    pub fn to(mut self, address: impl Into<Address>) -> Self {
        self.to.push(address.into());
        self
    }

    pub fn cc(mut self, address: impl Into<Address>) -> Self {
        self.cc.push(address.into());
        self
    }

    pub fn bcc(mut self, address: impl Into<Address>) -> Self {
        self.bcc.push(address.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set plain text body
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body_text = Some(text.into());
        self
    }

    /// Set HTML body
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.body_html = Some(html.into());
        self
    }

    /// Append a header. Order is preserved.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display() {
        assert_eq!(Address::new("a@example.com").to_string(), "a@example.com");
        assert_eq!(
            Address::named("Alice", "a@example.com").to_string(),
            "Alice <a@example.com>"
        );
    }

    #[test]
    fn test_address_matches_ignores_case_and_name() {
        let plain = Address::new("Bob@Example.com");
        let named = Address::named("Bob", "bob@example.com");

        assert!(plain.matches(&named));
        assert!(!plain.matches(&Address::new("rob@example.com")));
    }

    #[test]
    fn test_inline_attachment() {
        let image = Attachment::inline("logo", "image/png", vec![1, 2, 3]);
        assert!(image.is_inline());
        assert_eq!(image.filename.as_deref(), Some("logo"));

        let file = Attachment::new("report.pdf", "application/pdf", b"%PDF".to_vec());
        assert!(!file.is_inline());
    }

    #[test]
    fn test_email_builder_keeps_header_order() {
        let email = Email::new()
            .from("sender@example.com")
            .to("user@example.com")
            .subject("Hello")
            .with_header("X-First", "1")
            .with_header("X-Second", "2");

        let names: Vec<_> = email.headers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["X-First", "X-Second"]);
        assert_eq!(email.subject, "Hello");
        assert_eq!(email.to, vec![Address::new("user@example.com")]);
    }
}
