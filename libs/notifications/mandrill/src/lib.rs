//! Mandrill transactional email transport
//!
//! Maps a composed [`Email`] and its delivery [`Envelope`] onto the Mandrill
//! `messages/send` API, and maps the API's answer back into a [`SentMessage`]
//! or a [`TransportError`].
//!
//! ## Components
//!
//! - **Models**: `Email`, `Address`, `Attachment`, `Envelope`
//! - **Transport**: `MandrillApiTransport` behind the `ApiTransport` trait
//! - **HTTP seam**: `HttpClient` (implemented for `reqwest::Client`) and `MockHttpClient`
//! - **Config**: `MandrillConfig`, loaded from `MANDRILL_*` environment variables
//!
//! ## Usage
//!
//! ```ignore
//! use mandrill::{ApiTransport, Email, MandrillApiTransport};
//!
//! let transport = MandrillApiTransport::from_env()?;
//! let email = Email::new()
//!     .from("noreply@example.com")
//!     .to("user@example.com")
//!     .subject("Welcome!")
//!     .with_text("Thanks for signing up.");
//!
//! let sent = transport.send_email(&email).await?;
//! println!("queued as {:?}", sent.message_id());
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod provider;

pub use config::MandrillConfig;
pub use error::{MailerError, MailerResult, TransportError};
pub use http::{ClientError, HttpClient, HttpResponse, MockHttpClient};
pub use models::{Address, Attachment, Disposition, Email, Envelope, Header};
pub use provider::{ApiTransport, MandrillApiTransport, RecipientStatus, SentMessage};
