//! Test binary to send one email through the Mandrill API
//!
//! Run with: cargo run -p mandrill --bin send_test_email
//!
//! Needs `MANDRILL_API_KEY`, `EMAIL_FROM_ADDRESS` and `EMAIL_TO_ADDRESS`.

use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{env_or_default, env_required, Environment};
use eyre::{Result, WrapErr};
use mandrill::{Address, ApiTransport, Email, MandrillApiTransport};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let transport = MandrillApiTransport::from_env().wrap_err("Failed to configure Mandrill")?;

    let from = Address::named(
        env_or_default("EMAIL_FROM_NAME", ""),
        env_required("EMAIL_FROM_ADDRESS")?,
    );
    let to = env_required("EMAIL_TO_ADDRESS")?;

    let email = Email::new()
        .from(from)
        .to(to.as_str())
        .subject("Test email from the Mandrill transport")
        .with_text("Hello! This is a test email sent via the Mandrill API.")
        .with_html("<h1>Hello!</h1><p>This is a test email sent via the Mandrill API.</p>")
        .with_tag("test");

    info!(transport = %transport, to = %to, "Sending test email");

    let sent = transport
        .send_email(&email)
        .await
        .wrap_err("Failed to send test email")?;

    for recipient in sent.recipients() {
        info!(
            id = %recipient.id,
            email = ?recipient.email,
            status = ?recipient.status,
            reject_reason = ?recipient.reject_reason,
            "Recipient status"
        );
    }

    println!("Email sent successfully!");
    println!("Message ID: {}", sent.message_id().unwrap_or("<none>"));

    Ok(())
}
