//! Email delivery boundary.
//!
//! [`EmailSender`] performs exactly one delivery attempt per call and returns
//! the provider's HTTP status. Non-2xx responses and transport errors are
//! returned as errors; nothing here retries.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::core::types::OutboundEmail;
use crate::io::config::SdrConfig;
use crate::io::credentials::Credentials;

/// Abstraction over transactional email providers.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver `email` once and return the provider status code.
    async fn send(&self, email: &OutboundEmail) -> Result<u16>;
}

/// SendGrid v3 `mail/send` client.
pub struct SendGridSender {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    from_email: String,
}

impl SendGridSender {
    pub fn new(config: &SdrConfig, credentials: &Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("build email http client")?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/v3/mail/send",
                config.sendgrid_base_url.trim_end_matches('/')
            ),
            api_key: credentials.sendgrid_api_key.clone(),
            from_email: credentials.from_email.clone(),
        })
    }
}

/// Request body for a single-recipient HTML email.
fn mail_payload(from_email: &str, email: &OutboundEmail) -> Value {
    json!({
        "personalizations": [{"to": [{"email": email.to_address}]}],
        "from": {"email": from_email},
        "subject": email.subject,
        "content": [{"type": "text/html", "value": email.html_body}],
    })
}

#[async_trait]
impl EmailSender for SendGridSender {
    #[instrument(skip_all, fields(to = %email.to_address))]
    async fn send(&self, email: &OutboundEmail) -> Result<u16> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&mail_payload(&self.from_email, email))
            .send()
            .await
            .context("send email via SendGrid")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "email delivery rejected");
            return Err(anyhow!(
                "email delivery failed with status {}: {}",
                status,
                body.chars().take(500).collect::<String>()
            ));
        }

        info!(status = status.as_u16(), "email accepted");
        Ok(status.as_u16())
    }
}
