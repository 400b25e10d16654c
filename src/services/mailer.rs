// src/services/mailer.rs

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("no recipient for message '{0}'")]
    NoRecipient(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Posts each message as JSON to an HTTP mail relay.
/// Every send is bounded by the client timeout.
pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
    token: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(relay_url: String, token: Option<String>, from: String, timeout: Duration) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            relay_url,
            token,
            from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if message.to.trim().is_empty() {
            return Err(MailError::NoRecipient(message.subject.clone()));
        }

        let mut request = self.client.post(&self.relay_url).json(&RelayRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status: status.as_u16(), body });
        }

        tracing::info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}

/// Used when no relay is configured: the message only goes to the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if message.to.trim().is_empty() {
            return Err(MailError::NoRecipient(message.subject.clone()));
        }
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Email (log only, no relay configured)"
        );
        Ok(())
    }
}
