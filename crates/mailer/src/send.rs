//! Mailer trait and its two implementations.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use thiserror::Error;

use crate::message::OutboundEmail;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(String),

    #[error("mail gateway rejected the message: status {status}: {body}")]
    Gateway { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

/// Delivers through an HTTP mail gateway (JSON POST, bearer API key,
/// base64-encoded attachments).
#[derive(Debug, Clone)]
pub struct HttpMailer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireAttachment {
    filename: String,
    content_type: String,
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<WireAttachment>,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let attachments = email
            .attachments
            .iter()
            .map(|a| WireAttachment {
                filename: a.filename.clone(),
                content_type: a.content_type.clone(),
                content: BASE64.encode(&a.content),
            })
            .collect();

        let body = WireEmail {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.text,
            html: email.html.as_deref(),
            attachments,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Gateway { status: status.as_u16(), body });
        }

        tracing::info!(to = %email.to, subject = %email.subject, "email delivered");
        Ok(())
    }
}

/// Logs the envelope and succeeds. Used when no gateway is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            attachments = email.attachments.len(),
            "email delivery simulated (no mail gateway configured)"
        );
        Ok(())
    }
}
