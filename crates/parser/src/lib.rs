//! `billfold-parser` — invoice field extraction via an LLM service.
//!
//! A thin wrapper over an OpenAI-compatible chat-completions endpoint: one
//! fixed extraction prompt, JSON response mode, and the permissive invoice
//! schema on the way out. Anything the model is unsure about is simply
//! absent from the result.

mod prompt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use thiserror::Error;

use billfold_invoices::Invoice;

pub use prompt::EXTRACTION_PROMPT;

/// Free-text parse requests are capped at 100 KB.
pub const MAX_TEXT_BYTES: usize = 100 * 1024;

/// Uploaded images are capped at 1 MB.
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;

/// Image types the vision path accepts.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input is empty")]
    EmptyInput,

    #[error("input exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("parser transport error: {0}")]
    Transport(String),

    #[error("parser service error: status {status}: {body}")]
    Service { status: u16, body: String },

    #[error("parser returned malformed invoice data: {0}")]
    Malformed(String),
}

/// Client for the extraction endpoint.
#[derive(Debug, Clone)]
pub struct LlmParser {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl LlmParser {
    /// `endpoint` is the full chat-completions URL.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Extract invoice fields from free text.
    pub async fn parse_text(&self, text: &str) -> Result<Invoice, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }
        if text.len() > MAX_TEXT_BYTES {
            return Err(ParseError::TooLarge { limit: MAX_TEXT_BYTES });
        }

        let user = serde_json::json!({ "role": "user", "content": text });
        self.complete(user).await
    }

    /// Extract invoice fields from an uploaded image.
    pub async fn parse_image(&self, bytes: &[u8], content_type: &str) -> Result<Invoice, ParseError> {
        if bytes.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ParseError::TooLarge { limit: MAX_IMAGE_BYTES });
        }
        if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
            return Err(ParseError::UnsupportedType(content_type.to_string()));
        }

        let data_url = format!("data:{content_type};base64,{}", BASE64.encode(bytes));
        let user = serde_json::json!({
            "role": "user",
            "content": [
                { "type": "text", "text": "Extract all invoice information from this image:" },
                { "type": "image_url", "image_url": { "url": data_url } }
            ]
        });
        self.complete(user).await
    }

    async fn complete(&self, user_message: serde_json::Value) -> Result<Invoice, ParseError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": EXTRACTION_PROMPT },
                user_message
            ],
            "temperature": 0.1,
            "response_format": { "type": "json_object" }
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ParseError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ParseError::Service { status: status.as_u16(), body });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ParseError::Transport(e.to_string()))?;

        let content = chat
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or("{}");

        invoice_from_content(content)
    }
}

/// Decode the model's JSON answer through the permissive schema.
fn invoice_from_content(content: &str) -> Result<Invoice, ParseError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| ParseError::Malformed(e.to_string()))?;
    Invoice::from_value(value).map_err(|e| ParseError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> LlmParser {
        LlmParser::new("http://localhost/v1/chat/completions", "key", "gpt-4o")
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_network_call() {
        let err = parser().parse_text("   ").await.unwrap_err();
        assert!(matches!(err, ParseError::EmptyInput));
    }

    #[tokio::test]
    async fn oversized_text_is_rejected() {
        let big = "x".repeat(MAX_TEXT_BYTES + 1);
        let err = parser().parse_text(&big).await.unwrap_err();
        assert!(matches!(err, ParseError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn unsupported_image_types_are_rejected() {
        let err = parser().parse_image(b"%PDF-1.4", "application/pdf").await.unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedType(_)));
    }

    #[test]
    fn model_answers_decode_through_the_permissive_schema() {
        let invoice = invoice_from_content(
            r#"{
                "sender": { "name": "Acme" },
                "details": {
                    "invoiceNumber": "INV-3",
                    "items": [ { "name": "Widget", "quantity": 2, "unitPrice": 10 } ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(invoice.invoice_number(), Some("INV-3"));
        let items = invoice.details.unwrap().items.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn non_json_answers_are_malformed() {
        assert!(matches!(
            invoice_from_content("sorry, I cannot help"),
            Err(ParseError::Malformed(_))
        ));
    }
}
