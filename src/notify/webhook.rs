//! Chat webhook delivery.
//!
//! Posts a message as a SeaTalk-style text payload, wrapped in a code block
//! so the table keeps its alignment.

use crate::error::DeliveryError;
use crate::notify::Notifier;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the webhook notifier.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

/// Webhook request body.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    tag: &'static str,
    text: TextContent<'a>,
}

#[derive(Debug, Serialize)]
struct TextContent<'a> {
    format: u8,
    content: &'a str,
}

/// Sends messages to a chat group webhook with a single POST.
pub struct WebhookNotifier {
    config: WebhookConfig,
    http_client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self, DeliveryError> {
        info!("Webhook notifier targeting {}", config.url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        let content = wrap_code_block(message);
        let payload = build_payload(&content);
        debug!("Posting {} bytes to webhook", content.len());

        let response = self
            .http_client
            .post(&self.config.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    DeliveryError::Connect {
                        url: self.config.url.clone(),
                        source: e,
                    }
                } else {
                    DeliveryError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status { status, body });
        }

        info!("Message sent successfully");
        Ok(())
    }
}

/// Wrap a message in a triple-backtick code block.
pub fn wrap_code_block(message: &str) -> String {
    format!("```\n{}\n```", message)
}

fn build_payload(content: &str) -> WebhookPayload<'_> {
    WebhookPayload {
        tag: "text",
        text: TextContent { format: 1, content },
    }
}
