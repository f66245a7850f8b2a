use crate::alerts::message::ALERT_TITLE;
use crate::alerts::AlertMessage;
use crate::error::AlertError;
use crate::notifiers::Notifier;
use log::debug;
use reqwest::Client;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Slack notifier posting Block Kit messages to an incoming webhook
///
/// The webhook URL already identifies the workspace and channel, so no token
/// is sent with the request.
pub struct SlackNotifier {
    client: Client,
    webhook_url: String,
}

/// Request body for a Slack incoming webhook
#[derive(Debug, Serialize)]
struct WebhookPayload {
    /// Fallback text for clients that do not render blocks
    text: String,
    blocks: Vec<Block>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Block {
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<TextObject>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fields: Option<Vec<TextObject>>,
    },
}

#[derive(Debug, Serialize)]
struct TextObject {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

impl TextObject {
    fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            kind: "mrkdwn",
            text: text.into(),
        }
    }
}

impl SlackNotifier {
    /// Create a notifier for the given webhook URL
    ///
    /// # Errors
    ///
    /// Returns `AlertError::NotConfigured` if the URL is empty or the HTTP
    /// client cannot be built.
    pub fn new(webhook_url: String, timeout: Duration) -> Result<Self, AlertError> {
        if webhook_url.trim().is_empty() {
            return Err(AlertError::NotConfigured(
                "Slack webhook URL is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AlertError::NotConfigured(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// Header section followed by a section holding the metric fields
    fn build_payload(message: &AlertMessage) -> WebhookPayload {
        WebhookPayload {
            text: message.to_text(),
            blocks: vec![
                Block::Section {
                    text: Some(TextObject::mrkdwn(ALERT_TITLE)),
                    fields: None,
                },
                Block::Section {
                    text: None,
                    fields: Some(message.fields().into_iter().map(TextObject::mrkdwn).collect()),
                },
            ],
        }
    }
}

impl Notifier for SlackNotifier {
    fn send<'a>(
        &'a self,
        message: &'a AlertMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), AlertError>> + Send + 'a>> {
        Box::pin(async move {
            let payload = Self::build_payload(message);

            let response = self
                .client
                .post(&self.webhook_url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| AlertError::DeliveryFailed(format!("HTTP request failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(AlertError::DeliveryFailed(format!(
                    "Slack webhook returned error {}: {}",
                    status, error_text
                )));
            }

            debug!("Slack webhook accepted alert with status {}", status);
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "slack"
    }
}
