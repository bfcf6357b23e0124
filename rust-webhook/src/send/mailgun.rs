//! Mailgun messages API sender.
//!
//! Reference: https://documentation.mailgun.com/docs/mailgun/api-reference/openapi-final/tag/Messages/

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use super::MessageSender;
use crate::error::SendError;
use crate::message::OutboundMessage;

/// Sends messages through `POST {api_base}/{domain}/messages`.
#[derive(Clone)]
pub struct MailgunSender {
    client: Client,
    api_base: String,
    domain: String,
    api_key: String,
}

/// Mailgun's acknowledgement of a queued message.
#[derive(Debug, Default, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    message: String,
}

impl MailgunSender {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        domain: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            domain: domain.into(),
            api_key: api_key.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.api_base, self.domain)
    }
}

/// Build the form fields for a message.
///
/// `h:In-Reply-To` is present only when the message answers another one, and
/// `html` only when an HTML body was rendered.
fn form_fields(message: &OutboundMessage) -> Vec<(&'static str, &str)> {
    let mut fields = vec![
        ("from", message.sender.as_str()),
        ("to", message.recipient.as_str()),
        ("subject", message.subject.as_str()),
        ("text", message.plain_body.as_str()),
    ];

    if let Some(html) = message.html_body.as_deref().filter(|h| !h.is_empty()) {
        fields.push(("html", html));
    }

    if let Some(id) = message.in_reply_to.as_deref().filter(|id| !id.is_empty()) {
        fields.push(("h:In-Reply-To", id));
    }

    fields
}

#[async_trait]
impl MessageSender for MailgunSender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), SendError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(&self.api_key))
            .form(&form_fields(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "[unavailable]".to_string());

            error!(
                to = %message.recipient,
                status_code = status.as_u16(),
                body = %body,
                "mailgun_send_failed"
            );

            return Err(SendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // Delivery is already accepted at this point; the body is informational.
        let ack: SendResponse = response.json().await.unwrap_or_default();

        info!(
            to = %message.recipient,
            response_id = %ack.id,
            response_message = %ack.message,
            "mail_sent"
        );

        Ok(())
    }
}
