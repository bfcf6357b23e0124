//! Inbound, outbound and article records.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Inbound
// =============================================================================

/// Snapshot of an email received through a Mailgun inbound route.
///
/// Built once by the web handler and then moved into the processing task
/// that owns it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundMessage {
    /// Address the email was delivered to
    pub recipient: String,
    /// Envelope sender address
    pub sender: String,
    /// From header (display form, e.g. `Jane <jane@example.com>`)
    pub from: String,
    /// Email subject
    pub subject: String,
    /// Full plain text body
    pub body_plain: String,
    /// Plain text body with the quoted reply chain removed
    pub stripped_text: String,
    /// Full HTML body
    pub body_html: String,
    /// HTML body with the quoted reply chain removed
    pub stripped_html: String,
    /// Webhook token
    pub token: String,
    /// Webhook signature
    pub signature: String,
    /// Message headers keyed by lower-cased name
    pub headers: HashMap<String, String>,
}

impl InboundMessage {
    /// Value of the `message-id` header, if the email carried one.
    pub fn message_id(&self) -> Option<&str> {
        self.headers
            .get("message-id")
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}

// =============================================================================
// Outbound
// =============================================================================

/// Message handed to the mail provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: String,
    pub sender: String,
    pub subject: String,
    pub plain_body: String,
    /// HTML alternative part, sent only when present
    pub html_body: Option<String>,
    /// Message-Id of the email being answered, sent as `In-Reply-To`
    pub in_reply_to: Option<String>,
}

impl OutboundMessage {
    /// Build a reply addressed back to the original sender.
    ///
    /// Recipient and sender are swapped and the reply threads onto the
    /// original via its Message-Id.
    pub fn reply_to(source: &InboundMessage, body: impl Into<String>) -> Self {
        Self {
            recipient: source.sender.clone(),
            sender: source.recipient.clone(),
            subject: format!("RE: {}", source.subject),
            plain_body: body.into(),
            html_body: None,
            in_reply_to: source.message_id().map(str::to_string),
        }
    }
}

// =============================================================================
// Article
// =============================================================================

/// Article extracted by the content-extraction service.
///
/// The service reports missing metadata as `null`; those decode as empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedArticle {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub domain: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, rename = "url", deserialize_with = "null_as_empty")]
    pub canonical_url: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}
