//! Webhook endpoint handlers.
//!
//! The submit handler only:
//! 1. Verifies the signature (when a signing key is configured)
//! 2. Folds the form into an `InboundMessage`
//! 3. Hands it to the dispatcher and returns
//!
//! Routing, enrichment and delivery happen on the dispatcher's tasks.

use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::dispatch::Dispatcher;
use crate::message::{parse_message_headers, InboundMessage};
use crate::web::signature::SignatureVerifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub verifier: Option<Arc<SignatureVerifier>>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, verifier: Option<SignatureVerifier>) -> Self {
        Self {
            dispatcher,
            verifier: verifier.map(Arc::new),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Inbound email
// =============================================================================

/// Mailgun inbound route form payload.
///
/// Mailgun sends form-encoded data, not JSON.
/// Field names use hyphens, which are aliased here.
#[derive(Debug, Default, Deserialize)]
pub struct InboundForm {
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default, rename = "from")]
    pub from_field: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, rename = "body-plain")]
    pub body_plain: String,
    #[serde(default, rename = "stripped-text")]
    pub stripped_text: String,
    #[serde(default, rename = "body-html")]
    pub body_html: String,
    #[serde(default, rename = "stripped-html")]
    pub stripped_html: String,
    #[serde(default, rename = "message-headers")]
    pub message_headers: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub signature: String,
}

impl InboundForm {
    /// Convert the form into an inbound message.
    ///
    /// Undecodable headers are logged and replaced by an empty map; the
    /// message is still processed.
    pub fn into_message(self) -> InboundMessage {
        let headers = match parse_message_headers(&self.message_headers) {
            Ok(headers) => headers,
            Err(e) => {
                error!(
                    error = %e,
                    headers_preview = %preview(&self.message_headers, 200),
                    "message_headers_parse_failed"
                );
                Default::default()
            }
        };

        InboundMessage {
            recipient: self.recipient,
            sender: self.sender,
            from: self.from_field,
            subject: self.subject,
            body_plain: self.body_plain,
            stripped_text: self.stripped_text,
            body_html: self.body_html,
            stripped_html: self.stripped_html,
            token: self.token,
            signature: self.signature,
            headers,
        }
    }
}

/// Webhook response.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: String,
}

impl WebhookResponse {
    fn new(status: &str) -> Json<Self> {
        Json(Self {
            status: status.to_string(),
        })
    }
}

/// Inbound email endpoint.
///
/// Answers 200 once the form is parsed and handed to the dispatcher, whether
/// or not the dispatcher accepted it; the body reports `accepted` or
/// `dropped`. Only a failed signature check (when enabled) is refused.
pub async fn submit(State(state): State<AppState>, Form(form): Form<InboundForm>) -> impl IntoResponse {
    info!(
        recipient = %form.recipient,
        sender = %form.sender,
        subject = %form.subject,
        body_plain_length = form.body_plain.len(),
        has_body_html = !form.body_html.is_empty(),
        has_signature = !form.signature.is_empty(),
        "inbound_webhook_received"
    );

    if let Some(verifier) = &state.verifier {
        if let Err(e) = verifier.verify(&form.timestamp, &form.token, &form.signature) {
            warn!(recipient = %form.recipient, error = %e, "mailgun_signature_invalid");
            return (StatusCode::UNAUTHORIZED, WebhookResponse::new("unauthorized"));
        }
    }

    let message = form.into_message();

    if message.recipient.is_empty() || message.from.is_empty() || message.body_plain.is_empty() {
        error!(
            recipient = %message.recipient,
            from = %message.from,
            subject = %message.subject,
            body_plain_length = message.body_plain.len(),
            "inbound_sanity_check_failed"
        );
    }

    let accepted = state.dispatcher.submit(message);

    let status = if accepted { "accepted" } else { "dropped" };
    (StatusCode::OK, WebhookResponse::new(status))
}

fn preview(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
