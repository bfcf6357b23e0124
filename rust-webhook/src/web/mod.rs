//! Web server module for handling inbound email webhooks.
//!
//! The server stays thin and fast:
//! - Receives Mailgun inbound route deliveries on `/submit`
//! - Verifies the signature when a signing key is configured
//! - Hands the message to the dispatcher and returns 200 OK immediately
//!
//! All routing, enrichment and delivery happens on the dispatcher's tasks.

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, submit, AppState, HealthResponse, InboundForm, WebhookResponse};
pub use signature::{SignatureError, SignatureVerifier};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/submit", post(submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
