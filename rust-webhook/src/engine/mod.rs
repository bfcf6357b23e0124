//! Decision engine: routes one inbound message to one outbound message.
//!
//! ## Routing
//!
//! ```text
//! strict URLs in stripped text
//!   0  → Forwarded     (relay to the group address)
//!   1  → Enriched      (article fetched and rendered)
//!      → EnrichFailed  (error reply to the sender)
//!   2+ → Rejected      (reply to the sender)
//! ```
//!
//! Every route ends with exactly one send attempt.

pub mod render;
pub mod urls;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::SendError;
use crate::message::{InboundMessage, OutboundMessage, ParsedArticle};
use crate::resolve::ContentResolver;
use crate::send::MessageSender;

pub use render::{render_enriched, RenderedBodies};
pub use urls::extract_strict_urls;

/// Reply body for messages carrying more than one link.
pub const TOO_MANY_URLS_BODY: &str = "More than one URL was detected, this isn't supported";

/// Terminal state reached for a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// More than one link; the sender was told so.
    Rejected { url_count: usize },
    /// No link; relayed unchanged to the group.
    Forwarded,
    /// One link; article content attached and sent to the group.
    Enriched { url: String },
    /// One link that could not be resolved; the sender got the error.
    EnrichFailed { url: String, error: String },
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Rejected { .. } => "rejected",
            Route::Forwarded => "forwarded",
            Route::Enriched { .. } => "enriched",
            Route::EnrichFailed { .. } => "enrich_failed",
        }
    }
}

/// Applies the routing policy and hands the result to the sender.
pub struct Engine {
    group_address: String,
    resolver: Arc<dyn ContentResolver>,
    sender: Arc<dyn MessageSender>,
}

impl Engine {
    pub fn new(
        group_address: impl Into<String>,
        resolver: Arc<dyn ContentResolver>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            group_address: group_address.into(),
            resolver,
            sender,
        }
    }

    /// Process one message end to end.
    ///
    /// The sender is invoked exactly once. Its error is returned as-is; a
    /// resolver failure is not an error here, it becomes the
    /// [`Route::EnrichFailed`] reply.
    pub async fn process(&self, message: &InboundMessage) -> Result<Route, SendError> {
        let (route, outbound) = self.decide(message).await;

        info!(
            route = route.name(),
            to = %outbound.recipient,
            has_html = outbound.html_body.is_some(),
            in_reply_to = ?outbound.in_reply_to,
            "engine_route_decided"
        );

        self.sender.send(&outbound).await?;

        Ok(route)
    }

    /// Build the outbound message without sending it.
    pub async fn decide(&self, message: &InboundMessage) -> (Route, OutboundMessage) {
        let urls = extract_strict_urls(&message.stripped_text);

        match urls.as_slice() {
            [] => (Route::Forwarded, self.forward(message)),
            [url] => self.enrich(message, url).await,
            _ => {
                let reply = OutboundMessage::reply_to(message, TOO_MANY_URLS_BODY);
                (Route::Rejected { url_count: urls.len() }, reply)
            }
        }
    }

    fn forward(&self, message: &InboundMessage) -> OutboundMessage {
        OutboundMessage {
            recipient: self.group_address.clone(),
            sender: message.from.clone(),
            subject: message.subject.clone(),
            plain_body: message.stripped_text.clone(),
            html_body: None,
            in_reply_to: None,
        }
    }

    async fn enrich(&self, message: &InboundMessage, url: &str) -> (Route, OutboundMessage) {
        let article = match self.resolver.resolve(url).await {
            Ok(article) => article,
            Err(e) => {
                warn!(url = %url, error = %e, "engine_resolve_failed");
                let body = format!("Error occurred while talking to Readability: {}", e);
                let route = Route::EnrichFailed {
                    url: url.to_string(),
                    error: e.to_string(),
                };
                return (route, OutboundMessage::reply_to(message, body));
            }
        };

        let outbound = self.enriched_message(message, &article);
        (Route::Enriched { url: url.to_string() }, outbound)
    }

    fn enriched_message(&self, message: &InboundMessage, article: &ParsedArticle) -> OutboundMessage {
        // The sender's own subject wins over the extracted title
        let subject = if message.subject.is_empty() {
            article.title.clone()
        } else {
            message.subject.clone()
        };

        let (plain_body, html_body) = match render_enriched(message, article) {
            Ok(RenderedBodies { plain, html }) => (plain, Some(html)),
            Err(e) => {
                error!(error = %e, "engine_render_failed");
                (message.body_plain.clone(), None)
            }
        };

        OutboundMessage {
            recipient: self.group_address.clone(),
            sender: message.from.clone(),
            subject,
            plain_body,
            html_body,
            in_reply_to: None,
        }
    }
}
