//! rwnews - Inbound email router with link enrichment.
//!
//! Emails arrive as Mailgun inbound route webhooks. Each message is checked
//! for links: with none it is relayed to the group address, with exactly one
//! the linked article is fetched and attached, and with more the sender gets
//! a reply saying so.
//!
//! ## Architecture
//!
//! ```text
//! Webhook → Web Server → Dispatcher → Engine → Resolver (Readability)
//!                                        ↓
//!                                      Sender (Mailgun)
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod message;
pub mod resolve;
pub mod send;
pub mod web;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::Dispatcher;
pub use engine::{Engine, Route};
pub use error::{ConfigError, ResolveError, SendError};
pub use message::{InboundMessage, OutboundMessage, ParsedArticle};
pub use resolve::{ContentResolver, ReadabilityClient};
pub use send::{MailgunSender, MessageSender};
pub use web::AppState;
