//! Outbound delivery of processed messages.

pub mod mailgun;

use async_trait::async_trait;

use crate::error::SendError;
use crate::message::OutboundMessage;

pub use mailgun::MailgunSender;

/// Delivers an outbound message through a mail provider.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), SendError>;
}
