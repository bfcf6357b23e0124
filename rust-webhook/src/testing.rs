//! Test doubles for the resolver and sender seams.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{ResolveError, SendError};
use crate::message::{InboundMessage, OutboundMessage, ParsedArticle};
use crate::resolve::ContentResolver;
use crate::send::MessageSender;

/// Resolver returning a fixed article, or a fixed HTTP failure.
pub struct StubResolver {
    outcome: Result<ParsedArticle, (u16, String)>,
    pub calls: Mutex<Vec<String>>,
}

impl StubResolver {
    pub fn article(article: ParsedArticle) -> Self {
        Self {
            outcome: Ok(article),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            outcome: Err((status, body.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentResolver for StubResolver {
    async fn resolve(&self, page_url: &str) -> Result<ParsedArticle, ResolveError> {
        self.calls.lock().unwrap().push(page_url.to_string());
        match &self.outcome {
            Ok(article) => Ok(article.clone()),
            Err((status, body)) => Err(ResolveError::Status {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

/// Sender that records every message and optionally fails.
pub struct RecordingSender {
    pub sent: Mutex<Vec<OutboundMessage>>,
    notify: Option<mpsc::UnboundedSender<OutboundMessage>>,
    fail_with: Option<u16>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            notify: None,
            fail_with: None,
        }
    }

    /// Also forward each sent message to the returned receiver.
    pub fn with_channel() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sender = Self {
            notify: Some(tx),
            ..Self::new()
        };
        (sender, rx)
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), SendError> {
        self.sent.lock().unwrap().push(message.clone());
        if let Some(tx) = &self.notify {
            let _ = tx.send(message.clone());
        }
        match self.fail_with {
            Some(status) => Err(SendError::Status {
                status,
                body: "send failed".to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Inbound message shaped like a typical Mailgun route delivery.
pub fn inbound(subject: &str, stripped_text: &str) -> InboundMessage {
    InboundMessage {
        recipient: "test@rwnews.example.com".to_string(),
        sender: "lincoln@example.com".to_string(),
        from: "Lincoln <lincoln@example.com>".to_string(),
        subject: subject.to_string(),
        body_plain: format!("{}\n\n> earlier thread", stripped_text),
        stripped_text: stripped_text.to_string(),
        headers: [(
            "message-id".to_string(),
            "<CAF1@mail.example.com>".to_string(),
        )]
        .into_iter()
        .collect(),
        ..Default::default()
    }
}
