//! Intake dispatcher.
//!
//! Decouples the webhook response from processing latency. The web handler
//! calls [`Dispatcher::submit`], which never waits: the message either fits in
//! the bounded intake queue or is dropped (reject-newest). A single dispatch
//! loop drains the queue and spawns one task per message, holding at most
//! `concurrency` tasks in flight. While the cap is reached the loop stops
//! receiving, so the queue fills and further submissions are rejected.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::engine::Engine;
use crate::message::InboundMessage;

/// Largest intake queue the dispatcher will allocate.
pub const MAX_QUEUE_CAPACITY: usize = 100_000;

/// Largest number of messages processed at once.
pub const MAX_CONCURRENCY: u32 = 10_000;

/// Handle used to submit messages for processing.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<InboundMessage>,
}

impl Dispatcher {
    /// Start the dispatch loop.
    ///
    /// The loop runs until every `Dispatcher` clone is dropped, then waits for
    /// in-flight tasks to finish before the returned handle completes.
    /// Both limits are clamped to `1..=MAX_*`.
    pub fn spawn(engine: Arc<Engine>, capacity: usize, concurrency: usize) -> (Self, JoinHandle<()>) {
        let capacity = capacity.clamp(1, MAX_QUEUE_CAPACITY);
        let concurrency = u32::try_from(concurrency)
            .unwrap_or(MAX_CONCURRENCY)
            .clamp(1, MAX_CONCURRENCY);

        let (tx, rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(run(rx, engine, concurrency));

        info!(capacity = capacity, concurrency = concurrency, "dispatcher_started");

        (Self { tx }, handle)
    }

    /// Hand a message off for processing without waiting.
    ///
    /// Returns `false` when the intake queue is full or the loop has stopped;
    /// the message is then dropped.
    pub fn submit(&self, message: InboundMessage) -> bool {
        let recipient = message.recipient.clone();
        let subject = message.subject.clone();

        match self.tx.try_send(message) {
            Ok(()) => {
                info!(recipient = %recipient, subject = %subject, "message_submitted");
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(
                    recipient = %recipient,
                    subject = %subject,
                    reason = "queue_full",
                    "message_dropped"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!(
                    recipient = %recipient,
                    subject = %subject,
                    reason = "dispatcher_stopped",
                    "message_dropped"
                );
                false
            }
        }
    }
}

async fn run(mut rx: mpsc::Receiver<InboundMessage>, engine: Arc<Engine>, concurrency: u32) {
    let limit = Arc::new(Semaphore::new(concurrency as usize));

    loop {
        // Wait for a free slot before taking the next message off the queue
        let permit = match Arc::clone(&limit).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let message = match rx.recv().await {
            Some(message) => message,
            None => break,
        };

        info!(
            recipient = %message.recipient,
            in_flight = concurrency as usize - limit.available_permits(),
            "dispatch_task_spawned"
        );

        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            let _permit = permit;
            match engine.process(&message).await {
                Ok(route) => {
                    info!(
                        recipient = %message.recipient,
                        route = route.name(),
                        "message_processed"
                    );
                }
                Err(e) => {
                    error!(
                        recipient = %message.recipient,
                        subject = %message.subject,
                        error = %e,
                        "message_process_failed"
                    );
                }
            }
        });
    }

    // Drain: every permit back means every spawned task has finished
    let _ = limit.acquire_many(concurrency).await;

    info!("dispatcher_stopped");
}
