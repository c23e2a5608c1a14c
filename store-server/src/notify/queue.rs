//! Notification queue
//!
//! Bounded mpsc channel drained by a background worker. Enqueueing never
//! blocks the caller; a full queue drops the message with a warning
//! rather than stalling checkout. Each message is attempted up to
//! `MAX_ATTEMPTS` times with a linear backoff (at-least-once within the
//! process; a crash between enqueue and delivery loses the message, which
//! the storefront accepts).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::{Notification, NotificationDispatcher};

const QUEUE_CAPACITY: usize = 256;
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Handle for enqueueing outbound notifications
#[derive(Clone)]
pub struct NotifyQueue {
    tx: mpsc::Sender<Notification>,
}

impl NotifyQueue {
    /// Spawn the delivery worker and return the producer handle
    pub fn start(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(run_worker(rx, dispatcher));
        Self { tx }
    }

    /// Enqueue without blocking. Dropped (and logged) if the queue is full
    /// or the worker is gone.
    pub fn enqueue(&self, notification: Notification) {
        if let Err(e) = self.tx.try_send(notification) {
            tracing::warn!(error = %e, "Notification dropped, queue unavailable");
        }
    }

    pub fn enqueue_all(&self, notifications: Vec<Notification>) {
        for n in notifications {
            self.enqueue(n);
        }
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<Notification>,
    dispatcher: Arc<dyn NotificationDispatcher>,
) {
    while let Some(notification) = rx.recv().await {
        let mut attempt = 1;
        loop {
            match dispatcher.deliver(&notification).await {
                Ok(()) => break,
                Err(e) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        id = %notification.id,
                        attempt,
                        error = %e,
                        "Notification delivery failed, retrying"
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        id = %notification.id,
                        order_id = %notification.order_id,
                        error = %e,
                        "Notification permanently failed"
                    );
                    break;
                }
            }
        }
    }
}
