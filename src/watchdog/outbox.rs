//! Ordered delivery of outgoing messages
//!
//! One task sends everything, one message at a time. Alerts and other
//! urgent messages go ahead of queued transfer announcements, so a burst of
//! announcements behind a rate limit cannot hold back an alert.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::ReplyTarget;
use crate::notify::Notifier;

/// How a message is queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Alerts, channel errors, start and stop; never dropped
    Urgent,
    /// Transfer announcements; dropped when the queue is full
    Routine,
}

#[derive(Debug)]
struct Outgoing {
    reply_to: ReplyTarget,
    text: String,
}

/// Sending half of the delivery queues
#[derive(Clone)]
pub(crate) struct Outbox {
    urgent: mpsc::UnboundedSender<Outgoing>,
    routine: mpsc::Sender<Outgoing>,
}

impl Outbox {
    /// Start the delivery task. Must be called inside a Tokio runtime.
    pub(crate) fn spawn(notifier: Arc<dyn Notifier>, routine_capacity: usize) -> (Self, JoinHandle<()>) {
        let (urgent_tx, urgent_rx) = mpsc::unbounded_channel();
        let (routine_tx, routine_rx) = mpsc::channel(routine_capacity.max(1));
        let task = tokio::spawn(run_delivery(notifier, urgent_rx, routine_rx));
        (
            Self {
                urgent: urgent_tx,
                routine: routine_tx,
            },
            task,
        )
    }

    /// Queue `text` for `reply_to`; a failed delivery is only logged.
    pub(crate) fn send(&self, reply_to: &ReplyTarget, text: String, priority: Priority) {
        let message = Outgoing {
            reply_to: reply_to.clone(),
            text,
        };
        match priority {
            Priority::Urgent => {
                if let Err(mpsc::error::SendError(message)) = self.urgent.send(message) {
                    warn!("⚠️ Delivery stopped, dropping message for {}", message.reply_to);
                }
            }
            Priority::Routine => match self.routine.try_send(message) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(message)) => {
                    warn!("⚠️ Delivery queue full, dropping announcement for {}", message.reply_to);
                }
                Err(mpsc::error::TrySendError::Closed(message)) => {
                    warn!("⚠️ Delivery stopped, dropping message for {}", message.reply_to);
                }
            },
        }
    }
}

async fn run_delivery(
    notifier: Arc<dyn Notifier>,
    mut urgent: mpsc::UnboundedReceiver<Outgoing>,
    mut routine: mpsc::Receiver<Outgoing>,
) {
    loop {
        let message = tokio::select! {
            biased;
            Some(message) = urgent.recv() => message,
            Some(message) = routine.recv() => message,
            else => break,
        };
        if let Err(e) = notifier.notify(&message.reply_to, &message.text).await {
            warn!("⚠️ Could not deliver message to {}: {}", message.reply_to, e);
        }
    }
    debug!("Delivery task stopped");
}
