//! Outbound delivery of watchdog messages
//!
//! Delivery is fire-and-forget from the watchdog's point of view: callers
//! log a failed delivery and carry on. Nothing in the watch state depends on
//! whether a message reached anyone.

pub mod messages;
mod telegram;

use std::time::Duration;

use async_trait::async_trait;
use log::info;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::models::ReplyTarget;
use crate::errors::WatchdogResult;

pub use self::telegram::TelegramNotifier;

/// Sends text to a reply target
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, reply_to: &ReplyTarget, text: &str) -> WatchdogResult<()>;
}

/// Writes messages to the log instead of delivering them.
///
/// Used when no bot token is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, reply_to: &ReplyTarget, text: &str) -> WatchdogResult<()> {
        info!("[{}] {}", reply_to, text);
        Ok(())
    }
}

/// Spaces consecutive deliveries at least `min_interval` apart.
///
/// Callers queue up in arrival order; each one reserves the next free slot
/// and sleeps until it, so the lock is never held across a delivery.
pub struct RateLimitedNotifier {
    inner: Box<dyn Notifier>,
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimitedNotifier {
    pub fn new(inner: Box<dyn Notifier>, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    async fn reserve_slot(&self) -> Instant {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        let slot = match *next_slot {
            Some(at) if at > now => at,
            _ => now,
        };
        *next_slot = Some(slot + self.min_interval);
        slot
    }
}

#[async_trait]
impl Notifier for RateLimitedNotifier {
    async fn notify(&self, reply_to: &ReplyTarget, text: &str) -> WatchdogResult<()> {
        let slot = self.reserve_slot().await;
        sleep_until(slot).await;
        self.inner.notify(reply_to, text).await
    }
}
