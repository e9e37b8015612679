//! Push subscription with reconnection

use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

use super::ingest::{process_signature, Channel, ProcessOutcome};
use super::{Watch, WatchContext};
use crate::constants::defaults::PUSH_CHANNEL_CAPACITY;

/// Delay between reconnection attempts.
///
/// Starts at `base` and doubles up to `max`; with `base == max` the delay is
/// fixed.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let max = max.max(base);
        Self {
            base,
            max,
            current: base,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

/// Keep a push subscription open for the watch, reconnecting after every
/// close or failure until the watch goes stale.
///
/// Reconnecting never touches the watch state: the dedup index and the
/// inactivity timer carry over. The first failure after a working
/// subscription is reported to the reply target. A subscription counts as
/// working once it delivered a signature or stayed up for the longest
/// reconnect delay.
pub(super) async fn run_push_supervisor(ctx: WatchContext, watch: Watch) {
    let mut backoff = Backoff::new(ctx.config.reconnect_delay, ctx.config.reconnect_max_delay);
    let mut attempt: u64 = 0;
    let mut outage = false;

    while ctx.shared.is_current(watch.epoch).await {
        attempt += 1;
        info!("🔌 Opening push subscription for {} (attempt {})", watch.target, attempt);

        let started = Instant::now();
        let (tx, rx) = mpsc::channel(PUSH_CHANNEL_CAPACITY);
        let (result, received) = tokio::join!(
            ctx.source.subscribe(watch.target.pubkey(), tx),
            consume(&ctx, &watch, rx)
        );
        let Some(received) = received else {
            break;
        };

        let held = started.elapsed() >= backoff.max();
        if (received > 0 || held) && outage {
            info!("🟢 Push subscription for {} recovered", watch.target);
            outage = false;
        }

        match result {
            Ok(()) => warn!("⚠️ Push subscription for {} closed", watch.target),
            Err(e) => {
                warn!("⚠️ Push subscription for {} failed: {}", watch.target, e);
                ctx.report_outage(&watch, "Subscription", &mut outage, &e.to_string());
            }
        }

        if held {
            backoff.reset();
        }
        let delay = backoff.next_delay();
        info!("🔄 Reconnecting push channel for {} in {:?}", watch.target, delay);
        sleep(delay).await;
    }

    debug!("Push supervisor for {} (epoch {}) stopped", watch.target, watch.epoch);
}

/// Process pushed signatures until the subscription drops its sender.
///
/// Returns how many signatures arrived, or `None` when the watch went stale
/// underneath.
async fn consume(ctx: &WatchContext, watch: &Watch, mut rx: mpsc::Receiver<String>) -> Option<usize> {
    let mut received = 0;
    while let Some(signature) = rx.recv().await {
        received += 1;
        if process_signature(ctx, watch, &signature, Channel::Push).await == ProcessOutcome::Stale {
            return None;
        }
    }
    Some(received)
}
