//! Watch state shared between the tasks of a watch
//!
//! Every mutation names the epoch it was started under. Assigning a new
//! target bumps the epoch, so work begun for a previous target is rejected
//! as stale instead of touching the new target's state.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::dedup::DedupIndex;
use super::state::{TickOutcome, WatchdogState};
use crate::models::{QualifyingTransfer, WatchTarget};

/// Result of offering a signature to the dedup index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Duplicate,
    Stale,
}

/// Result of applying a record's qualifying transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Recorded { cleared_alert: bool },
    Stale,
}

/// Point-in-time view of the active watch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSnapshot {
    pub epoch: u64,
    pub account: String,
    pub reply_to: String,
    pub seen_signatures: usize,
    pub since_last_transfer: Duration,
    pub alert_latched: bool,
}

struct Session {
    target: WatchTarget,
    dedup: DedupIndex,
    state: WatchdogState,
}

#[derive(Default)]
struct Inner {
    epoch: u64,
    session: Option<Session>,
}

impl Inner {
    fn session_mut(&mut self, epoch: u64) -> Option<&mut Session> {
        if self.epoch == epoch {
            self.session.as_mut()
        } else {
            None
        }
    }
}

#[derive(Default)]
pub struct SharedState {
    inner: Mutex<Inner>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `target` with fresh state and return the new epoch together
    /// with the target it replaced.
    pub async fn begin(
        &self,
        target: WatchTarget,
        dedup_capacity: Option<usize>,
        now: Instant,
    ) -> (u64, Option<WatchTarget>) {
        let mut inner = self.inner.lock().await;
        inner.epoch += 1;
        let previous = inner.session.replace(Session {
            target,
            dedup: DedupIndex::with_capacity_limit(dedup_capacity),
            state: WatchdogState::new(now),
        });
        (inner.epoch, previous.map(|s| s.target))
    }

    /// Drop the active watch, invalidating its epoch.
    pub async fn end(&self) -> Option<WatchTarget> {
        let mut inner = self.inner.lock().await;
        inner.epoch += 1;
        inner.session.take().map(|s| s.target)
    }

    pub async fn is_current(&self, epoch: u64) -> bool {
        let inner = self.inner.lock().await;
        inner.epoch == epoch && inner.session.is_some()
    }

    pub async fn admit(&self, epoch: u64, signature: &str) -> Admission {
        let mut inner = self.inner.lock().await;
        match inner.session_mut(epoch) {
            Some(session) => {
                if session.dedup.admit(signature) {
                    Admission::Admitted
                } else {
                    Admission::Duplicate
                }
            }
            None => Admission::Stale,
        }
    }

    /// Release a signature whose record could not be obtained.
    pub async fn forget(&self, epoch: u64, signature: &str) -> bool {
        let mut inner = self.inner.lock().await;
        inner
            .session_mut(epoch)
            .map_or(false, |session| session.dedup.forget(signature))
    }

    /// Apply the qualifying transfers of one record.
    ///
    /// A record resets the timer at most once, however many transfers it
    /// carries.
    pub async fn record_transfers(&self, epoch: u64, transfers: &[QualifyingTransfer], now: Instant) -> Applied {
        let mut inner = self.inner.lock().await;
        match inner.session_mut(epoch) {
            Some(session) => {
                let cleared_alert = !transfers.is_empty() && session.state.on_qualifying_transfer(now);
                Applied::Recorded { cleared_alert }
            }
            None => Applied::Stale,
        }
    }

    /// Run one timer check; `None` means the epoch is stale.
    pub async fn tick(
        &self,
        epoch: u64,
        now: Instant,
        pause: Duration,
        realert: Option<Duration>,
    ) -> Option<TickOutcome> {
        let mut inner = self.inner.lock().await;
        inner
            .session_mut(epoch)
            .map(|session| session.state.on_timer_tick(now, pause, realert))
    }

    pub async fn has_seen(&self, signature: &str) -> bool {
        let inner = self.inner.lock().await;
        inner
            .session
            .as_ref()
            .map_or(false, |session| session.dedup.contains(signature))
    }

    pub async fn snapshot(&self, now: Instant) -> Option<WatchSnapshot> {
        let inner = self.inner.lock().await;
        inner.session.as_ref().map(|session| WatchSnapshot {
            epoch: inner.epoch,
            account: session.target.account().to_string(),
            reply_to: session.target.reply_to().to_string(),
            seen_signatures: session.dedup.len(),
            since_last_transfer: now.saturating_duration_since(session.state.last_qualifying()),
            alert_latched: session.state.alert_latched(),
        })
    }
}
