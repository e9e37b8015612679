//! Inactivity watchdog for one Solana account
//!
//! A watch runs three tasks: the inactivity timer, the signature poller and,
//! unless pull-only, the push supervisor. They share one [`SharedState`]
//! guarded by an epoch. Selecting another account (or stopping) bumps the
//! epoch and aborts the tasks, so nothing from the previous watch can leak
//! into the next one.

pub mod classifier;
pub mod dedup;
mod ingest;
mod outbox;
mod poller;
pub mod session;
pub mod state;
mod supervisor;
mod timer;

use std::sync::Arc;

use log::info;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::{PushMode, WatchdogConfig};
use crate::constants::defaults::ANNOUNCE_QUEUE_CAPACITY;
use crate::errors::{WatchdogError, WatchdogResult};
use crate::models::{ReplyTarget, WatchTarget};
use crate::monitor::TransactionSource;
use crate::notify::{messages, Notifier};

use self::outbox::Outbox;

pub use self::classifier::TransferFilter;
pub use self::outbox::Priority;
pub use self::session::{SharedState, WatchSnapshot};
pub use self::state::{Phase, TickOutcome, WatchdogState};
pub use self::supervisor::Backoff;

/// Everything the tasks of a watch need, cheap to clone
#[derive(Clone)]
pub(crate) struct WatchContext {
    shared: Arc<SharedState>,
    source: Arc<dyn TransactionSource>,
    outbox: Outbox,
    config: Arc<WatchdogConfig>,
    filter: TransferFilter,
}

impl WatchContext {
    /// Queue `text` for the background delivery task.
    fn deliver(&self, reply_to: &ReplyTarget, text: String, priority: Priority) {
        self.outbox.send(reply_to, text, priority);
    }

    /// Tell the reply target that `channel` started failing.
    ///
    /// Sent once per outage: `outage` is set here and cleared by the caller
    /// on the channel's next success.
    fn report_outage(&self, watch: &Watch, channel: &str, outage: &mut bool, detail: &str) {
        if *outage {
            return;
        }
        *outage = true;
        self.deliver(
            watch.target.reply_to(),
            messages::channel_error(channel, watch.target.account(), detail),
            Priority::Urgent,
        );
    }
}

/// The target and epoch a task was started for
#[derive(Debug, Clone)]
pub(crate) struct Watch {
    epoch: u64,
    target: WatchTarget,
}

/// Watches at most one account at a time.
pub struct Watchdog {
    ctx: WatchContext,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    delivery: JoinHandle<()>,
}

impl Watchdog {
    /// Create an idle watchdog; fails when `config` does not validate.
    ///
    /// Starts the delivery task, so it must be called inside a Tokio runtime.
    pub fn new(
        config: WatchdogConfig,
        source: Arc<dyn TransactionSource>,
        notifier: Arc<dyn Notifier>,
    ) -> WatchdogResult<Self> {
        config.validate()?;
        let filter = TransferFilter::from_config(&config);
        let (outbox, delivery) = Outbox::spawn(notifier, ANNOUNCE_QUEUE_CAPACITY);

        Ok(Self {
            ctx: WatchContext {
                shared: Arc::new(SharedState::new()),
                source,
                outbox,
                config: Arc::new(config),
                filter,
            },
            tasks: Mutex::new(Vec::new()),
            delivery,
        })
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.ctx.config
    }

    /// Start watching `account`, replacing any current watch.
    ///
    /// The new watch starts with an empty dedup index and a full grace
    /// period. An account that does not parse or is not allowed is rejected
    /// and the current watch keeps running. Returns the epoch of the new
    /// watch.
    pub async fn watch(&self, account: &str, reply_to: impl Into<ReplyTarget>) -> WatchdogResult<u64> {
        let account = account.trim();
        if !self.ctx.config.is_allowed(account) {
            return Err(WatchdogError::InvalidAccount(format!(
                "{} is not in the allowed account list",
                account
            )));
        }
        let target = WatchTarget::new(account, reply_to.into())?;

        let mut tasks = self.tasks.lock().await;
        let (epoch, previous) = self
            .ctx
            .shared
            .begin(target.clone(), self.ctx.config.dedup_capacity, Instant::now())
            .await;
        for task in tasks.drain(..) {
            task.abort();
        }
        if let Some(previous) = previous {
            info!("Replacing watch on {} with {}", previous, target);
        }

        let watch = Watch {
            epoch,
            target: target.clone(),
        };
        tasks.push(tokio::spawn(timer::run_timer(self.ctx.clone(), watch.clone())));
        tasks.push(tokio::spawn(poller::run_poller(self.ctx.clone(), watch.clone())));
        match self.ctx.config.push_mode {
            PushMode::Enabled => {
                tasks.push(tokio::spawn(supervisor::run_push_supervisor(self.ctx.clone(), watch)));
            }
            PushMode::Disabled => info!("Push channel disabled, polling only"),
        }

        info!("🔍 Watching {} (epoch {})", target, epoch);
        let config = &self.ctx.config;
        self.ctx.deliver(
            target.reply_to(),
            messages::watch_started(
                target.account(),
                config.threshold_sol(),
                config.direction,
                config.pause_threshold,
            ),
            Priority::Urgent,
        );

        Ok(epoch)
    }

    /// Stop the current watch, if any, and return its target.
    pub async fn stop(&self) -> Option<WatchTarget> {
        let mut tasks = self.tasks.lock().await;
        let previous = self.ctx.shared.end().await;
        for task in tasks.drain(..) {
            task.abort();
        }

        if let Some(target) = &previous {
            info!("🛑 Stopped watching {}", target);
            self.ctx.deliver(
                target.reply_to(),
                messages::watch_stopped(target.account()),
                Priority::Urgent,
            );
        }
        previous
    }

    pub async fn snapshot(&self) -> Option<WatchSnapshot> {
        self.ctx.shared.snapshot(Instant::now()).await
    }

    /// Whether the current watch has already admitted `signature`.
    pub async fn has_seen(&self, signature: &str) -> bool {
        self.ctx.shared.has_seen(signature).await
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
        self.delivery.abort();
    }
}
