//! Inactivity timer task

use log::{debug, info, warn};
use tokio::time::{interval, Instant, MissedTickBehavior};

use super::state::TickOutcome;
use super::{Priority, Watch, WatchContext};
use crate::notify::messages;

/// Check the inactivity deadline every tick until the watch goes stale.
pub(super) async fn run_timer(ctx: WatchContext, watch: Watch) {
    let mut ticker = interval(ctx.config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let outcome = ctx
            .shared
            .tick(
                watch.epoch,
                Instant::now(),
                ctx.config.pause_threshold,
                ctx.config.realert_interval,
            )
            .await;

        match outcome {
            None => break,
            Some(TickOutcome::Quiet) => {}
            Some(TickOutcome::Alert { elapsed, repeat }) => {
                if repeat {
                    info!("🔁 {} still silent after {:?}", watch.target, elapsed);
                } else {
                    warn!("🚨 No qualifying transfer on {} for {:?}", watch.target, elapsed);
                }
                let text = messages::inactivity_alert(
                    watch.target.account(),
                    ctx.config.threshold_sol(),
                    ctx.config.direction,
                    elapsed,
                    repeat,
                );
                ctx.deliver(watch.target.reply_to(), text, Priority::Urgent);
            }
        }
    }

    debug!("Timer for {} (epoch {}) stopped", watch.target, watch.epoch);
}
