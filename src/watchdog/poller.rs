//! Periodic pull of recent signatures

use log::{debug, info, warn};
use tokio::time::{interval, timeout, MissedTickBehavior};

use super::ingest::{process_signature, Channel, ProcessOutcome};
use super::{Watch, WatchContext};

/// Poll the target's recent signatures until the watch goes stale.
///
/// Each batch is processed oldest first. A failed poll is retried at the next
/// interval; the first failure after a success is also reported to the reply
/// target.
pub(super) async fn run_poller(ctx: WatchContext, watch: Watch) {
    let mut ticker = interval(ctx.config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut outage = false;

    loop {
        ticker.tick().await;
        if !ctx.shared.is_current(watch.epoch).await {
            break;
        }

        let listed = timeout(
            ctx.config.fetch_timeout,
            ctx.source.list_recent(watch.target.pubkey(), ctx.config.poll_limit),
        )
        .await;
        let signatures = match listed {
            Ok(Ok(signatures)) => signatures,
            Ok(Err(e)) => {
                warn!("⚠️ Polling error for {}: {}", watch.target, e);
                ctx.report_outage(&watch, "Polling", &mut outage, &e.to_string());
                continue;
            }
            Err(_) => {
                warn!("⚠️ Polling {} timed out after {:?}", watch.target, ctx.config.fetch_timeout);
                let detail = format!("timed out after {:?}", ctx.config.fetch_timeout);
                ctx.report_outage(&watch, "Polling", &mut outage, &detail);
                continue;
            }
        };
        if outage {
            info!("🟢 Polling for {} recovered", watch.target);
            outage = false;
        }

        let mut fresh = 0;
        let mut qualified = 0;
        for signature in signatures.iter().rev() {
            match process_signature(&ctx, &watch, signature, Channel::Poll).await {
                ProcessOutcome::Stale => return,
                ProcessOutcome::Duplicate => {}
                ProcessOutcome::Qualified(n) => {
                    fresh += 1;
                    qualified += n;
                }
                ProcessOutcome::Skipped | ProcessOutcome::Rejected | ProcessOutcome::NoTransfer => fresh += 1,
            }
        }
        debug!(
            "Poll of {}: {} listed, {} new, {} qualifying transfers",
            watch.target,
            signatures.len(),
            fresh,
            qualified
        );
    }

    debug!("Poller for {} (epoch {}) stopped", watch.target, watch.epoch);
}
