//! Signature to qualifying transfer, shared by both channels

use std::fmt;

use log::{debug, error, info, warn};
use tokio::time::{timeout, Instant};

use super::session::{Admission, Applied};
use super::{Priority, Watch, WatchContext};
use crate::errors::WatchdogError;
use crate::notify::messages;

/// Which channel announced a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Push,
    Poll,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Push => write!(f, "push"),
            Channel::Poll => write!(f, "poll"),
        }
    }
}

/// What happened to one announced signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Duplicate,
    /// The watch this signature belonged to is gone
    Stale,
    /// Record could not be obtained; the signature was released for retry
    Skipped,
    /// Record can never be used; the signature stays admitted
    Rejected,
    NoTransfer,
    Qualified(usize),
}

/// Admit, resolve, classify and apply one signature.
///
/// The lock is only held for admission and for applying the result; the
/// fetch and the classification run outside it.
pub(super) async fn process_signature(ctx: &WatchContext, watch: &Watch, signature: &str, channel: Channel) -> ProcessOutcome {
    match ctx.shared.admit(watch.epoch, signature).await {
        Admission::Admitted => {}
        Admission::Duplicate => return ProcessOutcome::Duplicate,
        Admission::Stale => return ProcessOutcome::Stale,
    }

    let resolved = match timeout(ctx.config.fetch_timeout, ctx.source.resolve(signature)).await {
        Ok(result) => result,
        Err(_) => Err(WatchdogError::Timeout(format!(
            "getTransaction {} after {:?}",
            signature, ctx.config.fetch_timeout
        ))),
    };

    let record = match resolved {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!("Transaction {} ({}) not available yet", signature, channel);
            ctx.shared.forget(watch.epoch, signature).await;
            return ProcessOutcome::Skipped;
        }
        Err(e) if e.is_transient() => {
            warn!("⚠️ Skipping {} from {} channel, will retry: {}", signature, channel, e);
            ctx.shared.forget(watch.epoch, signature).await;
            return ProcessOutcome::Skipped;
        }
        Err(WatchdogError::MalformedRecord(reason)) => {
            warn!("⚠️ Ignoring malformed record {} from {} channel: {}", signature, channel, reason);
            return ProcessOutcome::Rejected;
        }
        Err(e) => {
            error!("❌ Unexpected error resolving {}: {}", signature, e);
            return ProcessOutcome::Rejected;
        }
    };

    let transfers = ctx.filter.classify(&record, &watch.target);
    if transfers.is_empty() {
        debug!("No qualifying transfer in {} ({})", signature, channel);
        return ProcessOutcome::NoTransfer;
    }

    match ctx.shared.record_transfers(watch.epoch, &transfers, Instant::now()).await {
        Applied::Stale => return ProcessOutcome::Stale,
        Applied::Recorded { cleared_alert } => {
            if cleared_alert {
                info!("🟢 Activity resumed on {}", watch.target);
            }
        }
    }

    for transfer in &transfers {
        info!(
            "💸 {} transfer of {:.4} SOL on {} via {} ({})",
            transfer.direction,
            transfer.sol(),
            watch.target,
            channel,
            transfer.signature
        );
        match serde_json::to_string(transfer) {
            Ok(json) => debug!("Qualifying transfer: {}", json),
            Err(e) => debug!("Could not serialize transfer {}: {}", transfer.signature, e),
        }
        if ctx.config.announce_transfers {
            ctx.deliver(
                watch.target.reply_to(),
                messages::transfer_found(watch.target.account(), transfer),
                Priority::Routine,
            );
        }
    }

    ProcessOutcome::Qualified(transfers.len())
}
