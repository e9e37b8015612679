//! Text of the messages sent to the reply target

use std::time::Duration;

use crate::config::WatchDirection;
use crate::models::QualifyingTransfer;

fn direction_phrase(direction: WatchDirection) -> &'static str {
    match direction {
        WatchDirection::Inbound => "incoming",
        WatchDirection::Outbound => "outgoing",
        WatchDirection::Both => "incoming or outgoing",
    }
}

pub fn watch_started(account: &str, threshold_sol: f64, direction: WatchDirection, pause: Duration) -> String {
    format!(
        "🔍 Monitoring started for {}. Watching for {} transfers ≥{} SOL, alert after {}s of silence.",
        account,
        direction_phrase(direction),
        threshold_sol,
        pause.as_secs()
    )
}

pub fn transfer_found(account: &str, transfer: &QualifyingTransfer) -> String {
    let preposition = match transfer.direction {
        crate::models::Direction::Inbound => "to",
        crate::models::Direction::Outbound => "from",
    };
    format!(
        "✅ Transfer found {} {}: {:.4} SOL ({}). Monitoring continues...",
        preposition,
        account,
        transfer.sol(),
        transfer.signature
    )
}

pub fn inactivity_alert(
    account: &str,
    threshold_sol: f64,
    direction: WatchDirection,
    elapsed: Duration,
    repeat: bool,
) -> String {
    format!(
        "🚨 {}: Wallet {} had no {} transfer ≥{} SOL for {} seconds.",
        if repeat { "STILL SILENT" } else { "ALERT" },
        account,
        direction_phrase(direction),
        threshold_sol,
        elapsed.as_secs()
    )
}

/// A channel started failing; monitoring carries on over whatever still works.
pub fn channel_error(channel: &str, account: &str, detail: &str) -> String {
    format!(
        "⚠️ {} error for {}: {}. Monitoring continues, alerts may be delayed.",
        channel, account, detail
    )
}

pub fn watch_stopped(account: &str) -> String {
    format!("🛑 Monitoring stopped for {}.", account)
}
