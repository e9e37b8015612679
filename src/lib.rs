//! A watchdog for Solana wallet activity
//!
//! This crate follows one account through a polling channel and a push
//! subscription, detects SOL transfers above a threshold, and raises an alert
//! when no such transfer has been seen for a configured pause.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod watchdog;

pub use config::WatchdogConfig;
pub use errors::{WatchdogError, WatchdogResult};
pub use watchdog::{WatchSnapshot, Watchdog};

/// Version of the wallet watchdog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
