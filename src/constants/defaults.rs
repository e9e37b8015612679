//! Default configuration values

pub const RPC_HTTP_URL: &str = "https://api.mainnet-beta.solana.com";
pub const RPC_WS_URL: &str = "wss://api.mainnet-beta.solana.com";

pub const THRESHOLD_SOL: f64 = 0.5;

/// Inactivity window, seconds
pub const PAUSE_THRESHOLD_SECS: u64 = 40;
pub const POLL_INTERVAL_SECS: u64 = 20;
pub const POLL_LIMIT: usize = 100;
/// Largest page `getSignaturesForAddress` accepts
pub const MAX_POLL_LIMIT: usize = 1000;
pub const TICK_INTERVAL_SECS: u64 = 1;
pub const FETCH_TIMEOUT_SECS: u64 = 10;
pub const RECONNECT_DELAY_SECS: u64 = 5;
pub const NOTIFY_MIN_INTERVAL_MS: u64 = 1000;

/// Buffered signatures between the push reader and the record processor
pub const PUSH_CHANNEL_CAPACITY: usize = 1024;

/// Transfer announcements waiting for delivery before new ones are dropped
pub const ANNOUNCE_QUEUE_CAPACITY: usize = 32;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";
