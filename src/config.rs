//! Runtime configuration loaded from the environment

use std::env;
use std::time::Duration;

use crate::constants::{defaults, LAMPORTS_PER_SOL};
use crate::errors::{WatchdogError, WatchdogResult};
use crate::models::Direction;

/// Whether the push (PubSub) channel runs next to the poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    Enabled,
    /// Pull-only: latency is bounded by the poll interval
    Disabled,
}

/// Which transfer directions count as activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchDirection {
    Inbound,
    Outbound,
    Both,
}

impl WatchDirection {
    pub fn includes(self, direction: Direction) -> bool {
        match self {
            WatchDirection::Both => true,
            WatchDirection::Inbound => direction == Direction::Inbound,
            WatchDirection::Outbound => direction == Direction::Outbound,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    pub rpc_http_url: String,
    pub rpc_ws_url: String,
    pub push_mode: PushMode,
    /// Smallest qualifying transfer, in lamports
    pub threshold_lamports: u64,
    pub direction: WatchDirection,
    /// Inactivity window before the alert fires
    pub pause_threshold: Duration,
    pub poll_interval: Duration,
    pub poll_limit: usize,
    pub tick_interval: Duration,
    pub fetch_timeout: Duration,
    pub reconnect_delay: Duration,
    pub reconnect_max_delay: Duration,
    /// Re-send the alert this often while it stays latched
    pub realert_interval: Option<Duration>,
    /// Bound on remembered signatures; `None` keeps every signature
    pub dedup_capacity: Option<usize>,
    pub announce_transfers: bool,
    /// Accounts that may be watched; empty allows any account
    pub allowed_accounts: Vec<String>,
    pub telegram_bot_token: Option<String>,
    pub alert_chat_id: Option<String>,
    pub notify_min_interval: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            rpc_http_url: defaults::RPC_HTTP_URL.to_string(),
            rpc_ws_url: defaults::RPC_WS_URL.to_string(),
            push_mode: PushMode::Enabled,
            threshold_lamports: (defaults::THRESHOLD_SOL * LAMPORTS_PER_SOL as f64).round() as u64,
            direction: WatchDirection::Both,
            pause_threshold: Duration::from_secs(defaults::PAUSE_THRESHOLD_SECS),
            poll_interval: Duration::from_secs(defaults::POLL_INTERVAL_SECS),
            poll_limit: defaults::POLL_LIMIT,
            tick_interval: Duration::from_secs(defaults::TICK_INTERVAL_SECS),
            fetch_timeout: Duration::from_secs(defaults::FETCH_TIMEOUT_SECS),
            reconnect_delay: Duration::from_secs(defaults::RECONNECT_DELAY_SECS),
            reconnect_max_delay: Duration::from_secs(defaults::RECONNECT_DELAY_SECS),
            realert_interval: None,
            dedup_capacity: None,
            announce_transfers: true,
            allowed_accounts: Vec::new(),
            telegram_bot_token: None,
            alert_chat_id: None,
            notify_min_interval: Duration::from_millis(defaults::NOTIFY_MIN_INTERVAL_MS),
        }
    }
}

impl WatchdogConfig {
    /// Load the configuration from process environment variables.
    pub fn from_env() -> WatchdogResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load the configuration through `lookup`, falling back to defaults for
    /// unset or empty variables. Present but unparseable values are errors.
    pub fn from_lookup<F>(lookup: F) -> WatchdogResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get("RPC_HTTP_URL") {
            config.rpc_http_url = url;
        }
        if let Some(url) = get("RPC_WS_URL") {
            config.rpc_ws_url = url;
        }
        if let Some(raw) = get("STREAMING") {
            config.push_mode = if parse_bool("STREAMING", &raw)? {
                PushMode::Enabled
            } else {
                PushMode::Disabled
            };
        }
        if let Some(raw) = get("THRESHOLD_SOL") {
            let sol = raw
                .parse::<f64>()
                .map_err(|_| invalid("THRESHOLD_SOL", &raw))?;
            config.threshold_lamports = sol_to_lamports(sol)?;
        }
        if let Some(raw) = get("WATCH_DIRECTION") {
            config.direction = match raw.to_lowercase().as_str() {
                "inbound" | "in" => WatchDirection::Inbound,
                "outbound" | "out" => WatchDirection::Outbound,
                "both" | "any" => WatchDirection::Both,
                _ => return Err(invalid("WATCH_DIRECTION", &raw)),
            };
        }
        if let Some(raw) = get("PAUSE_THRESHOLD") {
            config.pause_threshold = parse_secs("PAUSE_THRESHOLD", &raw)?;
        }
        if let Some(raw) = get("POLL_SIGNATURES_INTERVAL") {
            config.poll_interval = parse_secs("POLL_SIGNATURES_INTERVAL", &raw)?;
        }
        if let Some(raw) = get("POLL_LIMIT") {
            config.poll_limit = raw.parse().map_err(|_| invalid("POLL_LIMIT", &raw))?;
        }
        if let Some(raw) = get("TICK_INTERVAL") {
            config.tick_interval = parse_secs("TICK_INTERVAL", &raw)?;
        }
        if let Some(raw) = get("FETCH_TIMEOUT") {
            config.fetch_timeout = parse_secs("FETCH_TIMEOUT", &raw)?;
        }
        if let Some(raw) = get("RECONNECT_DELAY") {
            config.reconnect_delay = parse_secs("RECONNECT_DELAY", &raw)?;
        }
        config.reconnect_max_delay = match get("RECONNECT_MAX_DELAY") {
            Some(raw) => parse_secs("RECONNECT_MAX_DELAY", &raw)?,
            None => config.reconnect_delay,
        };
        if let Some(raw) = get("REALERT_INTERVAL") {
            config.realert_interval = Some(parse_secs("REALERT_INTERVAL", &raw)?);
        }
        if let Some(raw) = get("DEDUP_CAPACITY") {
            let capacity = raw.parse().map_err(|_| invalid("DEDUP_CAPACITY", &raw))?;
            config.dedup_capacity = Some(capacity);
        }
        if let Some(raw) = get("ANNOUNCE_TRANSFERS") {
            config.announce_transfers = parse_bool("ANNOUNCE_TRANSFERS", &raw)?;
        }
        if let Some(raw) = get("POSSIBLE_WALLETS") {
            config.allowed_accounts = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        config.telegram_bot_token = get("TELEGRAM_BOT_TOKEN");
        config.alert_chat_id = get("ALERT_CHAT_ID");
        if let Some(raw) = get("NOTIFY_MIN_INTERVAL_MS") {
            let millis = raw
                .parse::<u64>()
                .map_err(|_| invalid("NOTIFY_MIN_INTERVAL_MS", &raw))?;
            config.notify_min_interval = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the relations between values that single-field parsing cannot.
    pub fn validate(&self) -> WatchdogResult<()> {
        if !self.rpc_http_url.starts_with("http://") && !self.rpc_http_url.starts_with("https://") {
            return Err(WatchdogError::Config(
                "RPC_HTTP_URL must start with http:// or https://".to_string(),
            ));
        }
        if self.push_mode == PushMode::Enabled
            && !self.rpc_ws_url.starts_with("ws://")
            && !self.rpc_ws_url.starts_with("wss://")
        {
            return Err(WatchdogError::Config(
                "RPC_WS_URL must start with ws:// or wss://".to_string(),
            ));
        }

        let durations = [
            ("PAUSE_THRESHOLD", self.pause_threshold),
            ("POLL_SIGNATURES_INTERVAL", self.poll_interval),
            ("TICK_INTERVAL", self.tick_interval),
            ("FETCH_TIMEOUT", self.fetch_timeout),
            ("RECONNECT_DELAY", self.reconnect_delay),
        ];
        for (name, value) in durations {
            if value.is_zero() {
                return Err(WatchdogError::Config(format!("{} must be greater than zero", name)));
            }
        }
        if let Some(interval) = self.realert_interval {
            if interval.is_zero() {
                return Err(WatchdogError::Config(
                    "REALERT_INTERVAL must be greater than zero".to_string(),
                ));
            }
        }

        // Alert latency is bounded by the tick period
        if self.tick_interval > self.pause_threshold {
            return Err(WatchdogError::Config(format!(
                "TICK_INTERVAL ({:?}) must not exceed PAUSE_THRESHOLD ({:?})",
                self.tick_interval, self.pause_threshold
            )));
        }
        if self.reconnect_max_delay < self.reconnect_delay {
            return Err(WatchdogError::Config(
                "RECONNECT_MAX_DELAY must not be smaller than RECONNECT_DELAY".to_string(),
            ));
        }
        if self.poll_limit == 0 || self.poll_limit > defaults::MAX_POLL_LIMIT {
            return Err(WatchdogError::Config(format!(
                "POLL_LIMIT must be between 1 and {}, got {}",
                defaults::MAX_POLL_LIMIT,
                self.poll_limit
            )));
        }
        // Anything a single poll can list again must still be remembered,
        // plus room for signatures the push channel delivers in between
        if let Some(capacity) = self.dedup_capacity {
            let minimum = self.poll_limit * 2;
            if capacity < minimum {
                return Err(WatchdogError::Config(format!(
                    "DEDUP_CAPACITY must be at least twice POLL_LIMIT ({}), got {}",
                    minimum, capacity
                )));
            }
        }

        Ok(())
    }

    /// Threshold in SOL, for messages
    pub fn threshold_sol(&self) -> f64 {
        self.threshold_lamports as f64 / LAMPORTS_PER_SOL as f64
    }

    /// Whether `account` may be selected for watching
    pub fn is_allowed(&self, account: &str) -> bool {
        self.allowed_accounts.is_empty() || self.allowed_accounts.iter().any(|a| a == account)
    }
}

/// Convert a SOL amount into lamports, rounding to the nearest lamport.
pub fn sol_to_lamports(sol: f64) -> WatchdogResult<u64> {
    if !sol.is_finite() || sol < 0.0 {
        return Err(WatchdogError::Config(format!(
            "THRESHOLD_SOL must be a non-negative number, got {}",
            sol
        )));
    }
    let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
    if lamports > u64::MAX as f64 {
        return Err(WatchdogError::Config(format!("THRESHOLD_SOL is too large: {}", sol)));
    }
    Ok(lamports as u64)
}

fn parse_secs(name: &str, raw: &str) -> WatchdogResult<Duration> {
    let secs = raw.parse::<f64>().map_err(|_| invalid(name, raw))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(invalid(name, raw));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| invalid(name, raw))
}

fn parse_bool(name: &str, raw: &str) -> WatchdogResult<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(invalid(name, raw)),
    }
}

fn invalid(name: &str, raw: &str) -> WatchdogError {
    WatchdogError::Config(format!("Invalid value for {}: '{}'", name, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> WatchdogResult<WatchdogConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WatchdogConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.threshold_lamports, 500_000_000);
        assert_eq!(config.pause_threshold, Duration::from_secs(40));
        assert_eq!(config.poll_interval, Duration::from_secs(20));
        assert_eq!(config.push_mode, PushMode::Enabled);
        assert_eq!(config.direction, WatchDirection::Both);
        assert_eq!(config.reconnect_max_delay, config.reconnect_delay);
        assert!(config.realert_interval.is_none());
        assert!(config.telegram_bot_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("THRESHOLD_SOL", "1.25"),
            ("PAUSE_THRESHOLD", "90"),
            ("TICK_INTERVAL", "0.5"),
            ("STREAMING", "off"),
            ("WATCH_DIRECTION", "outbound"),
            ("RECONNECT_DELAY", "2"),
            ("POSSIBLE_WALLETS", " a , b,,"),
            ("TELEGRAM_BOT_TOKEN", "token"),
            ("RPC_WS_URL", "not-used-when-pull-only"),
        ])
        .unwrap();
        assert_eq!(config.threshold_lamports, 1_250_000_000);
        assert_eq!(config.pause_threshold, Duration::from_secs(90));
        assert_eq!(config.tick_interval, Duration::from_millis(500));
        assert_eq!(config.push_mode, PushMode::Disabled);
        assert_eq!(config.direction, WatchDirection::Outbound);
        assert_eq!(config.reconnect_max_delay, Duration::from_secs(2));
        assert_eq!(config.allowed_accounts, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(config.telegram_bot_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(matches!(load(&[("PAUSE_THRESHOLD", "soon")]), Err(WatchdogError::Config(_))));
        assert!(matches!(load(&[("THRESHOLD_SOL", "-1")]), Err(WatchdogError::Config(_))));
        assert!(matches!(load(&[("STREAMING", "maybe")]), Err(WatchdogError::Config(_))));
        assert!(matches!(load(&[("POLL_LIMIT", "5000")]), Err(WatchdogError::Config(_))));
        assert!(matches!(load(&[("RPC_HTTP_URL", "ftp://x")]), Err(WatchdogError::Config(_))));
    }

    #[test]
    fn test_overflowing_duration_is_an_error() {
        assert!(matches!(load(&[("PAUSE_THRESHOLD", "1e30")]), Err(WatchdogError::Config(_))));
        assert!(matches!(load(&[("REALERT_INTERVAL", "1e300")]), Err(WatchdogError::Config(_))));
    }

    #[test]
    fn test_dedup_capacity_must_cover_poll_window() {
        assert!(matches!(load(&[("DEDUP_CAPACITY", "0")]), Err(WatchdogError::Config(_))));
        assert!(matches!(
            load(&[("POLL_LIMIT", "100"), ("DEDUP_CAPACITY", "150")]),
            Err(WatchdogError::Config(_))
        ));
        let config = load(&[("POLL_LIMIT", "100"), ("DEDUP_CAPACITY", "200")]).unwrap();
        assert_eq!(config.dedup_capacity, Some(200));
    }

    #[test]
    fn test_tick_must_not_exceed_pause() {
        let result = load(&[("PAUSE_THRESHOLD", "5"), ("TICK_INTERVAL", "10")]);
        assert!(matches!(result, Err(WatchdogError::Config(_))));
    }

    #[test]
    fn test_sol_to_lamports_rounds() {
        assert_eq!(sol_to_lamports(0.1).unwrap(), 100_000_000);
        assert_eq!(sol_to_lamports(0.000000001).unwrap(), 1);
        assert!(sol_to_lamports(f64::NAN).is_err());
    }

    #[test]
    fn test_allowlist() {
        let mut config = WatchdogConfig::default();
        assert!(config.is_allowed("anything"));
        config.allowed_accounts = vec!["a".to_string()];
        assert!(config.is_allowed("a"));
        assert!(!config.is_allowed("b"));
    }

    #[test]
    fn test_watch_direction_includes() {
        assert!(WatchDirection::Both.includes(Direction::Inbound));
        assert!(WatchDirection::Outbound.includes(Direction::Outbound));
        assert!(!WatchDirection::Outbound.includes(Direction::Inbound));
        assert!(!WatchDirection::Inbound.includes(Direction::Outbound));
    }
}
