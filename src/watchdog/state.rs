//! Inactivity timer and alert latch

use std::time::Duration;

use tokio::time::Instant;

/// Observable phase of a watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Timer running, no alert pending
    Active,
    /// Alert sent, waiting for the next qualifying transfer
    Alerted,
}

/// What a timer tick decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Quiet,
    /// Send an alert; `repeat` is set for re-alerts of an already latched episode
    Alert { elapsed: Duration, repeat: bool },
}

/// Inactivity state of one watch.
///
/// `last_qualifying` only moves forward. The latch is set by the first
/// expired tick of an inactivity episode and cleared by any qualifying
/// transfer.
#[derive(Debug, Clone)]
pub struct WatchdogState {
    last_qualifying: Instant,
    alert_latched: bool,
    last_alert: Option<Instant>,
}

impl WatchdogState {
    /// Fresh state; the timer starts at `now`, which acts as a grace period.
    pub fn new(now: Instant) -> Self {
        Self {
            last_qualifying: now,
            alert_latched: false,
            last_alert: None,
        }
    }

    /// Record a qualifying transfer observed at `now`.
    ///
    /// Returns whether this cleared a latched alert.
    pub fn on_qualifying_transfer(&mut self, now: Instant) -> bool {
        self.last_qualifying = self.last_qualifying.max(now);
        let was_latched = self.alert_latched;
        self.alert_latched = false;
        self.last_alert = None;
        was_latched
    }

    /// Check the timer at `now`.
    ///
    /// Fires once per inactivity episode; with `realert` set, a latched
    /// episode fires again every `realert`.
    pub fn on_timer_tick(&mut self, now: Instant, pause: Duration, realert: Option<Duration>) -> TickOutcome {
        let elapsed = now.saturating_duration_since(self.last_qualifying);

        if self.alert_latched {
            let due = match (realert, self.last_alert) {
                (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
                _ => false,
            };
            if !due {
                return TickOutcome::Quiet;
            }
            self.last_alert = Some(now);
            return TickOutcome::Alert { elapsed, repeat: true };
        }

        if elapsed >= pause {
            self.alert_latched = true;
            self.last_alert = Some(now);
            return TickOutcome::Alert { elapsed, repeat: false };
        }

        TickOutcome::Quiet
    }

    pub fn phase(&self) -> Phase {
        if self.alert_latched {
            Phase::Alerted
        } else {
            Phase::Active
        }
    }

    pub fn last_qualifying(&self) -> Instant {
        self.last_qualifying
    }

    pub fn alert_latched(&self) -> bool {
        self.alert_latched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAUSE: Duration = Duration::from_secs(40);

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_single_alert_per_episode() {
        let t0 = Instant::now();
        let mut state = WatchdogState::new(t0);

        for s in 1..40 {
            assert_eq!(state.on_timer_tick(t0 + secs(s), PAUSE, None), TickOutcome::Quiet);
        }
        assert_eq!(
            state.on_timer_tick(t0 + secs(40), PAUSE, None),
            TickOutcome::Alert { elapsed: secs(40), repeat: false }
        );
        assert_eq!(state.phase(), Phase::Alerted);

        for s in 41..400 {
            assert_eq!(state.on_timer_tick(t0 + secs(s), PAUSE, None), TickOutcome::Quiet);
        }
    }

    #[test]
    fn test_transfer_resets_deadline() {
        let t0 = Instant::now();
        let mut state = WatchdogState::new(t0);

        assert!(!state.on_qualifying_transfer(t0 + secs(10)));
        assert_eq!(state.on_timer_tick(t0 + secs(40), PAUSE, None), TickOutcome::Quiet);
        assert_eq!(state.on_timer_tick(t0 + secs(49), PAUSE, None), TickOutcome::Quiet);
        assert!(matches!(
            state.on_timer_tick(t0 + secs(50), PAUSE, None),
            TickOutcome::Alert { repeat: false, .. }
        ));
    }

    #[test]
    fn test_transfer_clears_latch() {
        let t0 = Instant::now();
        let mut state = WatchdogState::new(t0);
        assert!(matches!(state.on_timer_tick(t0 + secs(45), PAUSE, None), TickOutcome::Alert { .. }));

        assert!(state.on_qualifying_transfer(t0 + secs(46)));
        assert_eq!(state.phase(), Phase::Active);
        assert_eq!(state.on_timer_tick(t0 + secs(85), PAUSE, None), TickOutcome::Quiet);
        assert!(matches!(state.on_timer_tick(t0 + secs(86), PAUSE, None), TickOutcome::Alert { .. }));
    }

    #[test]
    fn test_last_qualifying_never_moves_back() {
        let t0 = Instant::now();
        let mut state = WatchdogState::new(t0);
        state.on_qualifying_transfer(t0 + secs(20));
        state.on_qualifying_transfer(t0 + secs(5));
        assert_eq!(state.last_qualifying(), t0 + secs(20));
    }

    #[test]
    fn test_realert_interval() {
        let t0 = Instant::now();
        let mut state = WatchdogState::new(t0);
        let realert = Some(secs(60));

        assert!(matches!(
            state.on_timer_tick(t0 + secs(40), PAUSE, realert),
            TickOutcome::Alert { repeat: false, .. }
        ));
        assert_eq!(state.on_timer_tick(t0 + secs(99), PAUSE, realert), TickOutcome::Quiet);
        assert_eq!(
            state.on_timer_tick(t0 + secs(100), PAUSE, realert),
            TickOutcome::Alert { elapsed: secs(100), repeat: true }
        );
        assert_eq!(state.on_timer_tick(t0 + secs(101), PAUSE, realert), TickOutcome::Quiet);
        assert!(state.alert_latched());
    }
}
