//! Session timing

use std::time::Duration;

use super::error::{SessionError, SessionResult};

/// Timer settings for one session, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How often the payload is regenerated and pushed
    pub push_interval: Duration,
    /// Deadline for a single outbound frame
    pub write_wait: Duration,
    /// Liveness window: maximum silence tolerated from the peer
    pub pong_wait: Duration,
    /// How often a ping probe is sent
    pub ping_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(10), Duration::from_secs(60))
    }
}

impl SessionConfig {
    /// Create a config with the ping period derived from the liveness window
    pub fn new(push_interval: Duration, write_wait: Duration, pong_wait: Duration) -> Self {
        Self {
            push_interval,
            write_wait,
            pong_wait,
            ping_period: Self::ping_period_for(pong_wait),
        }
    }

    /// Ping period for a liveness window (nine tenths of it)
    pub fn ping_period_for(pong_wait: Duration) -> Duration {
        pong_wait * 9 / 10
    }

    /// Override the ping period
    pub fn with_ping_period(mut self, period: Duration) -> Self {
        self.ping_period = period;
        self
    }

    /// Check the timers can keep a healthy peer alive
    pub fn validate(&self) -> SessionResult<()> {
        let named = [
            ("push_interval", self.push_interval),
            ("write_wait", self.write_wait),
            ("pong_wait", self.pong_wait),
            ("ping_period", self.ping_period),
        ];
        if let Some((name, _)) = named.iter().find(|(_, d)| d.is_zero()) {
            return Err(SessionError::InvalidConfig(format!("{} must be non-zero", name)));
        }

        if self.ping_period >= self.pong_wait {
            return Err(SessionError::InvalidConfig(format!(
                "ping_period ({:?}) must be shorter than pong_wait ({:?})",
                self.ping_period, self.pong_wait
            )));
        }

        Ok(())
    }
}
