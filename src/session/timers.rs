//! Push and heartbeat timers

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use super::config::SessionConfig;

/// Which timer fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Push,
    Heartbeat,
}

/// The two periodic timers of a session
///
/// Both are dropped, and therefore stopped, with the value.
pub struct SessionTimers {
    push: Interval,
    heartbeat: Interval,
}

impl SessionTimers {
    /// Start both timers; each first fires one period from now
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            push: periodic(config.push_interval),
            heartbeat: periodic(config.ping_period),
        }
    }

    /// Wait for the next tick of either timer
    ///
    /// Cancel safe.
    pub async fn next(&mut self) -> Tick {
        tokio::select! {
            _ = self.push.tick() => Tick::Push,
            _ = self.heartbeat.tick() => Tick::Heartbeat,
        }
    }
}

fn periodic(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}
