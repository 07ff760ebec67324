//! Delay policies between job progress polls.

use std::time::Duration;

use crate::config::{PollStrategy, PollingConfig};

/// Decides how long to wait before the next poll.
///
/// `consecutive_failures` is zero after a successful poll.
pub trait PollSchedule: Send + Sync {
    fn next_delay(&self, consecutive_failures: u32) -> Duration;
}

/// Re-polls as soon as the previous response arrives.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl PollSchedule for Immediate {
    fn next_delay(&self, _consecutive_failures: u32) -> Duration {
        Duration::ZERO
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Fixed {
    pub interval: Duration,
}

impl PollSchedule for Fixed {
    fn next_delay(&self, _consecutive_failures: u32) -> Duration {
        self.interval
    }
}

/// Fixed interval while healthy, doubling per consecutive failure up to
/// `max`.
#[derive(Debug, Clone, Copy)]
pub struct Exponential {
    pub base: Duration,
    pub max: Duration,
}

impl PollSchedule for Exponential {
    fn next_delay(&self, consecutive_failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(consecutive_failures.min(16));
        self.base.saturating_mul(factor).min(self.max)
    }
}

pub fn from_config(config: &PollingConfig) -> Box<dyn PollSchedule> {
    match config.strategy {
        PollStrategy::Immediate => Box::new(Immediate),
        PollStrategy::Fixed => Box::new(Fixed {
            interval: Duration::from_millis(config.interval_ms),
        }),
        PollStrategy::Exponential => Box::new(Exponential {
            base: Duration::from_millis(config.interval_ms),
            max: Duration::from_millis(config.max_interval_ms),
        }),
    }
}
