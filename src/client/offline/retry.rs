//! # Retry Backoff
//!
//! Spacing between periodic drain attempts after failing cycles, so a flaky
//! connection does not hammer the API. Reconnect and manual triggers ignore
//! the backoff; only the periodic timer waits.

use std::time::Duration;

use rand::Rng;

use crate::shared::AppConfig;

/// Backoff strategy configuration
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed interval between retries
    Fixed {
        /// Interval between retries
        interval: Duration,
    },
    /// Exponential backoff with jitter
    Exponential {
        /// First delay
        base: Duration,
        /// Ceiling
        max: Duration,
        /// Jitter factor (0.0 to 1.0) added on top of the delay
        jitter: f64,
    },
}

impl BackoffStrategy {
    /// Exponential backoff from configuration, with 10% jitter
    pub fn from_config(config: &AppConfig) -> Self {
        BackoffStrategy::Exponential {
            base: Duration::from_secs(config.backoff_base_secs),
            max: Duration::from_secs(config.backoff_max_secs),
            jitter: 0.1,
        }
    }

    /// Delay before the next attempt after `failures` consecutive failed cycles
    ///
    /// Zero failures means no delay.
    pub fn delay(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        match self {
            BackoffStrategy::Fixed { interval } => *interval,
            BackoffStrategy::Exponential { base, max, jitter } => {
                let factor = 2u32.saturating_pow(failures - 1);
                let delay = base.saturating_mul(factor).min(*max);

                let jitter = jitter.clamp(0.0, 1.0);
                if jitter == 0.0 || delay.is_zero() {
                    return delay;
                }
                let extra = delay.mul_f64(jitter * rand::thread_rng().gen::<f64>());
                delay + extra
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        BackoffStrategy::Exponential {
            base: Duration::from_secs(2),
            max: Duration::from_secs(300),
            jitter: 0.1,
        }
    }
}
