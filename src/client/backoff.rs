//! Reconnect backoff policy and schedule

use std::time::Duration;

/// Exponential backoff policy for reconnect attempts
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Delay before the first reconnect attempt
    pub initial_delay: Duration,
    /// Growth factor applied after each attempt
    pub multiplier: f64,
    /// Ceiling for the delay between attempts
    pub max_delay: Duration,
    /// Attempts before giving up (0 = retry forever)
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

impl BackoffPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay before the first reconnect attempt
    pub fn initial_delay(mut self, d: Duration) -> Self {
        self.initial_delay = d;
        self
    }

    /// Set the growth factor (values below 1.0 are clamped to 1.0)
    pub fn multiplier(mut self, m: f64) -> Self {
        self.multiplier = m.max(1.0);
        self
    }

    /// Set the delay ceiling
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    /// Set the attempt budget (0 = retry forever)
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }
}

/// Tracks reconnect attempts and the growing delay between them.
///
/// Attempts count up from the last successful connection; a fresh
/// connection resets both the counter and the delay.
#[derive(Debug)]
pub struct ReconnectSchedule {
    policy: BackoffPolicy,
    attempts: u32,
    current_delay: Duration,
}

impl ReconnectSchedule {
    pub fn new(policy: BackoffPolicy) -> Self {
        let current_delay = policy.initial_delay.min(policy.max_delay);
        Self {
            policy,
            attempts: 0,
            current_delay,
        }
    }

    /// Claim the next attempt. Returns the delay to wait before dialing,
    /// or `None` once the attempt budget is spent.
    pub fn next_attempt(&mut self) -> Option<Duration> {
        if self.policy.max_attempts > 0 && self.attempts >= self.policy.max_attempts {
            return None;
        }
        self.attempts += 1;
        let delay = self.current_delay;
        self.current_delay = self.grow(delay);
        Some(delay)
    }

    /// Attempts claimed since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Start a fresh cycle, as after a successful connection
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.current_delay = self.policy.initial_delay.min(self.policy.max_delay);
    }

    fn grow(&self, delay: Duration) -> Duration {
        // A factor below 1.0 would shrink the delay instead of growing it
        let factor = self.policy.multiplier.max(1.0);
        let next = delay.as_secs_f64() * factor;
        Duration::from_secs_f64(next.min(self.policy.max_delay.as_secs_f64()))
    }
}
