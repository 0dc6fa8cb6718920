use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration for polling remote state.
///
/// `retries` counts the retries after the first attempt, so a policy runs at
/// most `retries + 1` attempts. The shipped default polls every 10 seconds
/// for 30 retries; `factor` stays at 1, which makes the interval fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub retries: u32,
    pub min_timeout_ms: u64,
    pub max_timeout_ms: Option<u64>,
    pub factor: f64,
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 30,
            min_timeout_ms: 10_000,
            max_timeout_ms: None,
            factor: 1.0,
            jitter: 0.0,
        }
    }
}

impl RetryPolicy {
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_min_timeout(mut self, timeout: Duration) -> Self {
        self.min_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn min_timeout(&self) -> Duration {
        Duration::from_millis(self.min_timeout_ms)
    }

    /// Upper bound on the number of attempts the policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    pub fn backoff(&self) -> BackoffStrategy {
        let mut backoff = BackoffStrategy::new()
            .with_base_delay(self.min_timeout())
            .with_multiplier(self.factor)
            .with_jitter(self.jitter)
            .with_max_attempts(self.retries);
        if let Some(max) = self.max_timeout_ms {
            backoff = backoff.with_max_delay(Duration::from_millis(max));
        }
        backoff
    }
}

#[derive(Debug, Clone)]
pub struct BackoffStrategy {
    base_delay: Duration,
    max_delay: Option<Duration>,
    jitter_factor: f64,
    multiplier: f64,
    attempt: u32,
    max_attempts: Option<u32>,
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(10),
            max_delay: None,
            jitter_factor: 0.0,
            multiplier: 1.0,
            attempt: 0,
            max_attempts: None,
        }
    }
}

impl BackoffStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    /// Delay before the next retry, or `None` once the retries are used up.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        let base_ms = self.base_delay.as_millis() as f64;
        let mut delay_ms = base_ms * self.multiplier.powi(self.attempt as i32);
        if let Some(max) = self.max_delay {
            delay_ms = delay_ms.min(max.as_millis() as f64);
        }

        let jitter_range = delay_ms * self.jitter_factor;
        let jitter = if jitter_range > 0.0 {
            use rand::Rng;
            rand::rng().random_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };
        let final_delay_ms = (delay_ms + jitter).max(0.0) as u64;

        self.attempt += 1;
        Some(Duration::from_millis(final_delay_ms))
    }

    pub fn is_exhausted(&self) -> bool {
        if let Some(max) = self.max_attempts {
            self.attempt >= max
        } else {
            false
        }
    }
}
