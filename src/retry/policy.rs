//! Retry Policy
//!
//! Pure value object deciding whether a failed attempt is retried and how
//! long to wait first. Delays grow as `base_delay * 2^attempt` with no
//! jitter; an optional cap can bound them.

use std::collections::BTreeSet;
use std::time::Duration;

/// Status codes retried by default.
pub const DEFAULT_RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Delay unit; the first retry waits `base_delay * 2`
    pub base_delay: Duration,
    /// Statuses that may be retried
    pub retryable_status: BTreeSet<u16>,
    /// Optional upper bound on a single delay (disabled by default)
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            retryable_status: DEFAULT_RETRYABLE_STATUS.into_iter().collect(),
            max_delay: None,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::default().with_max_retries(0)
    }

    /// Set maximum retries
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set base delay
    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Cap every delay at `delay`
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Replace the retryable status set
    pub fn with_retryable_status(mut self, status: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_status = status.into_iter().collect();
        self
    }

    /// Whether another retry is allowed after `attempts_made` retries.
    pub fn has_attempts_left(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_retries
    }

    /// True iff `status` is retryable and retries remain.
    pub fn is_retryable(&self, status: u16, attempts_made: u32) -> bool {
        self.retryable_status.contains(&status) && self.has_attempts_left(attempts_made)
    }

    /// Delay before retry number `attempt` (1 for the first retry).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let delay = 2u32
            .checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// Retryable statuses as a sorted vector.
    pub fn retryable_status_codes(&self) -> Vec<u16> {
        self.retryable_status.iter().copied().collect()
    }
}
