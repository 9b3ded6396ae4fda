//! Retry policy and HTTP status classification.

use envlift_core::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use std::time::Duration;

/// How a single response status should steer the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx: stop and report success
    Success,
    /// Transient failure: try again after the delay
    Retryable,
    /// Failure that another attempt will not fix
    Terminal,
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: usize,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Override the inter-attempt delay
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Classify a response status for the retry loop
    pub fn classify(&self, status: u16) -> StatusClass {
        if is_success_status(status) {
            StatusClass::Success
        } else if is_transient_status(status) {
            StatusClass::Retryable
        } else {
            StatusClass::Terminal
        }
    }
}

/// 200 through 299
pub fn is_success_status(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// 429, informational 1xx, and server-side 5xx
pub fn is_transient_status(status: u16) -> bool {
    status == 429 || (100..=199).contains(&status) || (500..=599).contains(&status)
}
