//! Retry policies for re-establishing subscriptions.

use std::time::Duration;

/// Default wait between subscription attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Decides how long to wait before the next open attempt.
pub trait RetryPolicy: Send + Sync + 'static {
    /// Delay before retry number `attempt` (1-based count of consecutive failures).
    fn delay(&self, attempt: u32) -> Duration;
}

/// Fixed delay between attempts, regardless of how many have failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantDelay(pub Duration);

impl ConstantDelay {
    /// Constant delay of `secs` seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// Zero delay, for tests that do not care about pacing.
    pub const fn immediate() -> Self {
        Self(Duration::ZERO)
    }
}

impl Default for ConstantDelay {
    fn default() -> Self {
        Self(DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy for ConstantDelay {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

impl<F> RetryPolicy for F
where
    F: Fn(u32) -> Duration + Send + Sync + 'static,
{
    fn delay(&self, attempt: u32) -> Duration {
        self(attempt)
    }
}
