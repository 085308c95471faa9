//! # Retry backoff for eventually-consistent reads.
//!
//! [`RetryBackoff`] decides how long to wait after a failed or empty read and
//! when to give up: a fixed [`RetryBackoff::interval`] between tries and at
//! most [`RetryBackoff::max_retries`] consecutive misses.
//! [`Retries`] tracks the consecutive-miss counter and resets on progress.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use streamprobe::RetryBackoff;
//!
//! let backoff = RetryBackoff::fixed(Duration::from_millis(50), 2);
//! let mut retries = backoff.retries();
//!
//! assert_eq!(retries.on_miss(), Some(Duration::from_millis(50)));
//! assert_eq!(retries.on_miss(), Some(Duration::from_millis(50)));
//! assert_eq!(retries.on_miss(), None); // exhausted
//!
//! retries.reset();
//! assert_eq!(retries.on_miss(), Some(Duration::from_millis(50)));
//! ```

use std::time::Duration;

/// Fixed-interval retry policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryBackoff {
    /// Delay after every miss.
    pub interval: Duration,
    /// Consecutive misses tolerated before giving up.
    pub max_retries: u32,
}

impl RetryBackoff {
    /// Fixed delay, bounded number of consecutive retries.
    pub fn fixed(interval: Duration, max_retries: u32) -> Self {
        Self {
            interval,
            max_retries,
        }
    }

    /// Returns the delay for miss `miss` (0-indexed), or `None` once the retry bound is reached.
    pub fn next(&self, miss: u32) -> Option<Duration> {
        (miss < self.max_retries).then_some(self.interval)
    }

    /// Starts a fresh consecutive-miss counter for this policy.
    pub fn retries(&self) -> Retries {
        Retries {
            policy: *self,
            misses: 0,
        }
    }
}

impl Default for RetryBackoff {
    /// 50ms fixed delay, 100 consecutive retries.
    fn default() -> Self {
        Self::fixed(Duration::from_millis(50), 100)
    }
}

/// Consecutive-miss counter bound to a [`RetryBackoff`].
#[derive(Clone, Debug)]
pub struct Retries {
    policy: RetryBackoff,
    misses: u32,
}

impl Retries {
    /// Records a miss. Returns the delay before the next try, or `None` when exhausted.
    pub fn on_miss(&mut self) -> Option<Duration> {
        let delay = self.policy.next(self.misses)?;
        self.misses = self.misses.saturating_add(1);
        Some(delay)
    }

    /// Records progress; the next miss starts a fresh budget.
    pub fn reset(&mut self) {
        self.misses = 0;
    }

    /// Consecutive misses recorded since the last reset.
    pub fn misses(&self) -> u32 {
        self.misses
    }
}
