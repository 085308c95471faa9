//! # Probe configuration.
//!
//! Centralized settings for the three probe loops:
//! - [`ProbeConfig`] single-source reliability trials ([`ReliabilityTestRunner`](crate::ReliabilityTestRunner));
//! - [`SourceManagerConfig`] plan reconciliation ([`SourceManager`](crate::SourceManager));
//! - [`GroupProbeConfig`] shard-group reliability probe ([`GroupReliabilityProbe`](crate::GroupReliabilityProbe)).
//!
//! Loading these values (environment, files) is the embedding binary's job.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `SourceManagerConfig::term_timeout = 0s` → no deadline on `NextTerm`

use std::time::Duration;

use crate::policies::RetryBackoff;

/// Settings for single-source reliability trials.
///
/// ## Field semantics
/// - `subscription_prefix`: prepended to each test id to build the subscription identity
/// - `primer_interval`: cadence of primer lines during the handshake
/// - `primer_timeout`: how long the handshake may take before the trial is abandoned
/// - `cycles`/`delay`/`timeout`: defaults for [`TestSpec::with_defaults`](crate::TestSpec::with_defaults)
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct ProbeConfig {
    /// Prefix of every subscription identity created by this runner.
    pub subscription_prefix: String,

    /// Pause between primer lines.
    pub primer_interval: Duration,

    /// Priming deadline.
    ///
    /// A trial whose primer tag is not observed within this window ends
    /// without a result; it is not counted as a delivery failure.
    pub primer_timeout: Duration,

    /// Default number of measured lines.
    pub cycles: u64,

    /// Default pause after each measured line.
    pub delay: Duration,

    /// Default receive deadline.
    pub timeout: Duration,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,
}

impl ProbeConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ProbeConfig {
    /// Default configuration:
    ///
    /// - `subscription_prefix = "reliability-"`
    /// - `primer_interval = 1s`, `primer_timeout = 60s`
    /// - `cycles = 1000`, `delay = 10ms`, `timeout = 60s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            subscription_prefix: "reliability-".to_string(),
            primer_interval: Duration::from_secs(1),
            primer_timeout: Duration::from_secs(60),
            cycles: 1000,
            delay: Duration::from_millis(10),
            timeout: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}

/// Settings for the source manager's reconciliation loop.
#[derive(Clone, Debug)]
pub struct SourceManagerConfig {
    /// Poll interval. The first poll happens immediately.
    pub interval: Duration,

    /// Deadline for one `NextTerm` call (`0s` = none).
    pub term_timeout: Duration,
}

impl SourceManagerConfig {
    /// Creates a config polling every `interval`, with the default term deadline.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Returns the term deadline as an `Option`.
    #[inline]
    pub fn term_deadline(&self) -> Option<Duration> {
        if self.term_timeout == Duration::ZERO {
            None
        } else {
            Some(self.term_timeout)
        }
    }
}

impl Default for SourceManagerConfig {
    /// Polls every 30s; each term may take up to 10s.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            term_timeout: Duration::from_secs(10),
        }
    }
}

/// Settings for the shard-group reliability probe.
#[derive(Clone, Debug)]
pub struct GroupProbeConfig {
    /// The probe's own source id; always part of the group.
    pub own_source_id: String,

    /// Lines emitted per probe.
    pub emit_count: u64,

    /// Pause after each emitted line.
    pub emit_delay: Duration,

    /// Delay before emission starts, giving group membership time to propagate.
    pub warmup: Duration,

    /// Deadline for the whole read walk.
    pub walk_timeout: Duration,

    /// Cadence of shard-group membership refreshes.
    pub membership_interval: Duration,

    /// Deadline of one membership call; failed calls are retried on the next tick.
    pub membership_call_timeout: Duration,

    /// Retry policy for failed or empty reads.
    pub read_backoff: RetryBackoff,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,
}

impl GroupProbeConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for GroupProbeConfig {
    /// Default configuration:
    ///
    /// - `emit_count = 10000`, `emit_delay = 1ms`, `warmup = 20s`
    /// - `walk_timeout = 40s`
    /// - `membership_interval = 1s`, `membership_call_timeout = 10s`
    /// - `read_backoff = 50ms` fixed, 100 consecutive retries
    fn default() -> Self {
        Self {
            own_source_id: String::new(),
            emit_count: 10_000,
            emit_delay: Duration::from_millis(1),
            warmup: Duration::from_secs(20),
            walk_timeout: Duration::from_secs(40),
            membership_interval: Duration::from_secs(1),
            membership_call_timeout: Duration::from_secs(10),
            read_backoff: RetryBackoff::fixed(Duration::from_millis(50), 100),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bus_capacity_is_clamped() {
        let probe = ProbeConfig { bus_capacity: 0, ..ProbeConfig::default() };
        let group = GroupProbeConfig { bus_capacity: 0, ..GroupProbeConfig::default() };

        assert_eq!(probe.bus_capacity_clamped(), 1);
        assert_eq!(group.bus_capacity_clamped(), 1);
        assert_eq!(ProbeConfig::default().bus_capacity_clamped(), 1024);
    }

    #[test]
    fn zero_term_timeout_means_no_deadline() {
        let cfg = SourceManagerConfig { term_timeout: Duration::ZERO, ..SourceManagerConfig::default() };

        assert_eq!(cfg.term_deadline(), None);
        assert_eq!(SourceManagerConfig::default().term_deadline(), Some(Duration::from_secs(10)));
    }
}
