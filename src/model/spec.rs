//! # Trial description, subscription identity and tags.
//!
//! A [`TestSpec`] is created by the scheduling layer for one trial and is
//! read-only while the trial runs. The runner derives a [`SubscriptionId`]
//! from it, and from that the two [`Tag`]s the trial emits and looks for:
//!
//! ```text
//! prefix + test id ──► SubscriptionId ──┬─► "<id> - PRIMER"   (priming handshake)
//!                                       └─► "<id> - TEST"     (measured traffic)
//! ```
//!
//! The suffixes differ, so neither tag is a substring of the other. Tags of
//! concurrent trials are kept apart only by the uniqueness of the
//! subscription identity, which the surrounding scheduler must guarantee.

use std::fmt;
use std::time::Duration;

use memchr::memmem::Finder;
use serde::Deserialize;

use crate::config::ProbeConfig;

/// Immutable description of one trial.
///
/// Durations travel as integer nanoseconds on the wire.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use streamprobe::TestSpec;
///
/// let spec: TestSpec = serde_json::from_str(
///     r#"{"id":"t-1","cycles":5,"delay":10000000,"timeout":5000000000}"#,
/// ).unwrap();
/// assert_eq!(spec.delay, Duration::from_millis(10));
/// assert_eq!(spec.emission_window(), Duration::from_millis(50));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TestSpec {
    /// Trial identity, appended to the subscription prefix.
    pub id: String,
    /// Number of tagged lines emitted, and the number of deliveries expected.
    pub cycles: u64,
    /// Pause after each emitted line.
    #[serde(with = "nanos")]
    pub delay: Duration,
    /// Overall receive deadline, measured from the start of counting.
    #[serde(with = "nanos")]
    pub timeout: Duration,
}

impl TestSpec {
    /// Creates a spec with explicit parameters.
    pub fn new(id: impl Into<String>, cycles: u64, delay: Duration, timeout: Duration) -> Self {
        Self {
            id: id.into(),
            cycles,
            delay,
            timeout,
        }
    }

    /// Creates a spec inheriting cycles, delay and timeout from the config.
    pub fn with_defaults(id: impl Into<String>, cfg: &ProbeConfig) -> Self {
        Self::new(id, cfg.cycles, cfg.delay, cfg.timeout)
    }

    /// Time the emitter needs to write every line (`cycles × delay`).
    pub fn emission_window(&self) -> Duration {
        let cycles = u32::try_from(self.cycles).unwrap_or(u32::MAX);
        self.delay.saturating_mul(cycles)
    }

    /// Returns `true` when the emitter cannot finish before the receive deadline.
    pub fn emission_exceeds_timeout(&self) -> bool {
        self.emission_window() > self.timeout
    }
}

/// Per-trial stream identity: subscription prefix followed by the test id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    /// Builds `prefix + test_id`.
    pub fn new(prefix: &str, test_id: &str) -> Self {
        Self(format!("{prefix}{test_id}"))
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tag used during the priming handshake.
    pub fn primer_tag(&self) -> Tag {
        Tag::new(format!("{} - PRIMER", self.0))
    }

    /// Tag carried by every measured line.
    pub fn test_tag(&self) -> Tag {
        Tag::new(format!("{} - TEST", self.0))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marker string matched by substring containment against log payloads.
#[derive(Clone, Debug)]
pub struct Tag {
    text: String,
    finder: Finder<'static>,
}

impl Tag {
    /// Builds a tag and its searcher.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let finder = Finder::new(text.as_bytes()).into_owned();
        Self { text, finder }
    }

    /// Returns the tag text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns `true` if `payload` contains the tag anywhere.
    #[inline]
    pub fn matches(&self, payload: &[u8]) -> bool {
        self.finder.find(payload).is_some()
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Tag {}

mod nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(d: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(d).map(Duration::from_nanos)
    }
}
