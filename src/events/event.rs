//! # Runtime events emitted by trials, the source manager and group probes.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Trial events**: one trial's progress through priming, counting and reporting
//! - **Reconciliation events**: source-manager polls and plan handoffs
//! - **Group events**: shard-group membership and read walks
//! - **Subscriber events**: overflow and panics of event subscribers
//!
//! The [`Event`] struct carries additional metadata such as the subject (trial
//! id, group name, subscriber name), counts, outcome and a reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use streamprobe::{Event, EventKind, Outcome};
//!
//! let ev = Event::new(EventKind::TrialFinished)
//!     .with_subject("reliability-42")
//!     .with_counts(5, 3)
//!     .with_outcome(Outcome::TimedOut);
//!
//! assert_eq!(ev.kind, EventKind::TrialFinished);
//! assert_eq!(ev.subject.as_deref(), Some("reliability-42"));
//! assert_eq!(ev.received, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::model::Outcome;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Trial events ===
    /// A trial is starting.
    ///
    /// Sets:
    /// - `subject`: subscription identity
    /// - `expected`: deliveries expected
    TrialStarting,

    /// The primer tag was observed; counting begins.
    ///
    /// Sets:
    /// - `subject`: subscription identity
    PrimeSucceeded,

    /// `cycles × delay` exceeds the receive deadline; the trial can only time out.
    ///
    /// Sets:
    /// - `subject`: subscription identity
    /// - `timeout_ms`: receive deadline
    EmissionWindowExceeded,

    /// An emitter task panicked; the lines it would have written are missing.
    ///
    /// Sets:
    /// - `subject`: subscription identity or group name
    /// - `reason`: panic message
    EmitterFailed,

    /// Counting ended with a result (completed or timed out).
    ///
    /// Sets:
    /// - `subject`: subscription identity or group name
    /// - `expected`, `received`: counts
    /// - `outcome`: how counting ended
    TrialFinished,

    /// The trial ended without a result.
    ///
    /// Sets:
    /// - `subject`: subscription identity or group name
    /// - `label`: stable error label
    /// - `reason`: error message
    /// - `received`: partial count, for faults during counting
    TrialFailed,

    /// The result was handed to the reporter.
    ///
    /// Sets:
    /// - `subject`: subscription identity
    ReportSubmitted,

    /// The reporter rejected the result; the trial is not retried.
    ///
    /// Sets:
    /// - `subject`: subscription identity
    /// - `reason`: reporter error
    ReportFailed,

    // === Reconciliation events ===
    /// A fresh plan was handed to the orchestrator.
    ///
    /// Sets:
    /// - `expected`: number of planned tasks
    PlanPublished,

    /// The source provider failed; the previous plan stays in force.
    ///
    /// Sets:
    /// - `reason`: provider error
    ProviderFailed,

    /// `NextTerm` did not finish within its deadline.
    ///
    /// Sets:
    /// - `timeout_ms`: the term deadline
    TermTimedOut,

    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    // === Group events ===
    /// Fewer source ids were available than the requested group size.
    ///
    /// Sets:
    /// - `subject`: group name
    /// - `expected`: requested size
    /// - `received`: ids found
    SourceIdsShortfall,

    /// One shard-group membership call failed; it is retried on the next tick.
    ///
    /// Sets:
    /// - `subject`: source id
    /// - `reason`: error message
    MembershipFailed,

    /// A group read failed; the walk backs off and retries.
    ///
    /// Sets:
    /// - `subject`: group name
    /// - `reason`: error message
    ReadFailed,

    /// The walk gave up after exhausting its read retries.
    ///
    /// Sets:
    /// - `subject`: group name
    ReadsExhausted,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// What the event is about: subscription identity, group, source or subscriber name.
    pub subject: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Stable error label, when `reason` comes from a typed error.
    pub label: Option<&'static str>,
    /// Expected count (deliveries, tasks, group size).
    pub expected: Option<u64>,
    /// Observed count.
    pub received: Option<u64>,
    /// Trial outcome.
    pub outcome: Option<Outcome>,
    /// Deadline involved, in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            subject: None,
            reason: None,
            label: None,
            expected: None,
            received: None,
            outcome: None,
            timeout_ms: None,
        }
    }

    /// Attaches the subject.
    #[inline]
    pub fn with_subject(mut self, subject: impl Into<Arc<str>>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a stable label.
    #[inline]
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Attaches the expected count only.
    #[inline]
    pub fn with_expected(mut self, expected: u64) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Attaches the observed count only.
    #[inline]
    pub fn with_received(mut self, received: u64) -> Self {
        self.received = Some(received);
        self
    }

    /// Attaches expected and observed counts.
    #[inline]
    pub fn with_counts(self, expected: u64, received: u64) -> Self {
        self.with_expected(expected).with_received(received)
    }

    /// Attaches an outcome.
    #[inline]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Attaches a deadline (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subject(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subject(subscriber)
            .with_reason(info)
    }
}
