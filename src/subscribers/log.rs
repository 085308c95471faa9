//! # LogWriter: renders events through `tracing`.
//!
//! A subscriber that turns every [`Event`] into one structured `tracing`
//! record. Install any `tracing` subscriber in the embedding binary to
//! choose the output format.
//!
//! ## Levels
//! - `info`: trial progress, completed trials, plan handoffs
//! - `warn`: timed-out trials, recoverable collaborator failures, subscriber overflow
//! - `error`: trials that ended without a result, subscriber panics

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::model::Outcome;
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let subject = e.subject.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::TrialStarting => {
                info!(seq = e.seq, subject, expected = ?e.expected, "trial starting");
            }
            EventKind::PrimeSucceeded => {
                info!(seq = e.seq, subject, "subscription primed");
            }
            EventKind::EmissionWindowExceeded => {
                warn!(seq = e.seq, subject, timeout_ms = ?e.timeout_ms, "emission outlasts receive timeout");
            }
            EventKind::EmitterFailed => {
                error!(seq = e.seq, subject, reason, "emitter failed");
            }
            EventKind::TrialFinished => match e.outcome {
                Some(Outcome::Completed) => info!(
                    seq = e.seq, subject, expected = ?e.expected, received = ?e.received,
                    "trial completed"
                ),
                _ => warn!(
                    seq = e.seq, subject, expected = ?e.expected, received = ?e.received,
                    "trial timed out"
                ),
            },
            EventKind::TrialFailed => {
                error!(seq = e.seq, subject, label = ?e.label, received = ?e.received, reason, "trial failed");
            }
            EventKind::ReportSubmitted => {
                info!(seq = e.seq, subject, "result reported");
            }
            EventKind::ReportFailed => {
                warn!(seq = e.seq, subject, reason, "error reporting");
            }
            EventKind::PlanPublished => {
                info!(seq = e.seq, tasks = ?e.expected, "plan published");
            }
            EventKind::ProviderFailed => {
                warn!(seq = e.seq, reason, "source provider failed; keeping previous plan");
            }
            EventKind::TermTimedOut => {
                warn!(seq = e.seq, timeout_ms = ?e.timeout_ms, "next term timed out");
            }
            EventKind::ShutdownRequested => {
                info!(seq = e.seq, "shutdown requested");
            }
            EventKind::SourceIdsShortfall => {
                warn!(
                    seq = e.seq, subject, requested = ?e.expected, found = ?e.received,
                    "fewer source ids than requested"
                );
            }
            EventKind::MembershipFailed => {
                warn!(seq = e.seq, subject, reason, "unable to set shard group");
            }
            EventKind::ReadFailed => {
                warn!(seq = e.seq, subject, reason, "group read failed");
            }
            EventKind::ReadsExhausted => {
                warn!(seq = e.seq, subject, "group read retries exhausted");
            }
            EventKind::SubscriberOverflow => {
                warn!(seq = e.seq, subscriber = subject, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(seq = e.seq, subscriber = subject, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
