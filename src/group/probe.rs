//! # Shard-group reliability probe.
//!
//! Measures delivery through a shard group: a reader-side fan-in of many
//! source ids, the probe's own id among them.
//!
//! ```text
//! source_ids() ─► select (size-1 others + own)
//!    │
//!    ├─► Membership: one refresh loop per id ─────────────┐
//!    ├─► Emitter: warmup, then emit_count numbered lines ─┤ (trial token)
//!    └─► warmup ─► Walk: paged group reads from start     │
//!          counts payloads containing "<start> - "        │
//!          ends at emit_count, on exhaustion or deadline  │
//!                                                         ▼
//!                                   cancel + join everything, return result
//! ```
//!
//! The walk waits out the warm-up like the emitter does, so its read retries
//! and `walk_timeout` only cover the time lines are actually being written.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::clients::{LineSink, ShardGroupClient, StdoutSink};
use crate::config::GroupProbeConfig;
use crate::core::emitter::{self, Emitter, Line};
use crate::error::TrialError;
use crate::events::{Bus, Event, EventKind};
use crate::group::membership::Membership;
use crate::group::walk::Walk;
use crate::model::{Envelope, Outcome, Tag, TrialResult};

/// Picks up to `size - 1` ids other than `own`, in listing order, followed by `own`.
pub fn select_source_ids(ids: &[String], own: &str, size: usize) -> Vec<String> {
    let mut selected: Vec<String> = ids
        .iter()
        .filter(|id| id.as_str() != own)
        .take(size.saturating_sub(1))
        .cloned()
        .collect();
    selected.push(own.to_string());
    selected
}

/// Runs shard-group reliability trials.
#[derive(Clone)]
pub struct GroupReliabilityProbe {
    client: Arc<dyn ShardGroupClient>,
    sink: Arc<dyn LineSink>,
    cfg: GroupProbeConfig,
    bus: Bus,
}

impl GroupReliabilityProbe {
    /// Creates a probe that emits on standard output.
    pub fn new(client: Arc<dyn ShardGroupClient>, cfg: GroupProbeConfig, bus: Bus) -> Self {
        Self {
            client,
            sink: Arc::new(StdoutSink),
            cfg,
            bus,
        }
    }

    /// Creates a probe with its own bus sized by `cfg.bus_capacity`.
    pub fn from_config(client: Arc<dyn ShardGroupClient>, cfg: GroupProbeConfig) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self::new(client, cfg, bus)
    }

    /// Returns a handle to the bus trial events are published on.
    pub fn bus(&self) -> Bus {
        self.bus.clone()
    }

    /// Replaces the line sink.
    pub fn with_sink(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Runs one trial over a group of `size` source ids.
    ///
    /// Only a failure to list source ids is an error; a walk that ends early
    /// yields a `timed-out` result with the partial count. Reading starts
    /// after `warmup`, and `walk_timeout` is measured from there.
    pub async fn run(&self, size: usize) -> Result<TrialResult, TrialError> {
        let start_ns = unix_nanos();
        let group: Arc<str> = Arc::from(Uuid::new_v4().to_string());

        let ids = match self.client.source_ids().await {
            Ok(ids) => ids,
            Err(source) => {
                let err = TrialError::SourceIds { source };
                self.bus.publish(
                    Event::new(EventKind::TrialFailed)
                        .with_subject(group)
                        .with_label(err.as_label())
                        .with_reason(err.to_string()),
                );
                return Err(err);
            }
        };
        let selected = select_source_ids(&ids, &self.cfg.own_source_id, size);

        let requester_id: u64 = rand::random();
        let expected = self.cfg.emit_count;

        if selected.len() < size {
            self.bus.publish(
                Event::new(EventKind::SourceIdsShortfall)
                    .with_subject(group.clone())
                    .with_counts(size as u64, selected.len() as u64),
            );
        }
        self.bus.publish(
            Event::new(EventKind::TrialStarting)
                .with_subject(group.clone())
                .with_expected(expected),
        );

        let token = CancellationToken::new();
        let _guard = token.clone().drop_guard();

        let mut members = Membership {
            client: self.client.clone(),
            group: group.clone(),
            interval: self.cfg.membership_interval,
            call_timeout: self.cfg.membership_call_timeout,
            bus: self.bus.clone(),
        }
        .spawn(&selected, &token);

        let prefix = format!("{start_ns} - ");
        let tag = Tag::new(prefix.clone());
        let emitter = Emitter::bounded(
            self.sink.clone(),
            Line::Numbered(prefix),
            expected,
            self.cfg.emit_delay,
        )
        .with_warmup(self.cfg.warmup)
        .spawn(token.child_token());

        let mut received: u64 = 0;
        if expected > 0 {
            time::sleep(self.cfg.warmup).await;
            let walk = Walk {
                client: self.client.as_ref(),
                group: &group,
                requester_id,
                backoff: self.cfg.read_backoff,
                bus: &self.bus,
            };
            let visit = |batch: &[Envelope]| {
                received += batch
                    .iter()
                    .filter(|e| e.log_payload().is_some_and(|p| tag.matches(p)))
                    .count() as u64;
                received < expected
            };
            let _ = time::timeout(self.cfg.walk_timeout, walk.run(start_ns, visit)).await;
        }

        token.cancel();
        emitter::join(emitter, &self.bus, &group).await;
        while members.join_next().await.is_some() {}

        let received = received.min(expected);
        let outcome = if received == expected {
            Outcome::Completed
        } else {
            Outcome::TimedOut
        };
        let result = TrialResult::new(expected, received, outcome);

        self.bus.publish(
            Event::new(EventKind::TrialFinished)
                .with_subject(group)
                .with_counts(result.expected_count, result.received_count)
                .with_outcome(result.outcome),
        );
        Ok(result)
    }
}

fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
