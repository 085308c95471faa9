//! # streamprobe
//!
//! **streamprobe** measures end-to-end delivery of a streaming log pipeline.
//!
//! A probe writes uniquely tagged lines into its own log output, subscribes to
//! the pipeline's consumer side and counts how many of those lines come back
//! before a deadline. A [`SourceManager`] keeps an external orchestrator's
//! view of *what* to probe in sync with a source provider.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  SourceProvider ──► SourceManager ──(SchedulingPlan, next term)──► Orchestrator
//!                                                                       │ schedules
//!                                                                       ▼
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │  ReliabilityTestRunner (one trial per TestSpec)                          │
//!   │                                                                          │
//!   │  Authenticator ─► ConsumerGateway ─► Primer ─► Emitter + Correlator      │
//!   │                                                     │                    │
//!   │                                                     ▼                    │
//!   │                                                 TrialResult ─► Reporter  │
//!   └──────────────────────────────────┬───────────────────────────────────────┘
//!                                      │ publish
//!   GroupReliabilityProbe ─────────────┤
//!   SourceManager ─────────────────────┤
//!                                      ▼
//!                        ┌───────────────────────────┐
//!                        │  Bus (broadcast channel)  │
//!                        └─────────────┬─────────────┘
//!                                      ▼
//!                          SubscriberSet::listen
//!                           ┌──────────┼──────────┐
//!                           ▼          ▼          ▼
//!                       LogWriter    sub2       subN
//! ```
//!
//! ### Trial lifecycle
//! ```text
//! Authenticating ─► Subscribing ─► Priming ─► Running ─► Reporting ─► Done
//!       └───────────────┴──────────────┴──────────┴──────► Failed
//!
//! Running:
//!   ├─ Emitter writes "<prefix><id> - TEST" `cycles` times, `delay` apart
//!   └─ Correlator counts deliveries containing the tag:
//!        ├─ stream fault          ─► Failed (TrialError::Stream, nothing reported)
//!        ├─ received == cycles    ─► Completed
//!        └─ deadline elapsed      ─► TimedOut (partial count, reported)
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                               |
//! |-------------------|-----------------------------------------------------------------|--------------------------------------------------|
//! | **Trials**        | Tagged emission correlated against a live subscription.         | [`ReliabilityTestRunner`], [`TestSpec`]          |
//! | **Fan-in**        | Same measurement over a shard group of many sources.            | [`GroupReliabilityProbe`]                        |
//! | **Reconciliation**| Provider → plan → orchestrator on a fixed cadence.              | [`SourceManager`], [`SchedulingPlan`]            |
//! | **Capabilities**  | Everything outside the core, as async trait objects.            | [`ConsumerGateway`], [`Reporter`], [`Orchestrator`] |
//! | **Subscriber API**| Hook into runtime events (logging, alerting, custom).           | [`Subscribe`], [`LogWriter`]                     |
//! | **Errors**        | Typed errors with stable labels.                                | [`TrialError`], [`StreamError`], [`ClientError`] |
//! | **Configuration** | Centralized settings with production defaults.                  | [`ProbeConfig`], [`SourceManagerConfig`], [`GroupProbeConfig`] |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use streamprobe::{Outcome, ProbeConfig, TestSpec, TrialResult};
//!
//! let cfg = ProbeConfig::default();
//! let spec = TestSpec::with_defaults("web-1", &cfg);
//! assert_eq!(spec.cycles, 1000);
//! assert!(!spec.emission_exceeds_timeout());
//!
//! let partial = TrialResult::new(spec.cycles, 700, Outcome::TimedOut);
//! assert_eq!(partial.delivery_ratio(), 0.7);
//! assert_eq!(Duration::from_secs(60), spec.timeout);
//! ```

mod clients;
mod config;
mod core;
mod error;
mod events;
mod group;
mod model;
mod policies;
mod subscribers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use clients::{
    AppListerProvider, Authenticator, ConsumerGateway, Curl, LineSink, Orchestrator, Reporter,
    ShardGroupClient, SourceProvider, StdoutSink, Subscription,
};
pub use config::{GroupProbeConfig, ProbeConfig, SourceManagerConfig};
pub use crate::core::{
    Correlation, Emitter, Inbound, Line, PrimerParams, ReliabilityTestRunner, SourceManager,
    correlate, prime, wait_for_shutdown_signal,
};
pub use error::{ClientError, StreamError, TrialError};
pub use events::{Bus, Event, EventKind};
pub use group::{GroupReliabilityProbe, select_source_ids};
pub use model::{
    Envelope, Message, Outcome, PlannedTask, Resource, SchedulingPlan, SubscriptionId, Tag,
    TestSpec, TrialResult,
};
pub use policies::{Retries, RetryBackoff};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
