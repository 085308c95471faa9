//! # Reliability test runner: one correlation trial, end to end.
//!
//! ## Phases
//! ```text
//! Authenticating ─► Subscribing ─► Priming ─► Running ─► Reporting ─► Done
//!       │               │             │          │
//!       └───────────────┴─────────────┴──────────┴──────► Failed (no result, no report)
//! ```
//!
//! - **Authenticating**: `Authenticator::token()`; failure is terminal, never retried here.
//! - **Subscribing**: `ConsumerGateway::subscribe(prefix + id, token)`.
//! - **Priming**: [`prime`] until the primer tag is observed (1s cadence, 60s deadline by default).
//! - **Running**: an [`Emitter`] writes the test tag `cycles` times while [`correlate`]
//!   counts deliveries under the `TestSpec` timeout. A timeout is a normal outcome.
//! - **Reporting**: the [`TrialResult`] goes to the [`Reporter`]; a rejected report is
//!   logged and the trial still ends normally.
//!
//! ## Task lifetimes
//! Each trial owns a root [`CancellationToken`], cancelled when `run` returns or
//! its future is dropped. The primer emitter lives only during Priming and the
//! test emitter only during Running: both are cancelled and joined as soon as
//! their phase resolves, so a trial that completes or times out early stops
//! emitting instead of running its emitter to exhaustion.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::clients::{Authenticator, ConsumerGateway, LineSink, Reporter, StdoutSink};
use crate::config::ProbeConfig;
use crate::core::correlator::{Inbound, correlate};
use crate::core::emitter::{self, Emitter, Line};
use crate::core::primer::{PrimerParams, prime};
use crate::error::TrialError;
use crate::events::{Bus, Event, EventKind};
use crate::model::{SubscriptionId, TestSpec, TrialResult};

/// Runs reliability trials. Trials are independent and may run concurrently
/// on the same runner as long as their subscription identities differ.
#[derive(Clone)]
pub struct ReliabilityTestRunner {
    cfg: ProbeConfig,
    authenticator: Arc<dyn Authenticator>,
    gateway: Arc<dyn ConsumerGateway>,
    reporter: Arc<dyn Reporter>,
    sink: Arc<dyn LineSink>,
    bus: Bus,
}

impl ReliabilityTestRunner {
    /// Creates a runner that emits tag lines on standard output.
    pub fn new(
        cfg: ProbeConfig,
        authenticator: Arc<dyn Authenticator>,
        gateway: Arc<dyn ConsumerGateway>,
        reporter: Arc<dyn Reporter>,
        bus: Bus,
    ) -> Self {
        Self {
            cfg,
            authenticator,
            gateway,
            reporter,
            sink: Arc::new(StdoutSink),
            bus,
        }
    }

    /// Creates a runner with its own bus sized by `cfg.bus_capacity`.
    pub fn from_config(
        cfg: ProbeConfig,
        authenticator: Arc<dyn Authenticator>,
        gateway: Arc<dyn ConsumerGateway>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self::new(cfg, authenticator, gateway, reporter, bus)
    }

    /// Returns a handle to the bus trial events are published on.
    pub fn bus(&self) -> Bus {
        self.bus.clone()
    }

    /// Replaces the line sink tag lines are written to.
    pub fn with_sink(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the subscription identity a spec runs under.
    pub fn subscription_id(&self, spec: &TestSpec) -> SubscriptionId {
        SubscriptionId::new(&self.cfg.subscription_prefix, &spec.id)
    }

    /// Runs one trial.
    ///
    /// Returns the result that was handed to the reporter (whether or not the
    /// reporter accepted it), or the reason the trial produced none.
    pub async fn run(&self, spec: &TestSpec) -> Result<TrialResult, TrialError> {
        let id = self.subscription_id(spec);
        let token = CancellationToken::new();
        let _guard = token.clone().drop_guard();

        self.bus.publish(
            Event::new(EventKind::TrialStarting)
                .with_subject(id.as_str())
                .with_expected(spec.cycles),
        );

        match self.measure(&id, spec, &token).await {
            Ok(result) => {
                self.bus.publish(
                    Event::new(EventKind::TrialFinished)
                        .with_subject(id.as_str())
                        .with_counts(result.expected_count, result.received_count)
                        .with_outcome(result.outcome),
                );
                self.submit(&id, &result).await;
                Ok(result)
            }
            Err(err) => {
                let mut ev = Event::new(EventKind::TrialFailed)
                    .with_subject(id.as_str())
                    .with_label(err.as_label())
                    .with_reason(err.to_string());
                if let TrialError::Stream { received, .. } = &err {
                    ev = ev.with_received(*received);
                }
                self.bus.publish(ev);
                Err(err)
            }
        }
    }

    async fn measure(
        &self,
        id: &SubscriptionId,
        spec: &TestSpec,
        token: &CancellationToken,
    ) -> Result<TrialResult, TrialError> {
        let credential = self
            .authenticator
            .token()
            .await
            .map_err(|source| TrialError::Authentication { source })?;

        let subscription = self
            .gateway
            .subscribe(id.as_str(), &credential)
            .await
            .map_err(|source| TrialError::Subscribe { source })?;
        let mut inbound = Inbound::new(subscription);

        let primer = PrimerParams {
            interval: self.cfg.primer_interval,
            timeout: self.cfg.primer_timeout,
        };
        prime(
            &mut inbound,
            &id.primer_tag(),
            self.sink.clone(),
            primer,
            token,
            &self.bus,
        )
        .await?;
        self.bus
            .publish(Event::new(EventKind::PrimeSucceeded).with_subject(id.as_str()));

        if spec.emission_exceeds_timeout() {
            self.bus.publish(
                Event::new(EventKind::EmissionWindowExceeded)
                    .with_subject(id.as_str())
                    .with_timeout(spec.timeout),
            );
        }

        let tag = id.test_tag();
        let emit_token = token.child_token();
        let emitter = Emitter::bounded(
            self.sink.clone(),
            Line::Fixed(tag.as_str().to_string()),
            spec.cycles,
            spec.delay,
        )
        .spawn(emit_token.clone());

        let correlation = correlate(&mut inbound, &tag, spec.cycles, spec.timeout).await;

        emit_token.cancel();
        emitter::join(emitter, &self.bus, id.as_str()).await;

        let c = correlation?;
        Ok(TrialResult::new(spec.cycles, c.received, c.outcome))
    }

    async fn submit(&self, id: &SubscriptionId, result: &TrialResult) {
        match self.reporter.report(result).await {
            Ok(()) => self
                .bus
                .publish(Event::new(EventKind::ReportSubmitted).with_subject(id.as_str())),
            Err(err) => self.bus.publish(
                Event::new(EventKind::ReportFailed)
                    .with_subject(id.as_str())
                    .with_label(err.as_label())
                    .with_reason(err.to_string()),
            ),
        }
    }
}
