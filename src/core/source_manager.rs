//! # Source manager: keeps the orchestrator's task set in sync with the provider.
//!
//! On every tick the manager pulls the full resource set, rebuilds a
//! [`SchedulingPlan`] from scratch and hands it to the [`Orchestrator`],
//! followed by a term signal.
//!
//! ```text
//! tick (first one immediate, then every `interval`)
//!   └─► SourceProvider::resources()
//!         ├─ Err ─► publish ProviderFailed; skip update and term (previous plan stays in force)
//!         └─ Ok  ─► plan = SchedulingPlan::weighted(resources, weight)
//!                   ├─► Orchestrator::update_tasks(plan.clone())
//!                   ├─► watch channel ◄── plan
//!                   ├─► Orchestrator::next_term()  (bounded by term_timeout)
//!                   └─► publish PlanPublished
//! ```
//!
//! ## Rules
//! - Plans are replaced wholesale, never patched.
//! - Stopping is checked between polls; an in-flight poll always finishes,
//!   including under [`SourceManager::run_until_shutdown`].
//! - Ticks missed while a poll overruns are delayed, not bursted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::clients::{Orchestrator, SourceProvider};
use crate::config::SourceManagerConfig;
use crate::core::shutdown::wait_for_shutdown_signal;
use crate::error::ClientError;
use crate::events::{Bus, Event, EventKind};
use crate::model::{Resource, SchedulingPlan};

type Weight = Arc<dyn Fn(&Resource) -> u32 + Send + Sync>;

/// Reconciliation loop between a [`SourceProvider`] and an [`Orchestrator`].
pub struct SourceManager {
    provider: Arc<dyn SourceProvider>,
    orchestrator: Arc<dyn Orchestrator>,
    cfg: SourceManagerConfig,
    bus: Bus,
    weight: Weight,
    plan_tx: watch::Sender<Option<SchedulingPlan>>,
}

impl SourceManager {
    /// Creates a manager that schedules one instance per resource.
    pub fn new(
        provider: Arc<dyn SourceProvider>,
        orchestrator: Arc<dyn Orchestrator>,
        cfg: SourceManagerConfig,
        bus: Bus,
    ) -> Self {
        let (plan_tx, _) = watch::channel(None);
        Self {
            provider,
            orchestrator,
            cfg,
            bus,
            weight: Arc::new(|_| 1),
            plan_tx,
        }
    }

    /// Sets the instance count computed for each resource.
    pub fn with_weight<F>(mut self, weight: F) -> Self
    where
        F: Fn(&Resource) -> u32 + Send + Sync + 'static,
    {
        self.weight = Arc::new(weight);
        self
    }

    /// Observes the last plan handed to the orchestrator (`None` until the first success).
    pub fn plans(&self) -> watch::Receiver<Option<SchedulingPlan>> {
        self.plan_tx.subscribe()
    }

    /// Runs one reconciliation step and returns the number of planned tasks.
    ///
    /// A provider failure is returned after it has been published; the
    /// orchestrator is not touched in that case.
    pub async fn poll_once(&self) -> Result<usize, ClientError> {
        let resources = match self.provider.resources().await {
            Ok(resources) => resources,
            Err(err) => {
                self.bus.publish(
                    Event::new(EventKind::ProviderFailed)
                        .with_label(err.as_label())
                        .with_reason(err.to_string()),
                );
                return Err(err);
            }
        };

        let plan = SchedulingPlan::weighted(&resources, |r| (self.weight)(r));
        let tasks = plan.len();

        self.orchestrator.update_tasks(plan.clone()).await;
        self.plan_tx.send_replace(Some(plan));

        match self.cfg.term_deadline() {
            Some(deadline) => {
                if time::timeout(deadline, self.orchestrator.next_term()).await.is_err() {
                    self.bus
                        .publish(Event::new(EventKind::TermTimedOut).with_timeout(deadline));
                }
            }
            None => self.orchestrator.next_term().await,
        }

        self.bus
            .publish(Event::new(EventKind::PlanPublished).with_expected(tasks as u64));
        Ok(tasks)
    }

    /// Polls on the configured cadence until `token` is cancelled.
    pub async fn run(&self, token: CancellationToken) {
        let mut ticker = time::interval(self.cfg.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let _ = self.poll_once().await;
        }
    }

    /// Polls until `stop` completes, then returns its output.
    ///
    /// Completion of `stop` publishes `ShutdownRequested` and cancels the loop;
    /// a poll already in flight runs to the end first.
    pub async fn run_until<F>(&self, stop: F) -> F::Output
    where
        F: Future,
    {
        let token = CancellationToken::new();
        let stopper = async {
            let out = stop.await;
            self.bus.publish(Event::new(EventKind::ShutdownRequested));
            token.cancel();
            out
        };
        let (out, ()) = tokio::join!(stopper, self.run(token.clone()));
        out
    }

    /// Polls until the process receives a termination signal.
    pub async fn run_until_shutdown(&self) -> std::io::Result<()> {
        self.run_until(wait_for_shutdown_signal()).await
    }
}
