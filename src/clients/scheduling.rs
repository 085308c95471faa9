//! # Reconciliation capabilities: where sources come from and who schedules probes.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::model::{Resource, SchedulingPlan};

/// Lists the sources that should currently be monitored.
#[async_trait]
pub trait SourceProvider: Send + Sync + 'static {
    /// Returns the full, ordered resource set.
    async fn resources(&self) -> Result<Vec<Resource>, ClientError>;
}

/// External scheduler that spawns one probe per planned task instance.
#[async_trait]
pub trait Orchestrator: Send + Sync + 'static {
    /// Replaces the desired task set. The plan is handed over by value.
    async fn update_tasks(&self, plan: SchedulingPlan);

    /// Runs one scheduling term against the current task set.
    ///
    /// Callers bound this with a deadline by dropping the future.
    async fn next_term(&self);
}
