use async_trait::async_trait;

use crate::error::ClientError;
use crate::model::TrialResult;

/// Accepts finished trial results (HTTP submission, persistence).
#[async_trait]
pub trait Reporter: Send + Sync + 'static {
    /// Submits one result. Failures are logged by the caller and never retried.
    async fn report(&self, result: &TrialResult) -> Result<(), ClientError>;
}
