//! # Shard-group capability.
//!
//! A shard group lets one reader consume the merged stream of many source ids.
//! Membership is eventually consistent, so callers refresh it periodically and
//! tolerate empty reads while it propagates.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::model::Envelope;

/// Client of a log cache that supports shard groups.
#[async_trait]
pub trait ShardGroupClient: Send + Sync + 'static {
    /// Lists every source id the cache currently holds data for.
    async fn source_ids(&self) -> Result<Vec<String>, ClientError>;

    /// Adds `source_id` to `group` (idempotent).
    async fn set_shard_group(&self, group: &str, source_id: &str) -> Result<(), ClientError>;

    /// Reads envelopes of `group` newer than or equal to `start_ns`, oldest first.
    ///
    /// `requester_id` identifies the reader so the cache can split the group
    /// between concurrent readers.
    async fn read(
        &self,
        group: &str,
        requester_id: u64,
        start_ns: i64,
    ) -> Result<Vec<Envelope>, ClientError>;
}
