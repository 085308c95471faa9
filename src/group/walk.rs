//! Paged reads over a shard group.
//!
//! ```text
//! cursor = start
//! loop {
//!   read(group, requester, cursor)
//!     ├─ non-empty ─► reset retries; cursor = last.timestamp + 1; visit(batch) or stop
//!     ├─ empty     ─┐
//!     └─ error     ─┴► retries.on_miss() ─► sleep(delay) | exhausted ─► stop
//! }
//! ```

use tokio::time;

use crate::clients::ShardGroupClient;
use crate::events::{Bus, Event, EventKind};
use crate::model::Envelope;
use crate::policies::RetryBackoff;

/// Why a walk ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WalkEnd {
    /// The visitor asked to stop.
    Stopped,
    /// Too many consecutive empty or failed reads.
    Exhausted,
}

/// Where and how to read.
pub(crate) struct Walk<'a> {
    pub(crate) client: &'a dyn ShardGroupClient,
    pub(crate) group: &'a str,
    pub(crate) requester_id: u64,
    pub(crate) backoff: RetryBackoff,
    pub(crate) bus: &'a Bus,
}

impl Walk<'_> {
    /// Feeds batches newer than `start_ns` to `visit` until it returns `false`
    /// or the backoff gives up.
    pub(crate) async fn run<F>(&self, start_ns: i64, mut visit: F) -> WalkEnd
    where
        F: FnMut(&[Envelope]) -> bool,
    {
        let mut cursor = start_ns;
        let mut retries = self.backoff.retries();

        loop {
            match self.client.read(self.group, self.requester_id, cursor).await {
                Ok(batch) if !batch.is_empty() => {
                    retries.reset();
                    if let Some(last) = batch.last() {
                        cursor = last.timestamp_ns.saturating_add(1);
                    }
                    if !visit(&batch) {
                        return WalkEnd::Stopped;
                    }
                    continue;
                }
                Ok(_) => {}
                Err(err) => self.bus.publish(
                    Event::new(EventKind::ReadFailed)
                        .with_subject(self.group)
                        .with_label(err.as_label())
                        .with_reason(err.to_string()),
                ),
            }

            match retries.on_miss() {
                Some(delay) => time::sleep(delay).await,
                None => {
                    self.bus
                        .publish(Event::new(EventKind::ReadsExhausted).with_subject(self.group));
                    return WalkEnd::Exhausted;
                }
            }
        }
    }
}
