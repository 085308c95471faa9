//! Shard-group membership refresh.
//!
//! Membership is eventually consistent and may be dropped by the cache, so
//! every source id gets its own loop re-asserting it on a fixed cadence
//! until the probe is done.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::clients::ShardGroupClient;
use crate::error::ClientError;
use crate::events::{Bus, Event, EventKind};

/// Keeps a set of source ids joined to one group.
pub(crate) struct Membership {
    pub(crate) client: Arc<dyn ShardGroupClient>,
    pub(crate) group: Arc<str>,
    pub(crate) interval: Duration,
    pub(crate) call_timeout: Duration,
    pub(crate) bus: Bus,
}

impl Membership {
    /// Spawns one refresh loop per id. Every loop exits when `token` is cancelled.
    pub(crate) fn spawn(&self, source_ids: &[String], token: &CancellationToken) -> JoinSet<()> {
        let mut set = JoinSet::new();
        for id in source_ids {
            set.spawn(refresh(
                self.client.clone(),
                self.group.clone(),
                id.clone(),
                self.interval,
                self.call_timeout,
                self.bus.clone(),
                token.clone(),
            ));
        }
        set
    }
}

async fn refresh(
    client: Arc<dyn ShardGroupClient>,
    group: Arc<str>,
    source_id: String,
    interval: Duration,
    call_timeout: Duration,
    bus: Bus,
    token: CancellationToken,
) {
    loop {
        let call = time::timeout(call_timeout, client.set_shard_group(&group, &source_id));
        let res = select! {
            _ = token.cancelled() => return,
            res = call => res.unwrap_or(Err(ClientError::Timeout { timeout: call_timeout })),
        };

        if let Err(err) = res {
            bus.publish(
                Event::new(EventKind::MembershipFailed)
                    .with_subject(source_id.as_str())
                    .with_label(err.as_label())
                    .with_reason(err.to_string()),
            );
        }

        select! {
            _ = token.cancelled() => return,
            _ = time::sleep(interval) => {}
        }
    }
}
