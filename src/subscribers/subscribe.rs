//! # Event subscriber trait.
//!
//! [`Subscribe`] is the extension point for plugging event handlers (logging,
//! alerting, result dashboards) into a probe process. Each subscriber is driven
//! by a dedicated worker fed by a bounded queue owned by the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Rules
//! - A slow subscriber only affects its own queue; publishers never wait.
//! - Queue overflow drops the event **for this subscriber only** and publishes
//!   `EventKind::SubscriberOverflow`.
//! - Panics are caught and published as `EventKind::SubscriberPanicked`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use streamprobe::{Event, EventKind, Subscribe};
//!
//! struct DropAlarm;
//!
//! #[async_trait]
//! impl Subscribe for DropAlarm {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::TrialFinished) && ev.received < ev.expected {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "drop-alarm" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for probe observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event, in FIFO order per subscriber.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in overflow/panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber (clamped to at least 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
