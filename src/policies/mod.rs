//! Retry policies.
//!
//! ## Contents
//! - [`RetryBackoff`] how long to wait after a failed or empty read, and when to stop
//! - [`Retries`]      consecutive-miss counter driven by a `RetryBackoff`
//!
//! ## Quick wiring
//! ```text
//! GroupProbeConfig { read_backoff: RetryBackoff, .. }
//!      └─► group::walk uses:
//!           - retries.on_miss() after an error or an empty batch
//!           - retries.reset() after every non-empty batch
//! ```
//!
//! ## Defaults
//! - `RetryBackoff::default()` → 50ms fixed, 100 consecutive retries.

mod retry;

pub use retry::{Retries, RetryBackoff};
