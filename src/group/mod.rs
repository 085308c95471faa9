//! Shard-group variant of the reliability trial.
//!
//! - [`GroupReliabilityProbe`]: one trial over a fan-in group of source ids;
//! - membership refresh loops and the paged group walk that back it.

mod membership;
mod probe;
mod walk;

pub use probe::{GroupReliabilityProbe, select_source_ids};
