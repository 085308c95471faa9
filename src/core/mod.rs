//! Probe core: emission, correlation and the loops that drive them.
//!
//! - [`emitter`]: cancellable log-and-sleep line writer;
//! - [`correlator`]: counts tagged deliveries under a deadline;
//! - [`primer`]: liveness handshake run before counting;
//! - [`runner`]: one reliability trial end to end;
//! - [`source_manager`]: provider → orchestrator reconciliation loop;
//! - [`shutdown`]: process signal handling.

pub(crate) mod correlator;
pub(crate) mod emitter;
pub(crate) mod primer;
mod runner;
mod shutdown;
mod source_manager;

pub use correlator::{Correlation, Inbound, correlate};
pub use emitter::{Emitter, Line};
pub use primer::{PrimerParams, prime};
pub use runner::ReliabilityTestRunner;
pub use shutdown::wait_for_shutdown_signal;
pub use source_manager::SourceManager;
