//! # Capabilities consumed by the probes.
//!
//! Every collaborator outside the core is an async trait object:
//!
//! | Capability            | Used by                    | Purpose                                   |
//! |-----------------------|----------------------------|-------------------------------------------|
//! | [`Authenticator`]     | `ReliabilityTestRunner`    | bearer credential per trial               |
//! | [`ConsumerGateway`]   | `ReliabilityTestRunner`    | per-trial inbound stream + error stream   |
//! | [`LineSink`]          | emitters                   | the log side-channel being measured       |
//! | [`Reporter`]          | `ReliabilityTestRunner`    | result submission                         |
//! | [`SourceProvider`]    | `SourceManager`            | current resource set                      |
//! | [`Orchestrator`]      | `SourceManager`            | plan handoff and term signal              |
//! | [`ShardGroupClient`]  | `GroupReliabilityProbe`    | group membership and group reads          |
//!
//! [`AppListerProvider`] is a ready-made [`SourceProvider`] over a [`Curl`] capability.

mod app_lister;
mod reporter;
mod scheduling;
mod shard_group;
mod stream;

pub use app_lister::{AppListerProvider, Curl};
pub use reporter::Reporter;
pub use scheduling::{Orchestrator, SourceProvider};
pub use shard_group::ShardGroupClient;
pub use stream::{Authenticator, ConsumerGateway, LineSink, StdoutSink, Subscription};
