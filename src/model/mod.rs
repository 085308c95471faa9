//! # Data model.
//!
//! - [`TestSpec`], [`SubscriptionId`], [`Tag`] describe one trial and what it looks for
//! - [`Envelope`], [`Message`] inbound stream messages
//! - [`TrialResult`], [`Outcome`] what a trial produces
//! - [`Resource`], [`SchedulingPlan`], [`PlannedTask`] source-manager input and output

mod envelope;
mod plan;
mod result;
mod spec;

pub use envelope::{Envelope, Message};
pub use plan::{PlannedTask, Resource, SchedulingPlan};
pub use result::{Outcome, TrialResult};
pub use spec::{SubscriptionId, Tag, TestSpec};
