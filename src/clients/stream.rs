//! # Stream-side capabilities: credentials, subscriptions and the log side-channel.
//!
//! ```text
//! Authenticator::token() ──► ConsumerGateway::subscribe(id, token) ──► Subscription
//!                                                                      ├─ messages: Envelope stream
//!                                                                      └─ errors:   StreamError stream
//! LineSink::write_line(tag line) ──► platform log pipeline ──► (eventually) messages
//! ```
//!
//! The bus client itself lives outside this crate; it is consumed through
//! [`ConsumerGateway`].

use std::io::Write;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{ClientError, StreamError};
use crate::model::Envelope;

/// Produces bearer credentials on demand. Retry policy, if any, lives here.
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Returns a token to run one trial with.
    async fn token(&self) -> Result<String, ClientError>;
}

/// Inbound side of one subscription.
///
/// Both channels are bounded. A closed `messages` channel is a stream fault;
/// a closed `errors` channel only means no more errors will arrive.
#[derive(Debug)]
pub struct Subscription {
    /// Messages delivered for the subscription identity.
    pub messages: mpsc::Receiver<Envelope>,
    /// Stream faults.
    pub errors: mpsc::Receiver<StreamError>,
}

impl Subscription {
    /// Bundles a pair of receivers.
    pub fn new(messages: mpsc::Receiver<Envelope>, errors: mpsc::Receiver<StreamError>) -> Self {
        Self { messages, errors }
    }
}

/// Client of the streaming bus.
#[async_trait]
pub trait ConsumerGateway: Send + Sync + 'static {
    /// Opens a stream scoped to `subscription_id` without reconnecting on failure.
    async fn subscribe(
        &self,
        subscription_id: &str,
        token: &str,
    ) -> Result<Subscription, StreamError>;
}

/// Destination of emitted tag lines: the log pipeline under test.
///
/// Implementations must not block for long; emitters call this between sleeps.
pub trait LineSink: Send + Sync + 'static {
    /// Writes one line.
    fn write_line(&self, line: &str);
}

/// Writes lines to the process's standard output, which the platform collects.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }
}
