//! # Correlator: counts tagged deliveries under a deadline.
//!
//! [`Inbound`] merges a [`Subscription`]'s two channels into one fallible
//! stream; [`correlate`] consumes it until one exit condition holds.
//!
//! ## Exit conditions (checked in this order on every step)
//! ```text
//! 1. stream fault        ─► Err(TrialError::Stream { received, .. })
//! 2. received == expected ─► Ok(Completed)   (counting stops at equality)
//! 3. deadline elapsed     ─► Ok(TimedOut)    (partial count, not an error)
//! ```
//!
//! ## Rules
//! - Only `Log` envelopes whose payload **contains** the tag are counted.
//! - The counter is a local of the correlating task and is returned by value.
//! - A busy stream cannot starve the deadline: it is re-checked after every message.

use std::time::Duration;

use tokio::{select, time};

use crate::clients::Subscription;
use crate::error::{StreamError, TrialError};
use crate::model::{Envelope, Outcome, Tag};

/// Fallible view over a subscription's message and error channels.
///
/// Errors take priority over messages. A closed error channel is ignored
/// from then on; a closed message channel is reported as [`StreamError::Closed`].
#[derive(Debug)]
pub struct Inbound {
    sub: Subscription,
    errors_open: bool,
}

impl Inbound {
    pub fn new(sub: Subscription) -> Self {
        Self {
            sub,
            errors_open: true,
        }
    }

    /// Waits for the next envelope or stream fault. Cancel-safe.
    pub async fn next(&mut self) -> Result<Envelope, StreamError> {
        loop {
            select! {
                biased;
                err = self.sub.errors.recv(), if self.errors_open => match err {
                    Some(err) => return Err(err),
                    None => self.errors_open = false,
                },
                msg = self.sub.messages.recv() => return msg.ok_or(StreamError::Closed),
            }
        }
    }
}

/// Result of a correlation that ended without a stream fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Correlation {
    /// Tagged deliveries counted.
    pub received: u64,
    /// `Completed` or `TimedOut`.
    pub outcome: Outcome,
}

/// Counts envelopes carrying `tag` until `expected` is reached, the stream
/// fails, or `timeout` elapses.
///
/// `expected == 0` completes immediately without reading.
pub async fn correlate(
    inbound: &mut Inbound,
    tag: &Tag,
    expected: u64,
    timeout: Duration,
) -> Result<Correlation, TrialError> {
    let deadline = time::Instant::now() + timeout;
    let sleep = time::sleep_until(deadline);
    tokio::pin!(sleep);

    let mut received: u64 = 0;
    if received >= expected {
        return Ok(Correlation {
            received,
            outcome: Outcome::Completed,
        });
    }

    loop {
        select! {
            biased;
            next = inbound.next() => {
                let envelope = next.map_err(|source| TrialError::Stream { received, source })?;
                if envelope.log_payload().is_some_and(|p| tag.matches(p)) {
                    received += 1;
                    if received == expected {
                        return Ok(Correlation { received, outcome: Outcome::Completed });
                    }
                }
                if time::Instant::now() >= deadline {
                    return Ok(Correlation { received, outcome: Outcome::TimedOut });
                }
            }
            _ = &mut sleep => {
                return Ok(Correlation { received, outcome: Outcome::TimedOut });
            }
        }
    }
}
