//! Error types used by the probe runtime and its collaborators.
//!
//! This module defines three error enums:
//!
//! - [`StreamError`] faults of the consumer-gateway stream (the observation path).
//! - [`ClientError`] failures of request/response collaborators (auth, providers, reporters).
//! - [`TrialError`] why a trial ended without producing a result.
//!
//! All of them provide `as_label` for logs. A delivery timeout is **not** an
//! error anywhere in this crate: it is a normal [`Outcome`](crate::Outcome).

use std::time::Duration;
use thiserror::Error;

use crate::model::{Outcome, TrialResult};

/// # Faults of the inbound stream.
///
/// Yielded on a subscription's error channel, or synthesized when the
/// inbound message channel closes underneath a trial.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The inbound message channel closed.
    #[error("inbound stream closed")]
    Closed,

    /// The gateway reported a failure on the stream.
    #[error("stream failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },
}

impl StreamError {
    /// Convenience constructor for [`StreamError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        StreamError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::Closed => "stream_closed",
            StreamError::Failed { .. } => "stream_failed",
        }
    }
}

/// # Failures of external request/response collaborators.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request could not be completed.
    #[error("{error}")]
    Request {
        /// The underlying error message.
        error: String,
    },

    /// The response could not be decoded.
    #[error("invalid response: {error}")]
    Decode {
        /// The decoder's error message.
        error: String,
    },

    /// The request did not complete within its deadline.
    #[error("request timed out after {timeout:?}")]
    Timeout {
        /// The deadline that elapsed.
        timeout: Duration,
    },
}

impl ClientError {
    /// Convenience constructor for [`ClientError::Request`].
    pub fn request(error: impl Into<String>) -> Self {
        ClientError::Request {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use streamprobe::ClientError;
    ///
    /// assert_eq!(ClientError::request("boom").as_label(), "client_request");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ClientError::Request { .. } => "client_request",
            ClientError::Decode { .. } => "client_decode",
            ClientError::Timeout { .. } => "client_timeout",
        }
    }
}

/// # Reasons a trial ends without a result.
///
/// Every variant is terminal for the trial it belongs to and is never
/// retried by the runner. None of them is reported.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrialError {
    /// The authenticator could not produce a credential.
    #[error("failed to authenticate: {source}")]
    Authentication {
        /// The authenticator's failure.
        source: ClientError,
    },

    /// The gateway refused the subscription.
    #[error("failed to subscribe: {source}")]
    Subscribe {
        /// The gateway's failure.
        source: StreamError,
    },

    /// The primer tag was never observed within the priming deadline.
    #[error("timed out after {timeout:?} while priming")]
    PrimeTimeout {
        /// The priming deadline.
        timeout: Duration,
    },

    /// The stream failed before the subscription was proven live.
    #[error("stream failed while priming: {source}")]
    PrimeStream {
        /// The stream fault.
        source: StreamError,
    },

    /// The stream failed while deliveries were being counted.
    #[error("stream failed after {received} deliveries: {source}")]
    Stream {
        /// Deliveries counted before the fault.
        received: u64,
        /// The stream fault.
        source: StreamError,
    },

    /// The source ids for a shard group could not be resolved.
    #[error("unable to get source ids: {source}")]
    SourceIds {
        /// The collaborator's failure.
        source: ClientError,
    },
}

impl TrialError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use streamprobe::TrialError;
    ///
    /// let err = TrialError::PrimeTimeout { timeout: Duration::from_secs(60) };
    /// assert_eq!(err.as_label(), "trial_prime_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TrialError::Authentication { .. } => "trial_authentication",
            TrialError::Subscribe { .. } => "trial_subscribe",
            TrialError::PrimeTimeout { .. } => "trial_prime_timeout",
            TrialError::PrimeStream { .. } => "trial_prime_stream",
            TrialError::Stream { .. } => "trial_stream",
            TrialError::SourceIds { .. } => "trial_source_ids",
        }
    }

    /// Indicates whether the trial reached the measurement phase.
    ///
    /// Only [`TrialError::Stream`] happens after priming succeeded.
    pub fn is_measurement_fault(&self) -> bool {
        matches!(self, TrialError::Stream { .. })
    }

    /// Builds an `errored` record for a measurement fault.
    ///
    /// Returns `None` for setup and priming failures, which never observed
    /// any delivery.
    pub fn errored_result(&self, expected: u64) -> Option<TrialResult> {
        match self {
            TrialError::Stream { received, .. } => {
                Some(TrialResult::new(expected, *received, Outcome::Errored))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_fault_carries_partial_count() {
        let err = TrialError::Stream {
            received: 3,
            source: StreamError::failed("reset by peer"),
        };
        assert!(err.is_measurement_fault());
        assert_eq!(
            err.errored_result(5),
            Some(TrialResult::new(5, 3, Outcome::Errored))
        );
        assert_eq!(
            err.to_string(),
            "stream failed after 3 deliveries: stream failed: reset by peer"
        );
    }

    #[test]
    fn setup_failures_have_no_result() {
        let err = TrialError::Authentication {
            source: ClientError::request("bad secret"),
        };
        assert!(!err.is_measurement_fault());
        assert_eq!(err.errored_result(5), None);
        assert_eq!(err.as_label(), "trial_authentication");
    }
}
