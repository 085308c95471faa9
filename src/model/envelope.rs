//! # Inbound stream messages.
//!
//! The bus carries more than log lines. [`Message`] classifies an envelope
//! once, at the boundary where the gateway decodes it; everything downstream
//! matches on the variant instead of probing the payload type again.

use std::collections::BTreeMap;

/// One message delivered by the streaming bus.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    /// Origin timestamp in nanoseconds since the Unix epoch.
    pub timestamp_ns: i64,
    /// Source the message was emitted by.
    pub source_id: String,
    /// Typed body.
    pub message: Message,
}

/// Envelope body.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// Application log line.
    Log {
        /// Raw line bytes.
        payload: Vec<u8>,
    },
    /// Monotonic counter sample.
    Counter {
        /// Counter name.
        name: String,
        /// Cumulative total.
        total: u64,
    },
    /// Set of gauge readings taken at the same instant.
    Gauge {
        /// Gauge name to value.
        metrics: BTreeMap<String, f64>,
    },
    /// Anything the probe does not interpret.
    Other,
}

impl Envelope {
    /// Builds a log envelope.
    pub fn log(source_id: impl Into<String>, timestamp_ns: i64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp_ns,
            source_id: source_id.into(),
            message: Message::Log {
                payload: payload.into(),
            },
        }
    }

    /// Returns the payload for log envelopes, `None` for every other kind.
    #[inline]
    pub fn log_payload(&self) -> Option<&[u8]> {
        match &self.message {
            Message::Log { payload } => Some(payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_logs_expose_payloads() {
        let log = Envelope::log("app", 1, "hello");
        assert_eq!(log.log_payload(), Some(&b"hello"[..]));

        let counter = Envelope {
            timestamp_ns: 1,
            source_id: "app".into(),
            message: Message::Counter {
                name: "hello".into(),
                total: 1,
            },
        };
        assert_eq!(counter.log_payload(), None);
    }
}
