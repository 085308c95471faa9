//! # Primer: proves a subscription is live before counting starts.
//!
//! Early deliveries missed while the subscription is still being set up
//! would look like pipeline drops. The primer writes the primer tag on a
//! fixed cadence and waits until the tag comes back on the stream.
//!
//! ```text
//! spawn Emitter::repeating(primer line, interval) ─┐
//!                                                  │ (child token)
//! loop {                                           │
//!   ├─ stream fault      ─► Err(PrimeStream)       │
//!   ├─ primer tag seen   ─► Ok(())                 │
//!   └─ deadline elapsed  ─► Err(PrimeTimeout)      │
//! }                                                │
//! cancel + join emitter ◄──────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::clients::LineSink;
use crate::core::correlator::Inbound;
use crate::core::emitter::{self, Emitter, Line};
use crate::error::TrialError;
use crate::events::Bus;
use crate::model::Tag;

/// Parameters of one priming handshake.
#[derive(Clone, Copy, Debug)]
pub struct PrimerParams {
    /// Pause between primer lines.
    pub interval: Duration,
    /// Handshake deadline.
    pub timeout: Duration,
}

/// Runs the handshake. The primer emitter never outlives this call.
///
/// A panicked primer emitter is published on `bus` under the tag as subject.
pub async fn prime(
    inbound: &mut Inbound,
    tag: &Tag,
    sink: Arc<dyn LineSink>,
    params: PrimerParams,
    parent: &CancellationToken,
    bus: &Bus,
) -> Result<(), TrialError> {
    let token = parent.child_token();
    let emitter = Emitter::repeating(sink, Line::Fixed(tag.as_str().to_string()), params.interval)
        .spawn(token.clone());

    let res = wait_for_tag(inbound, tag, params.timeout).await;

    token.cancel();
    emitter::join(emitter, bus, tag.as_str()).await;
    res
}

async fn wait_for_tag(inbound: &mut Inbound, tag: &Tag, timeout: Duration) -> Result<(), TrialError> {
    let deadline = time::Instant::now() + timeout;
    let sleep = time::sleep_until(deadline);
    tokio::pin!(sleep);

    loop {
        select! {
            biased;
            next = inbound.next() => {
                let envelope = next.map_err(|source| TrialError::PrimeStream { source })?;
                if envelope.log_payload().is_some_and(|p| tag.matches(p)) {
                    return Ok(());
                }
                if time::Instant::now() >= deadline {
                    return Err(TrialError::PrimeTimeout { timeout });
                }
            }
            _ = &mut sleep => return Err(TrialError::PrimeTimeout { timeout }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamError;
    use crate::testing::Loopback;

    const PARAMS: PrimerParams = PrimerParams {
        interval: Duration::from_secs(1),
        timeout: Duration::from_secs(60),
    };

    #[tokio::test(start_paused = true)]
    async fn succeeds_once_the_primer_comes_back() {
        let lb = Loopback::delivering_all();
        let mut inbound = Inbound::new(lb.take_subscription());
        let tag = Tag::new("p-1 - PRIMER");

        prime(&mut inbound, &tag, lb.clone(), PARAMS, &CancellationToken::new(), &Bus::new(16))
            .await
            .unwrap();

        assert_eq!(lb.written_containing("p-1 - PRIMER"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_and_stops_emitting() {
        let lb = Loopback::delivering_none();
        let mut inbound = Inbound::new(lb.take_subscription());
        let tag = Tag::new("p-1 - PRIMER");

        let err = prime(&mut inbound, &tag, lb.clone(), PARAMS, &CancellationToken::new(), &Bus::new(16))
            .await
            .unwrap_err();

        assert_eq!(err, TrialError::PrimeTimeout { timeout: Duration::from_secs(60) });
        let written = lb.written_containing("p-1 - PRIMER");
        assert!((60..=61).contains(&written), "wrote {written} primer lines");

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(lb.written_containing("p-1 - PRIMER"), written);
    }

    #[tokio::test(start_paused = true)]
    async fn stream_fault_aborts_the_handshake() {
        let lb = Loopback::delivering_none();
        let mut inbound = Inbound::new(lb.take_subscription());
        lb.fail(StreamError::failed("unauthorized"));

        let err = prime(
            &mut inbound,
            &Tag::new("p-1 - PRIMER"),
            lb.clone(),
            PARAMS,
            &CancellationToken::new(),
            &Bus::new(16),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            TrialError::PrimeStream { source: StreamError::failed("unauthorized") }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn other_traffic_does_not_prime() {
        let lb = Loopback::delivering_none();
        let mut inbound = Inbound::new(lb.take_subscription());
        lb.inject("p-1 - TEST");
        lb.inject("p-12 - PRIMER-ish");

        let err = prime(
            &mut inbound,
            &Tag::new("p-1 - PRIMER"),
            lb.clone(),
            PrimerParams { interval: Duration::from_secs(1), timeout: Duration::from_secs(3) },
            &CancellationToken::new(),
            &Bus::new(16),
        )
        .await
        .unwrap_err();

        assert_eq!(err.as_label(), "trial_prime_timeout");
    }

    struct Broken;

    impl LineSink for Broken {
        fn write_line(&self, _line: &str) {
            panic!("sink closed");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn broken_primer_emitter_is_reported() {
        let lb = Loopback::delivering_none();
        let mut inbound = Inbound::new(lb.take_subscription());
        let bus = Bus::new(16);
        let mut events = bus.subscribe();

        let err = prime(
            &mut inbound,
            &Tag::new("p-1 - PRIMER"),
            Arc::new(Broken),
            PARAMS,
            &CancellationToken::new(),
            &bus,
        )
        .await
        .unwrap_err();

        assert_eq!(err, TrialError::PrimeTimeout { timeout: Duration::from_secs(60) });
        let ev = events.try_recv().unwrap();
        assert_eq!(ev.kind, crate::events::EventKind::EmitterFailed);
        assert_eq!(ev.subject.as_deref(), Some("p-1 - PRIMER"));
    }
}
