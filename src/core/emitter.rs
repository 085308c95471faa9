//! # Emitter: writes tagged lines into the log pipeline at a fixed cadence.
//!
//! An [`Emitter`] is a log-and-sleep loop. It never looks at the receive side:
//! it neither slows down nor speeds up with delivery progress.
//!
//! ```text
//! [warmup] ─► write(line 0) ─► sleep(delay) ─► write(line 1) ─► ... ─► write(line N-1) ─► sleep(delay) ─► done
//!                 ▲                                                                              │
//!                 └──────────────── token cancelled at any sleep ─► stop ◄───────────────────────┘
//! ```
//!
//! ## Rules
//! - The emitter is spawned onto its own task and owns nothing but its line and sink.
//! - It is bound to a [`CancellationToken`]; cancellation is observed at every sleep,
//!   so no emitter outlives the phase that owns it.
//! - The number of lines written is the task's return value; nothing is shared.

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::clients::LineSink;
use crate::events::{Bus, Event, EventKind};

/// What each emitted line looks like.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// The same line every cycle.
    Fixed(String),
    /// `prefix` followed by the 0-based cycle index.
    Numbered(String),
}

impl Line {
    fn render(&self, index: u64) -> String {
        match self {
            Line::Fixed(line) => line.clone(),
            Line::Numbered(prefix) => format!("{prefix}{index}"),
        }
    }
}

/// Fire-and-forget line writer bound to a cancellation token.
pub struct Emitter {
    sink: Arc<dyn LineSink>,
    line: Line,
    cycles: Option<u64>,
    delay: Duration,
    warmup: Duration,
}

impl Emitter {
    /// Writes `line` exactly `cycles` times, sleeping `delay` after each write.
    pub fn bounded(sink: Arc<dyn LineSink>, line: Line, cycles: u64, delay: Duration) -> Self {
        Self {
            sink,
            line,
            cycles: Some(cycles),
            delay,
            warmup: Duration::ZERO,
        }
    }

    /// Writes `line` every `delay` until cancelled.
    pub fn repeating(sink: Arc<dyn LineSink>, line: Line, delay: Duration) -> Self {
        Self {
            sink,
            line,
            cycles: None,
            delay,
            warmup: Duration::ZERO,
        }
    }

    /// Waits `warmup` before the first write.
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    /// Spawns the loop; the handle resolves to the number of lines written.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<u64> {
        tokio::spawn(self.run(token))
    }

    async fn run(self, token: CancellationToken) -> u64 {
        if !self.warmup.is_zero() {
            select! {
                _ = time::sleep(self.warmup) => {}
                _ = token.cancelled() => return 0,
            }
        }

        let mut written: u64 = 0;
        while self.cycles.is_none_or(|cycles| written < cycles) {
            if token.is_cancelled() {
                break;
            }
            self.sink.write_line(&self.line.render(written));
            written += 1;

            select! {
                _ = time::sleep(self.delay) => {}
                _ = token.cancelled() => break,
            }
        }
        written
    }
}

/// Awaits a stopped emitter and returns how many lines it wrote.
///
/// A panicked emitter is published as `EmitterFailed` and counts as zero lines.
pub(crate) async fn join(handle: JoinHandle<u64>, bus: &Bus, subject: &str) -> u64 {
    match handle.await {
        Ok(written) => written,
        Err(err) => {
            bus.publish(
                Event::new(EventKind::EmitterFailed)
                    .with_subject(subject)
                    .with_reason(err.to_string()),
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl LineSink for Recorder {
        fn write_line(&self, line: &str) {
            self.0.lock().unwrap().push(line.to_string());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_writes_exactly_cycles_lines() {
        let sink = Arc::new(Recorder::default());
        let emitter = Emitter::bounded(
            sink.clone(),
            Line::Fixed("p-1 - TEST".into()),
            5,
            Duration::from_millis(10),
        );

        let written = emitter.spawn(CancellationToken::new()).await.unwrap();

        assert_eq!(written, 5);
        assert_eq!(*sink.0.lock().unwrap(), vec!["p-1 - TEST".to_string(); 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn numbered_lines_carry_their_index() {
        let sink = Arc::new(Recorder::default());
        let emitter = Emitter::bounded(
            sink.clone(),
            Line::Numbered("123 - ".into()),
            3,
            Duration::from_millis(1),
        );

        emitter.spawn(CancellationToken::new()).await.unwrap();

        assert_eq!(*sink.0.lock().unwrap(), ["123 - 0", "123 - 1", "123 - 2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_a_repeating_emitter() {
        let sink = Arc::new(Recorder::default());
        let token = CancellationToken::new();
        let handle = Emitter::repeating(
            sink.clone(),
            Line::Fixed("primer".into()),
            Duration::from_secs(1),
        )
        .spawn(token.clone());

        time::sleep(Duration::from_millis(2500)).await;
        token.cancel();
        let written = handle.await.unwrap();

        assert_eq!(written, 3);
        assert_eq!(sink.0.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_during_warmup_writes_nothing() {
        let sink = Arc::new(Recorder::default());
        let token = CancellationToken::new();
        let handle = Emitter::bounded(sink.clone(), Line::Fixed("x".into()), 10, Duration::ZERO)
            .with_warmup(Duration::from_secs(20))
            .spawn(token.clone());

        time::sleep(Duration::from_secs(1)).await;
        token.cancel();

        assert_eq!(handle.await.unwrap(), 0);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    struct Broken;

    impl LineSink for Broken {
        fn write_line(&self, _line: &str) {
            panic!("sink closed");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn panicked_emitter_is_published() {
        let bus = Bus::new(16);
        let mut events = bus.subscribe();
        let handle = Emitter::bounded(Arc::new(Broken), Line::Fixed("x".into()), 3, Duration::ZERO)
            .spawn(CancellationToken::new());

        assert_eq!(join(handle, &bus, "p-1").await, 0);

        let ev = events.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::EmitterFailed);
        assert_eq!(ev.subject.as_deref(), Some("p-1"));
        assert!(ev.reason.as_deref().is_some_and(|r| r.contains("panicked")));
    }
}
