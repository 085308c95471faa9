//! Fakes shared by the unit tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::clients::{
    Authenticator, ConsumerGateway, LineSink, Orchestrator, Reporter, ShardGroupClient,
    SourceProvider, Subscription,
};
use crate::error::{ClientError, StreamError};
use crate::model::{Envelope, Resource, SchedulingPlan, TrialResult};

/// Which written lines come back on the stream.
#[derive(Clone, Copy, Default)]
struct Delivery {
    primers: bool,
    /// Deliver at most this many test lines (`None` = all).
    tests: Option<u64>,
    /// Raise a stream fault instead of delivering test line `n + 1`.
    fail_after_tests: Option<u64>,
}

/// Gateway whose line sink feeds written lines back into the subscription.
pub(crate) struct Loopback {
    messages: mpsc::Sender<Envelope>,
    errors: mpsc::Sender<StreamError>,
    subscription: Mutex<Option<Subscription>>,
    delivery: Delivery,
    tests_seen: AtomicU64,
    written: Mutex<Vec<String>>,
    subscribed_as: Mutex<Vec<String>>,
}

impl Loopback {
    fn with(delivery: Delivery) -> Arc<Self> {
        let (messages, msg_rx) = mpsc::channel(4096);
        let (errors, err_rx) = mpsc::channel(16);
        Arc::new(Self {
            messages,
            errors,
            subscription: Mutex::new(Some(Subscription::new(msg_rx, err_rx))),
            delivery,
            tests_seen: AtomicU64::new(0),
            written: Mutex::new(Vec::new()),
            subscribed_as: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn delivering_all() -> Arc<Self> {
        Self::with(Delivery {
            primers: true,
            ..Delivery::default()
        })
    }

    pub(crate) fn delivering_none() -> Arc<Self> {
        Self::with(Delivery {
            primers: false,
            tests: Some(0),
            fail_after_tests: None,
        })
    }

    /// Primers come back, then only the first `n` test lines.
    pub(crate) fn delivering_tests(n: u64) -> Arc<Self> {
        Self::with(Delivery {
            primers: true,
            tests: Some(n),
            fail_after_tests: None,
        })
    }

    /// Primers come back, `n` test lines come back, then the stream fails.
    pub(crate) fn failing_after_tests(n: u64) -> Arc<Self> {
        Self::with(Delivery {
            primers: true,
            tests: None,
            fail_after_tests: Some(n),
        })
    }

    pub(crate) fn take_subscription(&self) -> Subscription {
        self.subscription
            .lock()
            .unwrap()
            .take()
            .expect("subscription already taken")
    }

    pub(crate) fn fail(&self, err: StreamError) {
        self.errors.try_send(err).unwrap();
    }

    pub(crate) fn inject(&self, payload: &str) {
        self.messages
            .try_send(Envelope::log("noise", 0, payload))
            .unwrap();
    }

    pub(crate) fn written_containing(&self, needle: &str) -> usize {
        self.written
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.contains(needle))
            .count()
    }

    pub(crate) fn subscribed_as(&self) -> Vec<String> {
        self.subscribed_as.lock().unwrap().clone()
    }
}

impl LineSink for Loopback {
    fn write_line(&self, line: &str) {
        self.written.lock().unwrap().push(line.to_string());

        let deliver = if line.contains(" - PRIMER") {
            self.delivery.primers
        } else if line.contains(" - TEST") {
            let n = self.tests_seen.fetch_add(1, Ordering::SeqCst) + 1;
            if self.delivery.fail_after_tests.is_some_and(|k| n > k) {
                let _ = self.errors.try_send(StreamError::failed("connection reset"));
                false
            } else {
                self.delivery.tests.is_none_or(|max| n <= max)
            }
        } else {
            false
        };

        if deliver {
            let _ = self.messages.try_send(Envelope::log("app", 0, line));
        }
    }
}

#[async_trait]
impl ConsumerGateway for Loopback {
    async fn subscribe(
        &self,
        subscription_id: &str,
        _token: &str,
    ) -> Result<Subscription, StreamError> {
        self.subscribed_as
            .lock()
            .unwrap()
            .push(subscription_id.to_string());
        self.subscription
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| StreamError::failed("already subscribed"))
    }
}

pub(crate) struct StaticAuth(pub Result<String, ClientError>);

impl StaticAuth {
    pub(crate) fn ok() -> Arc<Self> {
        Arc::new(Self(Ok("bearer token".into())))
    }
}

#[async_trait]
impl Authenticator for StaticAuth {
    async fn token(&self) -> Result<String, ClientError> {
        self.0.clone()
    }
}

#[derive(Default)]
pub(crate) struct SpyReporter {
    pub(crate) reports: Mutex<Vec<TrialResult>>,
    pub(crate) fail: Option<ClientError>,
}

impl SpyReporter {
    pub(crate) fn reports(&self) -> Vec<TrialResult> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reporter for SpyReporter {
    async fn report(&self, result: &TrialResult) -> Result<(), ClientError> {
        self.reports.lock().unwrap().push(result.clone());
        match &self.fail {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Returns `script[n]` on the n-th call, repeating the last entry forever.
pub(crate) struct ScriptedProvider {
    script: Vec<Result<Vec<Resource>, ClientError>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub(crate) fn new(script: Vec<Result<Vec<Resource>, ClientError>>) -> Arc<Self> {
        assert!(!script.is_empty());
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceProvider for ScriptedProvider {
    async fn resources(&self) -> Result<Vec<Resource>, ClientError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.script[n.min(self.script.len() - 1)].clone()
    }
}

#[derive(Default)]
pub(crate) struct SpyOrchestrator {
    pub(crate) plans: Mutex<Vec<SchedulingPlan>>,
    pub(crate) terms: AtomicUsize,
    /// How long each term takes.
    pub(crate) term_duration: Duration,
}

impl SpyOrchestrator {
    pub(crate) fn plans(&self) -> Vec<SchedulingPlan> {
        self.plans.lock().unwrap().clone()
    }

    pub(crate) fn terms(&self) -> usize {
        self.terms.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Orchestrator for SpyOrchestrator {
    async fn update_tasks(&self, plan: SchedulingPlan) {
        self.plans.lock().unwrap().push(plan);
    }

    async fn next_term(&self) {
        if !self.term_duration.is_zero() {
            tokio::time::sleep(self.term_duration).await;
        }
        self.terms.fetch_add(1, Ordering::SeqCst);
    }
}

/// Log cache fake: lines written to it become readable once enough sources joined the group.
pub(crate) struct GroupLoopback {
    pub(crate) source_ids: Result<Vec<String>, ClientError>,
    /// Reads return nothing until this many distinct sources joined.
    pub(crate) ready_at: usize,
    /// Membership calls that fail before the first success.
    pub(crate) failing_sets: u64,
    /// Only the first `n` written lines are stored (`None` = all).
    pub(crate) keep_lines: Option<u64>,
    pub(crate) members: Mutex<HashSet<String>>,
    pub(crate) set_calls: AtomicU64,
    pub(crate) lines: Mutex<Vec<Envelope>>,
    pub(crate) written: AtomicU64,
}

impl GroupLoopback {
    pub(crate) fn new(source_ids: &[&str]) -> Self {
        Self {
            source_ids: Ok(source_ids.iter().map(|s| s.to_string()).collect()),
            ready_at: 0,
            failing_sets: 0,
            keep_lines: None,
            members: Mutex::new(HashSet::new()),
            set_calls: AtomicU64::new(0),
            lines: Mutex::new(Vec::new()),
            written: AtomicU64::new(0),
        }
    }

    pub(crate) fn members(&self) -> HashSet<String> {
        self.members.lock().unwrap().clone()
    }
}

fn now_ns() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}

impl LineSink for GroupLoopback {
    fn write_line(&self, line: &str) {
        let n = self.written.fetch_add(1, Ordering::SeqCst);
        if self.keep_lines.is_some_and(|keep| n >= keep) {
            return;
        }
        let mut lines = self.lines.lock().unwrap();
        let ts = lines
            .last()
            .map_or(now_ns(), |last| now_ns().max(last.timestamp_ns + 1));
        lines.push(Envelope::log("self", ts, line));
    }
}

#[async_trait]
impl ShardGroupClient for GroupLoopback {
    async fn source_ids(&self) -> Result<Vec<String>, ClientError> {
        self.source_ids.clone()
    }

    async fn set_shard_group(&self, _group: &str, source_id: &str) -> Result<(), ClientError> {
        let n = self.set_calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failing_sets {
            return Err(ClientError::request("unavailable"));
        }
        self.members.lock().unwrap().insert(source_id.to_string());
        Ok(())
    }

    async fn read(
        &self,
        _group: &str,
        _requester_id: u64,
        start_ns: i64,
    ) -> Result<Vec<Envelope>, ClientError> {
        if self.members.lock().unwrap().len() < self.ready_at {
            return Ok(Vec::new());
        }
        Ok(self
            .lines
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.timestamp_ns >= start_ns)
            .take(100)
            .cloned()
            .collect())
    }
}
