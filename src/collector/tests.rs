//! Collector unit tests against a scripted transport and a virtual clock.
//!
//! No test here sleeps wall-clock time: the virtual clock advances by the
//! requested duration instantly and records every suspension, so delay
//! sequences are asserted exactly.

use super::*;
use crate::clock::Clock;
use crate::error::{Error, SubmitError, TransportError};
use crate::transport::{ApiRequest, Transport};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::result::Result;
use std::sync::Mutex;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Clock whose sleeps advance virtual time instantly and are recorded
struct VirtualClock {
    base: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl VirtualClock {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        })
    }

    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        *self.offset.lock().unwrap() += duration;
    }
}

/// Transport that replays a scripted response sequence and records requests
struct StubTransport {
    responses: Mutex<VecDeque<Result<serde_json::Value, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    fn scripted(
        responses: Vec<Result<serde_json::Value, TransportError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn requests_with_path_prefix(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .count()
    }

    fn request(&self, index: usize) -> ApiRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport called more times than the script allows")
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record(pairs: &[(&str, &str)]) -> InputRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<BTreeMap<_, _>>()
}

fn test_collector(transport: Arc<StubTransport>, clock: Arc<VirtualClock>) -> Collector {
    Collector::from_parts(transport, clock, Config::default())
}

/// A job writing into a fresh temp dir; the dir guard keeps it alive
fn test_job(inputs: Vec<InputRecord>) -> (CollectionJob, TempDir) {
    let dir = TempDir::new().unwrap();
    let job = CollectionJob {
        dataset: Dataset::new("gd_test"),
        inputs,
        destination: dir.path().join("results.json"),
    };
    (job, dir)
}

fn trigger_ok(id: &str) -> Result<serde_json::Value, TransportError> {
    Ok(serde_json::json!({"snapshot_id": id}))
}

fn progress(status: &str) -> Result<serde_json::Value, TransportError> {
    Ok(serde_json::json!({"status": status}))
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn all_blank_inputs_fail_without_any_transport_call() {
    let transport = StubTransport::scripted(vec![]);
    let collector = test_collector(transport.clone(), VirtualClock::new());
    let (job, _dir) = test_job(vec![record(&[("url", "")]), record(&[("url", "   ")])]);

    let result = collector.collect(&job).await;

    assert!(matches!(
        result,
        Err(Error::Submit(SubmitError::NoValidInputs))
    ));
    assert_eq!(transport.request_count(), 0, "no network call may be made");
}

#[tokio::test]
async fn submission_sends_cleaned_inputs_only() {
    let transport = StubTransport::scripted(vec![
        trigger_ok("s_1"),
        progress("ready"),
        Ok(serde_json::json!([])),
    ]);
    let collector = test_collector(transport.clone(), VirtualClock::new());
    let (job, _dir) = test_job(vec![
        record(&[("url", "https://a"), ("comment", " ")]),
        record(&[("url", "")]),
    ]);

    collector.collect(&job).await.unwrap();

    let body = transport.request(0).body.unwrap();
    assert_eq!(
        body,
        serde_json::json!([{"url": "https://a"}]),
        "blank-valued keys and invalid records must not reach the wire"
    );
}

#[tokio::test]
async fn rate_limited_trigger_attempts_exactly_three_times_with_doubling_delays() {
    let transport = StubTransport::scripted(vec![
        Err(TransportError::RateLimited),
        Err(TransportError::RateLimited),
        Err(TransportError::RateLimited),
    ]);
    let clock = VirtualClock::new();
    let collector = test_collector(transport.clone(), clock.clone());
    let (job, _dir) = test_job(vec![record(&[("url", "https://a")])]);

    let result = collector.collect(&job).await;

    match result {
        Err(Error::Submit(SubmitError::RetriesExhausted { attempts })) => {
            assert_eq!(attempts, 3)
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    assert_eq!(transport.request_count(), 3);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(2), Duration::from_secs(4)],
        "backoff must wait 2^1 then 2^2 base units, with no delay after the final attempt"
    );
}

#[tokio::test]
async fn non_rate_limit_trigger_failure_is_not_retried() {
    let transport = StubTransport::scripted(vec![Err(TransportError::Http {
        status: 500,
        body: "boom".into(),
    })]);
    let collector = test_collector(transport.clone(), VirtualClock::new());
    let (job, _dir) = test_job(vec![record(&[("url", "https://a")])]);

    let result = collector.collect(&job).await;

    assert!(matches!(
        result,
        Err(Error::Submit(SubmitError::Transport(TransportError::Http { status: 500, .. })))
    ));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn trigger_success_without_snapshot_id_is_a_submission_failure() {
    let transport = StubTransport::scripted(vec![Ok(serde_json::json!({"ok": true}))]);
    let collector = test_collector(transport.clone(), VirtualClock::new());
    let (job, _dir) = test_job(vec![record(&[("url", "https://a")])]);

    let result = collector.collect(&job).await;

    assert!(matches!(
        result,
        Err(Error::Submit(SubmitError::MissingSnapshotId))
    ));
    assert_eq!(
        transport.request_count(),
        1,
        "a malformed success must not be polled"
    );
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn success_path_polls_until_ready_then_fetches_and_persists() {
    let transport = StubTransport::scripted(vec![
        trigger_ok("abc123"),
        progress("queued"),
        progress("running"),
        progress("running"),
        progress("ready"),
        Ok(serde_json::json!([{"zpid": 1}])),
    ]);
    let clock = VirtualClock::new();
    let collector = test_collector(transport.clone(), clock.clone());
    let (job, _dir) = test_job(vec![record(&[("location", "92027")])]);
    let job = CollectionJob {
        dataset: Dataset::new("gd_test").primary_field("location"),
        ..job
    };

    let outcome = collector.collect(&job).await.unwrap();

    assert_eq!(outcome.snapshot_id.as_str(), "abc123");
    assert_eq!(outcome.records, 1);
    assert_eq!(transport.requests_with_path_prefix("progress/abc123"), 4);
    assert_eq!(transport.requests_with_path_prefix("snapshot/abc123"), 1);

    // Three non-terminal observations, one poll-interval suspension each
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(5); 3]);
    assert_eq!(outcome.elapsed, Duration::from_secs(15));

    let persisted: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&job.destination).unwrap()).unwrap();
    assert_eq!(persisted, serde_json::json!([{"zpid": 1}]));
}

#[tokio::test]
async fn remote_failure_aborts_without_fetch_or_persist() {
    let transport = StubTransport::scripted(vec![
        trigger_ok("abc123"),
        progress("queued"),
        progress("failed"),
    ]);
    let collector = test_collector(transport.clone(), VirtualClock::new());
    let (job, _dir) = test_job(vec![record(&[("url", "https://a")])]);

    let result = collector.collect(&job).await;

    match result {
        Err(Error::JobFailed { id, status, elapsed }) => {
            assert_eq!(id.as_str(), "abc123");
            assert_eq!(status, JobStatus::Failed);
            assert_eq!(elapsed, Duration::from_secs(5));
        }
        other => panic!("expected JobFailed, got {other:?}"),
    }
    assert_eq!(transport.requests_with_path_prefix("snapshot/"), 0);
    assert!(!job.destination.exists(), "nothing may be persisted");
}

#[tokio::test]
async fn transient_status_check_failure_keeps_polling() {
    let transport = StubTransport::scripted(vec![
        trigger_ok("abc123"),
        Err(TransportError::Timeout(Duration::from_secs(30))),
        progress("ready"),
        Ok(serde_json::json!([])),
    ]);
    let collector = test_collector(transport.clone(), VirtualClock::new());
    let (job, _dir) = test_job(vec![record(&[("url", "https://a")])]);

    let outcome = collector.collect(&job).await.unwrap();

    assert_eq!(outcome.records, 0);
    assert_eq!(
        transport.requests_with_path_prefix("progress/"),
        2,
        "the failed check must be followed by another poll"
    );
}

#[tokio::test]
async fn unrecognized_status_values_are_non_terminal() {
    let transport = StubTransport::scripted(vec![
        trigger_ok("abc123"),
        progress("collecting"),
        progress("ready"),
        Ok(serde_json::json!([])),
    ]);
    let collector = test_collector(transport.clone(), VirtualClock::new());
    let (job, _dir) = test_job(vec![record(&[("url", "https://a")])]);

    assert!(collector.collect(&job).await.is_ok());
}

#[tokio::test]
async fn fetch_failure_is_distinguished_from_job_failure() {
    let transport = StubTransport::scripted(vec![
        trigger_ok("abc123"),
        progress("ready"),
        Err(TransportError::Http {
            status: 500,
            body: "snapshot unavailable".into(),
        }),
    ]);
    let collector = test_collector(transport.clone(), VirtualClock::new());
    let (job, _dir) = test_job(vec![record(&[("url", "https://a")])]);

    let result = collector.collect(&job).await;

    match result {
        Err(Error::Fetch { id, .. }) => assert_eq!(id.as_str(), "abc123"),
        other => panic!("expected Fetch error, got {other:?}"),
    }
    assert!(!job.destination.exists());
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancellation_stops_the_poll_loop_and_persists_nothing() {
    let transport = StubTransport::scripted(vec![trigger_ok("abc123")]);
    let collector = test_collector(transport.clone(), VirtualClock::new());
    collector.cancellation_token().cancel();
    let (job, _dir) = test_job(vec![record(&[("url", "https://a")])]);

    let result = collector.collect(&job).await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(
        transport.requests_with_path_prefix("progress/"),
        0,
        "cancellation is honored before the next status query"
    );
    assert!(!job.destination.exists());
}

// ---------------------------------------------------------------------------
// Run boundary and batches
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_converts_failures_to_false() {
    let transport = StubTransport::scripted(vec![
        trigger_ok("abc123"),
        progress("failed"),
    ]);
    let collector = test_collector(transport, VirtualClock::new());
    let (job, _dir) = test_job(vec![record(&[("url", "https://a")])]);

    assert!(!collector.run(&job).await);
}

#[tokio::test]
async fn run_returns_true_on_end_to_end_success() {
    let transport = StubTransport::scripted(vec![
        trigger_ok("abc123"),
        progress("ready"),
        Ok(serde_json::json!([{"zpid": 1}])),
    ]);
    let collector = test_collector(transport, VirtualClock::new());
    let (job, _dir) = test_job(vec![record(&[("url", "https://a")])]);

    assert!(collector.run(&job).await);
}

#[tokio::test]
async fn batch_continues_past_failures_and_aggregates_counts() {
    let transport = StubTransport::scripted(vec![
        // First job fails remotely
        trigger_ok("s_1"),
        progress("error"),
        // Second job succeeds with two records
        trigger_ok("s_2"),
        progress("ready"),
        Ok(serde_json::json!([{"zpid": 1}, {"zpid": 2}])),
    ]);
    let collector = test_collector(transport, VirtualClock::new());
    let (job_a, _dir_a) = test_job(vec![record(&[("url", "https://a")])]);
    let (job_b, _dir_b) = test_job(vec![record(&[("url", "https://b")])]);

    let summary = collector.run_batch(&[job_a, job_b.clone()]).await;

    assert_eq!(
        summary,
        BatchSummary {
            attempted: 2,
            succeeded: 1,
            records_collected: 2,
        }
    );
    assert!(job_b.destination.exists());
}

// ---------------------------------------------------------------------------
// CollectionRun bookkeeping
// ---------------------------------------------------------------------------

#[test]
fn observe_counts_repeats_and_resets_on_change() {
    let mut run = CollectionRun::new(SnapshotId::new("s_1"), Instant::now());

    assert!(run.observe(JobStatus::Queued), "first observation is a change");
    assert!(!run.observe(JobStatus::Queued));
    assert!(!run.observe(JobStatus::Queued));
    assert_eq!(run.same_status_polls, 2);

    assert!(run.observe(JobStatus::Running));
    assert_eq!(run.same_status_polls, 0, "counter resets on change");
}
