//! Collection orchestrator split into focused submodules.
//!
//! The [`Collector`] struct and its methods are organized by workflow stage:
//! - [`submit`] - Input cleaning and job triggering
//! - [`poll`] - Terminal-status wait loop
//! - [`fetch`] - Snapshot retrieval
//!
//! One `collect` call drives exactly one remote job through
//! submit → poll → fetch → persist, short-circuiting on the first failing
//! stage. The collector holds no cross-run state, so a single instance can
//! serve any number of concurrent runs as long as their destinations
//! differ.

mod fetch;
mod poll;
mod submit;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::backoff::BackoffPolicy;
use crate::clock::{Clock, TokioClock};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::sink::JsonFileSink;
use crate::transport::{HttpTransport, Transport};
use crate::types::{BatchSummary, CollectionOutcome, InputRecord, JobStatus, SnapshotId};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// One unit of collection work: what to collect and where to put it
#[derive(Clone, Debug)]
pub struct CollectionJob {
    /// Target dataset adapter
    pub dataset: Dataset,
    /// Input records to submit (cleaned before submission)
    pub inputs: Vec<InputRecord>,
    /// Destination file for the fetched result set
    ///
    /// Concurrent runs must use distinct destinations; the sink does not
    /// arbitrate between writers on the same path.
    pub destination: PathBuf,
}

/// State of one in-flight collection run, owned by the orchestrator
///
/// Created after a successful submission, discarded when the run ends.
pub(crate) struct CollectionRun {
    pub(crate) snapshot_id: SnapshotId,
    started: Instant,
    last_status: Option<JobStatus>,
    pub(crate) same_status_polls: u32,
}

impl CollectionRun {
    fn new(snapshot_id: SnapshotId, started: Instant) -> Self {
        Self {
            snapshot_id,
            started,
            last_status: None,
            same_status_polls: 0,
        }
    }

    /// Record a status observation; returns true when the status changed
    /// since the previous poll
    pub(crate) fn observe(&mut self, status: JobStatus) -> bool {
        if self.last_status == Some(status) {
            self.same_status_polls += 1;
            false
        } else {
            self.last_status = Some(status);
            self.same_status_polls = 0;
            true
        }
    }

    pub(crate) fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }
}

/// Async dataset collection client
///
/// Submits a batch of inputs to the collection API, polls the resulting
/// job until a terminal status, fetches the finished snapshot, and
/// persists it as JSON. Construction requires the bearer credential; a
/// missing credential fails here, never mid-run.
///
/// Cloneable — all collaborators are `Arc`-wrapped — and safe to use from
/// several concurrent runs: no method takes `&mut self` and no state is
/// shared between runs.
#[derive(Clone)]
pub struct Collector {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: Arc<Config>,
    pub(crate) backoff: BackoffPolicy,
    sink: JsonFileSink,
    pub(crate) cancel: CancellationToken,
}

impl Collector {
    /// Create a collector that talks to `config.api_base_url` with the
    /// given bearer credential
    ///
    /// Fails with [`Error::Config`] if the token is blank or the base URL
    /// does not parse.
    pub fn new(api_token: impl Into<String>, config: Config) -> Result<Self> {
        let transport =
            HttpTransport::new(api_token, &config.api_base_url, config.request_timeout)?;
        Ok(Self::from_parts(Arc::new(transport), Arc::new(TokioClock), config))
    }

    /// Assemble a collector from explicit collaborators
    ///
    /// The seam for tests and for embedders with a custom transport (e.g. a
    /// proxied client) or clock.
    pub fn from_parts(
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Self {
        let backoff = BackoffPolicy::new(&config.retry, &config.poll);
        let sink = JsonFileSink::new(config.sink.backup_existing);
        Self {
            transport,
            clock,
            config: Arc::new(config),
            backoff,
            sink,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that cancels in-flight runs between poll iterations
    ///
    /// Cancellation never interrupts a request mid-flight; the run returns
    /// [`Error::Cancelled`] at the next iteration boundary and nothing is
    /// persisted.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drive one collection job end to end
    ///
    /// Stages run strictly in sequence and the first failure
    /// short-circuits the rest. On success the destination file holds the
    /// fetched result set.
    pub async fn collect(&self, job: &CollectionJob) -> Result<CollectionOutcome> {
        let started = self.clock.now();
        tracing::info!(
            dataset = %job.dataset.id(),
            inputs = job.inputs.len(),
            "starting collection"
        );

        let snapshot_id = self.submit(&job.dataset, &job.inputs).await?;
        tracing::info!(snapshot_id = %snapshot_id, "collection job submitted");

        let mut run = CollectionRun::new(snapshot_id, started);
        self.wait_for_terminal(&mut run).await?;

        let elapsed = run.elapsed(self.clock.now());
        tracing::info!(
            snapshot_id = %run.snapshot_id,
            elapsed_secs = elapsed.as_secs(),
            "collection completed, fetching results"
        );

        let records = self.fetch(&run.snapshot_id).await?;

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if let Err(e) = self.sink.persist(&records, &job.destination) {
            // The results were already obtained; log enough to recover them
            // by re-fetching the snapshot manually.
            tracing::error!(
                snapshot_id = %run.snapshot_id,
                records = records.len(),
                destination = %job.destination.display(),
                error = %e,
                "persist failed after results were fetched; snapshot remains retrievable"
            );
            return Err(e.into());
        }

        Ok(CollectionOutcome {
            snapshot_id: run.snapshot_id,
            records: records.len(),
            elapsed,
        })
    }

    /// Run one collection job, reporting success as a boolean
    ///
    /// The catch-all boundary: every failure is logged with its cause and
    /// converted to `false`; nothing propagates out.
    pub async fn run(&self, job: &CollectionJob) -> bool {
        self.run_logged(job).await.is_some()
    }

    /// Run several independent collection jobs sequentially
    ///
    /// A failed run is logged and counted but never aborts the batch. The
    /// summary reports runs attempted and succeeded plus total records
    /// persisted.
    pub async fn run_batch(&self, jobs: &[CollectionJob]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for job in jobs {
            summary.attempted += 1;
            if let Some(outcome) = self.run_logged(job).await {
                summary.succeeded += 1;
                summary.records_collected += outcome.records;
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            records_collected = summary.records_collected,
            "batch finished"
        );
        summary
    }

    async fn run_logged(&self, job: &CollectionJob) -> Option<CollectionOutcome> {
        match self.collect(job).await {
            Ok(outcome) => {
                tracing::info!(
                    dataset = %job.dataset.id(),
                    snapshot_id = %outcome.snapshot_id,
                    records = outcome.records,
                    elapsed_secs = outcome.elapsed.as_secs(),
                    destination = %job.destination.display(),
                    "collection run succeeded"
                );
                Some(outcome)
            }
            Err(e) => {
                tracing::error!(
                    dataset = %job.dataset.id(),
                    error = %e,
                    "collection run failed"
                );
                None
            }
        }
    }
}
