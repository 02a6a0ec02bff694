//! Core types for dataset-dl

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// A single input record for a collection job: string keys to string values
///
/// What the keys mean is owned by the target dataset (a scrape job typically
/// takes `url`, a discovery job takes search filters like `location`).
pub type InputRecord = BTreeMap<String, String>;

/// An opaque result record as returned by the remote service
///
/// The schema is owned by the service; the library never validates it.
pub type ResultRecord = serde_json::Value;

/// Opaque identifier for a submitted collection job
///
/// The remote service calls a finished job's retrievable output a
/// "snapshot"; the id issued at trigger time identifies exactly one job for
/// the lifetime of a run.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Create a new SnapshotId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SnapshotId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote job status as reported by the progress endpoint
///
/// `Ready` is the only success-terminal status. `Failed` and `Error` are
/// failure-terminal. Everything else, including `Unknown`, keeps the poll
/// loop running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, waiting to start
    Queued,
    /// Collection in progress
    Running,
    /// Completed, snapshot is retrievable
    Ready,
    /// The service reported the job as failed
    Failed,
    /// The service reported an error
    Error,
    /// Unrecognized status value, or the status check itself failed
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether no further transition can occur from this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Failed | JobStatus::Error)
    }

    /// Whether this is the success-terminal status
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Ready)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Ready => "ready",
            JobStatus::Failed => "failed",
            JobStatus::Error => "error",
            JobStatus::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Outcome of one successful end-to-end collection run
#[derive(Clone, Debug)]
pub struct CollectionOutcome {
    /// The snapshot id the run collected
    pub snapshot_id: SnapshotId,
    /// Number of result records persisted
    pub records: usize,
    /// Wall-clock time from submission to terminal status
    pub elapsed: Duration,
}

/// Aggregate result of running a batch of independent collection jobs
///
/// A failed run never aborts the batch; it is counted and reported here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Runs attempted
    pub attempted: usize,
    /// Runs that completed end-to-end
    pub succeeded: usize,
    /// Total result records persisted across successful runs
    pub records_collected: usize,
}
