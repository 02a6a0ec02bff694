//! Error types for dataset-dl
//!
//! This module provides the error taxonomy for the library:
//! - Domain-specific sub-errors (`TransportError`, `SubmitError`, `PersistError`)
//! - A top-level [`Error`] that marks where in the collection workflow a run died
//! - Context information (snapshot id, terminal status, elapsed time)

use crate::types::{JobStatus, SnapshotId};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for dataset-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for dataset-dl
///
/// Each variant corresponds to one stage of the collection workflow, so a
/// caller can tell whether a failed run never started a remote job
/// ([`Error::Submit`]), lost a job the remote service reported as failed
/// ([`Error::JobFailed`]), or lost an already-completed result
/// ([`Error::Fetch`], [`Error::Persist`]).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api_token")
        key: Option<String>,
    },

    /// Job submission failed; no remote job was started
    #[error("submission failed: {0}")]
    Submit(#[from] SubmitError),

    /// The remote service reported a terminal failure status for the job
    #[error("job {id} ended with status {status} after {elapsed:?}")]
    JobFailed {
        /// The snapshot id of the failed job
        id: SnapshotId,
        /// The terminal status the service reported (`failed` or `error`)
        status: JobStatus,
        /// Wall-clock time from submission to the terminal observation
        elapsed: Duration,
    },

    /// The job completed but its result could not be retrieved
    ///
    /// Distinct from [`Error::JobFailed`]: the remote job itself succeeded,
    /// so the result may still be recoverable by re-fetching the snapshot.
    #[error("failed to fetch results for job {id}: {source}")]
    Fetch {
        /// The snapshot id whose results were lost
        id: SnapshotId,
        /// The underlying transport failure
        #[source]
        source: TransportError,
    },

    /// Persisting an already-fetched result set failed
    #[error("persist failed: {0}")]
    Persist(#[from] PersistError),

    /// The run was cancelled between poll iterations
    #[error("collection cancelled")]
    Cancelled,
}

/// Submission-stage errors
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Input cleaning removed every record; nothing to submit
    #[error("no valid input records after cleaning")]
    NoValidInputs,

    /// The trigger response was 2xx but carried no snapshot id
    #[error("trigger response did not contain a snapshot id")]
    MissingSnapshotId,

    /// Rate-limit retries were exhausted without a successful trigger
    #[error("trigger rate-limited, gave up after {attempts} attempts")]
    RetriesExhausted {
        /// Total trigger attempts made
        attempts: u32,
    },

    /// A non-retryable transport failure during the trigger call
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Transport-level failure classification
///
/// Produced by a single request/response exchange. Retry decisions are made
/// by callers, never at this layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request exceeded the per-call timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP 429 from the service
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    /// Any other non-2xx HTTP response
    #[error("HTTP {status}: {body}")]
    Http {
        /// The HTTP status code
        status: u16,
        /// The response body, for diagnostics
        body: String,
    },

    /// Network-level failure (DNS, connection reset, TLS)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response whose body was not the expected JSON shape
    #[error("invalid response body: {0}")]
    Body(#[from] serde_json::Error),
}

/// Persistence errors
#[derive(Debug, Error)]
pub enum PersistError {
    /// Writing the destination file failed
    #[error("failed to write {path}: {source}")]
    Io {
        /// The destination that could not be written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serializing the result set failed
    #[error("failed to serialize result set: {0}")]
    Serialization(#[from] serde_json::Error),
}
