//! Terminal-status wait loop.
//!
//! The loop is unbounded in wall-clock time — a remote job may take
//! minutes or hours — but every iteration makes exactly one status query,
//! so it cannot spin. A status check that fails at the transport level is
//! recorded as `Unknown` and polling continues; the terminal outcome is
//! decided solely by what the remote service eventually reports.

use super::{CollectionRun, Collector};
use crate::error::{Error, Result};
use crate::transport::ApiRequest;
use crate::types::JobStatus;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ProgressResponse {
    #[serde(default)]
    status: Option<JobStatus>,
}

impl Collector {
    /// Poll the job's progress endpoint until a terminal status
    ///
    /// Returns `Ok(())` when the job reaches `ready`; a remote-reported
    /// `failed`/`error` becomes [`Error::JobFailed`] with the elapsed time.
    /// Cancellation is honored between iterations, never mid-request.
    pub(crate) async fn wait_for_terminal(&self, run: &mut CollectionRun) -> Result<()> {
        let mut last_progress_log = self.clock.now();

        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let request = ApiRequest::get(format!("progress/{}", run.snapshot_id), vec![]);
            let status = match self.transport.send(request).await {
                Ok(body) => parse_status(body),
                Err(e) => {
                    // A single bad read never aborts the run.
                    tracing::warn!(
                        snapshot_id = %run.snapshot_id,
                        error = %e,
                        "status check failed, continuing to poll"
                    );
                    JobStatus::Unknown
                }
            };

            let now = self.clock.now();
            let elapsed = run.elapsed(now);

            if run.observe(status) {
                tracing::info!(
                    snapshot_id = %run.snapshot_id,
                    status = %status,
                    elapsed_secs = elapsed.as_secs(),
                    "job status changed"
                );
            } else if now.saturating_duration_since(last_progress_log)
                >= self.config.poll.progress_interval
            {
                tracing::info!(
                    snapshot_id = %run.snapshot_id,
                    status = %status,
                    elapsed_secs = elapsed.as_secs(),
                    same_status_polls = run.same_status_polls,
                    "still processing"
                );
                last_progress_log = now;
            }

            match status {
                JobStatus::Ready => return Ok(()),
                JobStatus::Failed | JobStatus::Error => {
                    return Err(Error::JobFailed {
                        id: run.snapshot_id.clone(),
                        status,
                        elapsed,
                    });
                }
                JobStatus::Queued | JobStatus::Running | JobStatus::Unknown => {}
            }

            tokio::select! {
                _ = self.clock.sleep(self.backoff.poll_interval()) => {}
                _ = self.cancel.cancelled() => return Err(Error::Cancelled),
            }
        }
    }
}

/// Map a progress body to a status; anything malformed is `Unknown`
fn parse_status(body: serde_json::Value) -> JobStatus {
    serde_json::from_value::<ProgressResponse>(body)
        .ok()
        .and_then(|progress| progress.status)
        .unwrap_or(JobStatus::Unknown)
}
