//! Job submission: input cleaning and the trigger call.

use super::Collector;
use crate::backoff::retry_with_backoff;
use crate::dataset::Dataset;
use crate::error::{Result, SubmitError, TransportError};
use crate::types::{InputRecord, SnapshotId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TriggerResponse {
    #[serde(default)]
    snapshot_id: Option<String>,
}

impl Collector {
    /// Submit `inputs` to the dataset's trigger endpoint and return the
    /// issued snapshot id
    ///
    /// Inputs are cleaned first; if nothing survives, the submission fails
    /// fast without touching the network. Rate-limited trigger calls are
    /// retried with exponential backoff up to the configured attempt
    /// count; all other transport failures abort on first occurrence.
    pub(crate) async fn submit(
        &self,
        dataset: &Dataset,
        inputs: &[InputRecord],
    ) -> Result<SnapshotId> {
        let cleaned = clean_inputs(inputs, dataset.required_field());
        if cleaned.is_empty() {
            return Err(SubmitError::NoValidInputs.into());
        }

        let dropped = inputs.len() - cleaned.len();
        if dropped > 0 {
            tracing::warn!(
                dropped,
                required_field = dataset.required_field(),
                "dropped input records with a blank required field"
            );
        }

        let request = dataset.trigger_request(&cleaned);
        let max_attempts = self.config.retry.max_attempts;

        let body = retry_with_backoff(&self.backoff, &*self.clock, max_attempts, || {
            self.transport.send(request.clone())
        })
        .await
        .map_err(|e| match e {
            TransportError::RateLimited => SubmitError::RetriesExhausted {
                attempts: max_attempts,
            },
            other => SubmitError::Transport(other),
        })?;

        // A 2xx response without a snapshot id is a malformed success, not
        // a started job.
        let trigger: TriggerResponse =
            serde_json::from_value(body).map_err(|_| SubmitError::MissingSnapshotId)?;
        match trigger.snapshot_id {
            Some(id) if !id.trim().is_empty() => Ok(SnapshotId::new(id)),
            _ => Err(SubmitError::MissingSnapshotId.into()),
        }
    }
}

/// Drop blank-valued keys from each record, then drop records whose
/// required field is absent or whitespace-only
pub(crate) fn clean_inputs(inputs: &[InputRecord], required_field: &str) -> Vec<InputRecord> {
    inputs
        .iter()
        .filter_map(|record| {
            let cleaned: InputRecord = record
                .iter()
                .filter(|(_, value)| !value.trim().is_empty())
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();

            cleaned
                .contains_key(required_field)
                .then_some(cleaned)
        })
        .collect()
}
