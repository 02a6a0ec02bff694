//! Snapshot retrieval once a job reaches its success-terminal status.

use super::Collector;
use crate::error::{Error, Result, TransportError};
use crate::transport::ApiRequest;
use crate::types::{ResultRecord, SnapshotId};
use serde::de::Error as _;

impl Collector {
    /// Fetch the finished job's result set in structured JSON form
    ///
    /// A single request with no retry: the job already succeeded, so any
    /// failure here is a lost result the caller distinguishes from a
    /// failed job. The snapshot stays retrievable on the service side.
    pub(crate) async fn fetch(&self, id: &SnapshotId) -> Result<Vec<ResultRecord>> {
        let request = ApiRequest::get(
            format!("snapshot/{id}"),
            vec![("format".to_string(), "json".to_string())],
        );

        let body = self
            .transport
            .send(request)
            .await
            .map_err(|source| Error::Fetch {
                id: id.clone(),
                source,
            })?;

        match body {
            serde_json::Value::Array(records) => {
                tracing::debug!(snapshot_id = %id, records = records.len(), "fetched result set");
                Ok(records)
            }
            other => Err(Error::Fetch {
                id: id.clone(),
                source: TransportError::Body(serde_json::Error::custom(format!(
                    "expected a JSON array of records, got {}",
                    json_kind(&other)
                ))),
            }),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
