//! JSON file persistence for fetched result sets

use crate::error::PersistError;
use crate::types::ResultRecord;
use std::path::Path;

/// Persists a result set to a JSON file, optionally preserving the prior
/// version as a timestamped backup
///
/// The destination is owned by the sink only for the duration of one
/// `persist` call. Concurrent runs must use distinct destinations; the sink
/// does not guard the backup-rename/write sequence against another writer
/// on the same path.
#[derive(Clone, Copy, Debug)]
pub struct JsonFileSink {
    backup_existing: bool,
}

impl JsonFileSink {
    /// Create a sink; `backup_existing` controls the pre-write rename
    pub fn new(backup_existing: bool) -> Self {
        Self { backup_existing }
    }

    /// Write `records` to `path` as pretty-printed JSON
    ///
    /// When backups are enabled and `path` exists, the prior file is first
    /// renamed to `<name>.bak_<YYYYmmdd_HHMMSS>`. A failed rename is logged
    /// at warn level and the write proceeds over the old file.
    ///
    /// The rename-then-write sequence is best-effort, not atomic: a crash
    /// between the two steps leaves only the backup. Callers needing
    /// stronger durability should persist to a staging path and rename it
    /// into place themselves.
    pub fn persist(&self, records: &[ResultRecord], path: &Path) -> Result<(), PersistError> {
        if self.backup_existing && path.exists() {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            let backup_path = {
                let mut name = path.as_os_str().to_os_string();
                name.push(format!(".bak_{timestamp}"));
                std::path::PathBuf::from(name)
            };

            match std::fs::rename(path, &backup_path) {
                Ok(()) => {
                    tracing::info!(backup = %backup_path.display(), "created backup of prior results");
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to create backup, overwriting prior results"
                    );
                }
            }
        }

        let body = serde_json::to_vec_pretty(records)?;
        std::fs::write(path, body).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            records = records.len(),
            "persisted result set"
        );
        Ok(())
    }
}
