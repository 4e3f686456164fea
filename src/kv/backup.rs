//! JSON backup export.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::logging::{info, warn};

use super::store::Store;
use super::types::BackupOutcome;

/// Prefix of the generated backup file name, followed by Unix milliseconds.
pub const BACKUP_PREFIX: &str = "db.backup.";

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// File name used when no backup path is given.
pub fn default_backup_name() -> PathBuf {
    PathBuf::from(format!("{}{}", BACKUP_PREFIX, unix_millis()))
}

impl Store {
    /// Write every entry as one pretty-printed JSON object to `filename`, or
    /// to `db.backup.<unix-millis>` in the working directory.
    ///
    /// Never fails: errors are reported in the returned [`BackupOutcome`].
    pub async fn backup(&self, filename: Option<&Path>) -> BackupOutcome {
        let filename = filename.map_or_else(default_backup_name, Path::to_path_buf);
        let data = self.to_json().await;

        let text = match serde_json::to_string_pretty(&data) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "backup serialization failed");
                return BackupOutcome::failed(e.to_string());
            }
        };

        if let Err(e) = tokio::fs::write(&filename, text).await {
            warn!(path = %filename.display(), error = %e, "backup write failed");
            return BackupOutcome::failed(e.to_string());
        }

        info!(path = %filename.display(), size = data.len(), "backup written");
        BackupOutcome::succeeded(filename, unix_millis(), data.len())
    }
}
