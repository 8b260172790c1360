//! Implements SnapshotPort using a single JSON file.
//!
//! The whole dataset is rewritten on every save (atomic temp-file + rename).

use crate::domain::{DirectorySnapshot, DomainError};
use crate::ports::SnapshotPort;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// JSON file-based snapshot storage.
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl SnapshotPort for JsonSnapshotStore {
    async fn load(&self) -> Result<Option<DirectorySnapshot>, DomainError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DomainError::Store(format!("read snapshot: {}", e))),
        };
        let snapshot: DirectorySnapshot = serde_json::from_str(&raw).map_err(|e| {
            DomainError::Store(format!("parse {}: {}", self.path.display(), e))
        })?;
        info!(
            path = %self.path.display(),
            groups = snapshot.groups.len(),
            members = snapshot.members.len(),
            "loaded directory snapshot"
        );
        Ok(Some(snapshot))
    }

    /// Write to a temp file, fsync, then rename over the target so a crash
    /// mid-write never leaves a truncated snapshot.
    async fn save(&self, snapshot: &DirectorySnapshot) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Store(format!("create dir: {}", e)))?;
        }
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Store(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Store(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Store(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Store(format!("atomic rename failed: {}", e)))?;
        debug!(path = %self.path.display(), bytes = json.len(), "snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::fixtures::seed_snapshot;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("directory.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("nested").join("directory.json"));
        let snap = seed_snapshot(Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap());

        store.save(&snap).await.unwrap();
        assert!(!store.path().with_extension("json.tmp").exists());

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, snap);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonSnapshotStore::new(&path);
        assert!(matches!(store.load().await, Err(DomainError::Store(_))));
    }

    #[test]
    fn test_records_use_camel_case_fields() {
        let snap = seed_snapshot(Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap());
        let json = serde_json::to_value(&snap.groups[0]).unwrap();
        assert_eq!(json["maxMembers"], 6);
        assert_eq!(json["currentMembers"], 4);
        assert_eq!(json["createdBy"], "student-1");
        let exam = serde_json::to_value(&snap.exam_sessions[0]).unwrap();
        assert_eq!(exam["status"], "active");
        assert_eq!(exam["aiRestrictions"]["agentsDisabled"], true);
    }
}
