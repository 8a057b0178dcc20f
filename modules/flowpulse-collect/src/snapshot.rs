// Snapshot persistence. One pipeline run produces one immutable JSON file;
// the write goes through a temp file in the same directory and renames over
// the old snapshot, so readers only ever observe a complete dataset and a
// failed run leaves the previous snapshot in place.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use flowpulse_common::{FlowPulseError, Record};

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replace the snapshot with `records`, pretty-printed.
    pub async fn write(&self, records: &[Record]) -> Result<(), FlowPulseError> {
        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| FlowPulseError::Snapshot(format!("serialize failed: {e}")))?;

        let path = self.path.clone();
        let count = records.len();
        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .map_err(|e| FlowPulseError::Snapshot(format!("write task failed: {e}")))??;

        info!(count, path = %self.path.display(), "Snapshot written");
        Ok(())
    }

    /// Load the current snapshot. Distinguishes "never produced" from
    /// other read failures so the read endpoint can report 404 vs 500.
    pub async fn load(&self) -> Result<Vec<Record>, FlowPulseError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FlowPulseError::SnapshotMissing)
            }
            Err(e) => return Err(FlowPulseError::Snapshot(format!("read failed: {e}"))),
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| FlowPulseError::Snapshot(format!("parse failed: {e}")))
    }
}

fn write_atomic(path: &Path, json: &[u8]) -> Result<(), FlowPulseError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .map_err(|e| FlowPulseError::Snapshot(format!("create dir failed: {e}")))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| FlowPulseError::Snapshot(format!("temp file failed: {e}")))?;
    tmp.write_all(json)
        .map_err(|e| FlowPulseError::Snapshot(format!("write failed: {e}")))?;
    tmp.persist(path)
        .map_err(|e| FlowPulseError::Snapshot(format!("rename failed: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowpulse_common::Platform;

    fn record(title: &str, score: f64) -> Record {
        let mut r = Record::new(title, Platform::Forum, format!("https://e.com/{title}"))
            .with_metric("views", 10.0);
        r.score = Some(score);
        r
    }

    #[tokio::test]
    async fn load_before_any_write_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.json"));

        match store.load().await {
            Err(FlowPulseError::SnapshotMissing) => {}
            other => panic!("expected SnapshotMissing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn write_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.json"));

        store.write(&[record("a", 100.0), record("b", 0.0)]).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title, "a");
        assert_eq!(loaded[0].score, Some(100.0));
    }

    #[tokio::test]
    async fn write_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/deeper/snapshot.json"));

        store.write(&[record("a", 1.0)]).await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rewrite_wholly_replaces_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.json"));

        store.write(&[record("old-1", 1.0), record("old-2", 2.0)]).await.unwrap();
        store.write(&[record("new", 3.0)]).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "new");
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_not_reported_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = SnapshotStore::new(path);
        match store.load().await {
            Err(FlowPulseError::Snapshot(_)) => {}
            other => panic!("expected Snapshot error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn snapshot_file_is_indented_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.json"));
        store.write(&[record("a", 1.0)]).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[\n"));
        assert!(raw.contains("  \"title\": \"a\"") || raw.contains("\"title\": \"a\""));
    }
}
