//! JSON-file implementation of [`HistoryStore`].
//!
//! The whole history lives in one pretty-printed JSON array. Every append reads
//! the file, adds one record, and rewrites the file; writes go through a
//! temporary sibling file and a rename so a crash never leaves half a history.
//! An in-process lock serialises writers. Separate processes writing the same
//! file are not coordinated.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline::{
    AnalysisRecord, Category, Comment, HistoryStore, NewRecord, RecordId, StoreError, Timestamp,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default history file name.
pub const DEFAULT_HISTORY_FILE: &str = "comentarios_analizados.json";

/// On-disk record shape, tolerant of files written before ids existed.
#[derive(Debug, Deserialize)]
struct StoredRecord {
    #[serde(default)]
    id: Option<RecordId>,
    timestamp: Timestamp,
    #[serde(alias = "comentario_final")]
    comentario: Comment,
    categoria: Category,
    #[serde(default)]
    tags: Vec<String>,
}

impl StoredRecord {
    fn into_record(self, position: usize) -> AnalysisRecord {
        AnalysisRecord {
            id: self.id.unwrap_or_else(|| RecordId::next_after(position)),
            timestamp: self.timestamp,
            comment: self.comentario,
            category: self.categoria,
            tags: self.tags,
        }
    }
}

/// History store backed by a single JSON file.
#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonHistoryStore {
    /// Creates a store over `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn load(&self) -> Result<Vec<AnalysisRecord>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let stored: Vec<StoredRecord> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(stored
            .into_iter()
            .enumerate()
            .map(|(position, record)| record.into_record(position))
            .collect())
    }

    async fn write(&self, records: &[AnalysisRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records).map_err(StoreError::Serialization)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn append(&self, record: NewRecord) -> Result<AnalysisRecord, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let record = AnalysisRecord::from_new(
            RecordId::next_after(records.len()),
            Timestamp::now(),
            record,
        );
        records.push(record.clone());
        self.write(&records).await?;
        info!(
            id = %record.id,
            category = %record.category,
            total = records.len(),
            "analysis record appended"
        );
        Ok(record)
    }

    async fn read_all(&self) -> Result<Vec<AnalysisRecord>, StoreError> {
        let records = self.load().await?;
        debug!(total = records.len(), path = %self.path.display(), "history read");
        Ok(records)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "history cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(text: &str, category: Category, tags: &[&str]) -> NewRecord {
        NewRecord {
            comment: Comment::new(text).unwrap(),
            category,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> JsonHistoryStore {
        JsonHistoryStore::new(dir.path().join(DEFAULT_HISTORY_FILE))
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_then_read_preserves_order_and_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        for i in 1..=5 {
            let appended = store
                .append(new_record(&format!("comentario número {i}"), Category::Opinion, &[]))
                .await
                .unwrap();
            assert_eq!(appended.id.as_u64(), i);
        }

        let records = store.read_all().await.unwrap();
        assert_eq!(records.len(), 5);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.id.as_u64(), i as u64 + 1);
            assert_eq!(record.comment.as_str(), format!("comentario número {}", i + 1));
        }
        assert!(records.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_file_uses_history_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .append(new_record("el maestro es malo", Category::HateSpeech, &["maestro"]))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["comentario"], "el maestro es malo");
        assert_eq!(value[0]["categoria"], "HateSpeech");
        assert_eq!(value[0]["tags"][0], "maestro");
        assert!(raw.contains("\n  "), "pretty-printed with two-space indent");
        assert!(!dir.path().join("comentarios_analizados.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_legacy_records_without_ids_are_numbered_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"[
  {"timestamp": "2024-05-01T10:00:00.000001", "comentario": "la cafetería es cara",
   "categoria": "Opinion", "tags": ["cafetería"]},
  {"timestamp": "2024-05-02T11:00:00", "comentario_final": "el profesor es grosero",
   "categoria": "Queja", "tags": []}
]"#,
        )
        .unwrap();

        let records = store.read_all().await.unwrap();
        assert_eq!(records[0].id.as_u64(), 1);
        assert_eq!(records[1].id.as_u64(), 2);
        assert_eq!(records[1].comment.as_str(), "el profesor es grosero");
        assert_eq!(records[1].category, Category::HateSpeech);

        let appended = store
            .append(new_record("me gusta estudiar aquí", Category::Opinion, &[]))
            .await
            .unwrap();
        assert_eq!(appended.id.as_u64(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported_and_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.read_all().await, Err(StoreError::Corrupt { .. })));
        let err = store
            .append(new_record("el comentario es interesante", Category::Opinion, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn test_unwritable_location_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("missing-dir").join("history.json"));
        let err = store
            .append(new_record("el comentario es interesante", Category::Opinion, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[tokio::test]
    async fn test_clear_removes_history_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .append(new_record("el comentario es interesante", Category::Opinion, &[]))
            .await
            .unwrap();

        store.clear().await.unwrap();
        assert!(store.read_all().await.unwrap().is_empty());
        store.clear().await.unwrap();

        let appended = store
            .append(new_record("empezamos de nuevo aquí", Category::Opinion, &[]))
            .await
            .unwrap();
        assert_eq!(appended.id.as_u64(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_serialised() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(store_in(&dir));

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(new_record(
                        &format!("comentario en paralelo {i}"),
                        Category::Opinion,
                        &[],
                    ))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut ids: Vec<u64> = store
            .read_all()
            .await
            .unwrap()
            .iter()
            .map(|r| r.id.as_u64())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }
}
