use crate::model::record::TranslationRecord;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;

pub const DEFAULT_HISTORY_FILE: &str = "translations-history.json";
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Bounded, newest-first translation log persisted as a single JSON array.
///
/// Every mutation rewrites the whole file. Mutations are serialized through an
/// internal lock so two concurrent `record` calls cannot drop each other's entry.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit: limit.max(1),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted log. Missing or unreadable state yields an empty log.
    pub async fn load(&self) -> Vec<TranslationRecord> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no history file yet");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read history, treating as empty");
                return Vec::new();
            }
        };

        if data.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<TranslationRecord>>(&data) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to parse history, treating as empty");
                Vec::new()
            }
        }
    }

    /// Replaces the persisted log with `log`.
    pub async fn save(&self, log: &[TranslationRecord]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_log(log).await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.save(&[]).await
    }

    /// Load, append and save as one serialized step. Returns the log as written.
    ///
    /// The record id is bumped past the current head when the clock has not
    /// advanced, keeping ids unique and increasing. A head already at
    /// `i64::MAX` cannot be passed; the clock id is kept instead.
    pub async fn record(
        &self,
        mut record: TranslationRecord,
    ) -> Result<Vec<TranslationRecord>, StoreError> {
        let _guard = self.write_lock.lock().await;

        let log = self.load().await;
        if let Some(head) = log.first() {
            if record.id <= head.id {
                match head.id.checked_add(1) {
                    Some(next_id) => record.id = next_id,
                    None => tracing::warn!(
                        path = %self.path.display(),
                        head_id = head.id,
                        id = record.id,
                        "history head id is at the maximum, keeping clock id"
                    ),
                }
            }
        }

        let next = append(record, &log, self.limit);
        self.write_log(&next).await?;

        Ok(next)
    }

    async fn write_log(&self, log: &[TranslationRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(log)?;
        write_atomic(&self.path, json.as_bytes())
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

/// Returns a new log with `record` at the head, dropping the oldest entries
/// past `limit`.
pub fn append(
    record: TranslationRecord,
    log: &[TranslationRecord],
    limit: usize,
) -> Vec<TranslationRecord> {
    let mut out = Vec::with_capacity(log.len().min(limit) + 1);
    out.push(record);
    out.extend(log.iter().cloned());
    out.truncate(limit);
    out
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "history".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}
