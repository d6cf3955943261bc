//! Local filesystem storage implementation.
//!
//! Writes go to a temporary sibling first and are renamed into place, so a
//! reader never observes a half-written table.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::EngagementRecord;
use crate::storage::{Format, RecordStorage, WriteMetadata};

/// Local filesystem storage backend rooted at the output directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a key. Absolute keys are used as-is.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Create the output directory if it does not exist.
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;
        Ok(())
    }

    /// Default file name for a collection run, e.g. `youtube_rust_20240101_120000.csv`.
    pub fn run_file_name(hashtag: &str, at: DateTime<Local>) -> String {
        format!("youtube_{}_{}.csv", hashtag, at.format("%Y%m%d_%H%M%S"))
    }

    /// List files directly under the root whose names start with `prefix`
    /// and end with `suffix`, sorted by name.
    pub fn list_files(&self, prefix: &str, suffix: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let entries = match std::fs::read_dir(&self.root_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(AppError::Io(e)),
        };

        for entry in entries {
            let path = entry?.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix) && n.ends_with(suffix));
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    pub async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    /// Read bytes, returning None if the file doesn't exist.
    pub async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write pretty-printed JSON (UTF-8, non-ASCII kept as-is).
    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read JSON data.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Write serializable rows as CSV with a header row.
    pub async fn write_csv<T: Serialize>(&self, key: &str, rows: &[T]) -> Result<PathBuf> {
        let bytes = encode_csv(rows)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read CSV rows, returning None if the file doesn't exist.
    pub async fn read_csv<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(decode_csv(&bytes)?)),
            None => Ok(None),
        }
    }
}

/// Serialize rows to CSV bytes, header included.
pub fn encode_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

/// Deserialize CSV bytes with a header row.
pub fn decode_csv<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_reader(bytes);
    reader
        .deserialize()
        .map(|row| row.map_err(AppError::from))
        .collect()
}

#[async_trait]
impl RecordStorage for LocalStorage {
    async fn save_records(
        &self,
        key: &str,
        records: &[EngagementRecord],
    ) -> Result<WriteMetadata> {
        let format = Format::from_path(Path::new(key));
        let location = match format {
            Format::Json => self.write_json(key, records).await?,
            Format::Csv => {
                if records.is_empty() {
                    // serde only emits the header alongside the first row
                    let header = EngagementRecord::COLUMNS.join(",") + "\n";
                    self.write_bytes(key, header.as_bytes()).await?
                } else {
                    self.write_csv(key, records).await?
                }
            }
        };
        log::debug!("Wrote {} records to {}", records.len(), location.display());

        Ok(WriteMetadata {
            location,
            count: records.len(),
            format,
            timestamp: Utc::now(),
        })
    }

    async fn load_records(&self, key: &str) -> Result<Vec<EngagementRecord>> {
        let records = match Format::from_path(Path::new(key)) {
            Format::Json => self.read_json(key).await?,
            Format::Csv => self.read_csv(key).await?,
        };
        records.ok_or_else(|| {
            AppError::validation(format!("no records at {}", self.path(key).display()))
        })
    }
}
