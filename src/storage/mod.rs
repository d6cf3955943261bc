//! Storage abstractions for engagement records.
//!
//! Records are written as flat tables into the output directory:
//!
//! ```text
//! collected_data/
//! ├── youtube_<hashtag>_<YYYYmmdd_HHMMSS>.csv   # One file per collection run
//! ├── youtube_sentiment_results.csv             # Derived: sentiment columns added
//! └── author_influence_profile.csv              # Derived: per-author metrics
//! ```
//!
//! There is no cross-run state; every file is written whole.

pub mod local;
pub mod table;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::EngagementRecord;

// Re-export for convenience
pub use local::LocalStorage;
pub use table::Table;

/// On-disk encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    /// `.json` files are JSON; everything else is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Csv,
        }
    }
}

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Where the records landed
    pub location: PathBuf,
    /// Number of records written
    pub count: usize,
    pub format: Format,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for record storage backends.
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Write records under `key`, replacing any existing file.
    async fn save_records(&self, key: &str, records: &[EngagementRecord])
    -> Result<WriteMetadata>;

    /// Load records previously written under `key`.
    async fn load_records(&self, key: &str) -> Result<Vec<EngagementRecord>>;
}
