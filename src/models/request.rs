//! Collection request and outcome.

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{CollectionConfig, EngagementRecord};

/// Immutable input to a collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRequest {
    /// Search term without a leading '#'
    pub hashtag: String,
    pub max_comments: usize,
    pub max_videos: usize,
    pub include_replies: bool,
}

impl CollectionRequest {
    /// Build a request, stripping a leading '#' from the hashtag.
    pub fn new(
        hashtag: &str,
        max_comments: usize,
        max_videos: usize,
        include_replies: bool,
    ) -> Result<Self> {
        let hashtag = hashtag.trim().trim_start_matches('#').trim().to_string();
        if hashtag.is_empty() {
            return Err(AppError::validation("hashtag is empty"));
        }
        Ok(Self {
            hashtag,
            max_comments,
            max_videos,
            include_replies,
        })
    }

    /// Build a request using configured defaults for anything not given.
    pub fn with_defaults(
        hashtag: &str,
        defaults: &CollectionConfig,
        max_comments: Option<usize>,
        max_videos: Option<usize>,
        include_replies: Option<bool>,
    ) -> Result<Self> {
        Self::new(
            hashtag,
            max_comments.unwrap_or(defaults.default_max_results),
            max_videos.unwrap_or(defaults.default_max_videos),
            include_replies.unwrap_or(defaults.include_replies),
        )
    }

    /// The query sent to the search endpoint and stored on records.
    pub fn query(&self) -> String {
        format!("#{}", self.hashtag)
    }
}

/// Records and statistics of one collection run.
#[derive(Debug)]
pub struct CollectionOutcome {
    pub records: Vec<EngagementRecord>,
    pub videos_found: usize,
    pub videos_processed: usize,
    pub videos_skipped: usize,
    pub api_requests: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CollectionOutcome {
    pub fn empty(started_at: DateTime<Utc>) -> Self {
        Self {
            records: Vec::new(),
            videos_found: 0,
            videos_processed: 0,
            videos_skipped: 0,
            api_requests: 0,
            started_at,
            finished_at: started_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn reply_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_reply).count()
    }
}
