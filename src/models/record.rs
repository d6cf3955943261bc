//! Engagement record data structure.

use serde::{Deserialize, Serialize};

/// Platform tag written into every record.
pub const PLATFORM_YOUTUBE: &str = "YouTube";

/// One flattened comment or reply with its video context.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngagementRecord {
    /// Source platform (always "YouTube")
    pub platform: String,

    pub video_id: String,

    /// Video title, "Unknown" when metadata was unavailable
    pub video_title: String,

    pub video_views: u64,

    /// Channel title, "Unknown" when metadata was unavailable
    pub channel_title: String,

    pub comment_id: String,

    /// Parent comment id (empty for top-level comments)
    #[serde(default)]
    pub parent_id: String,

    pub author: String,

    pub text: String,

    pub likes: u64,

    pub published_at: String,

    #[serde(default)]
    pub updated_at: String,

    pub is_reply: bool,

    /// Local time the record was assembled (ISO 8601)
    pub collected_at: String,

    /// Originating hashtag with a leading '#'
    pub hashtag_query: String,
}

impl EngagementRecord {
    /// CSV header, in column order.
    pub const COLUMNS: [&'static str; 15] = [
        "platform",
        "video_id",
        "video_title",
        "video_views",
        "channel_title",
        "comment_id",
        "parent_id",
        "author",
        "text",
        "likes",
        "published_at",
        "updated_at",
        "is_reply",
        "collected_at",
        "hashtag_query",
    ];

    /// A copy with the collection timestamp blanked, for run-to-run comparisons.
    pub fn without_collection_time(&self) -> Self {
        Self {
            collected_at: String::new(),
            ..self.clone()
        }
    }
}
