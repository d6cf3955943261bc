//! Per-table summary statistics.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::EngagementRecord;
use crate::utils::format_timestamp;

/// Headline numbers for one set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub platform: String,
    pub total_items: usize,
    pub unique_authors: usize,
    pub unique_videos: usize,
    pub avg_likes: f64,
    pub max_likes: u64,
    pub collection_date: String,
}

/// Summarize records; `None` when there is nothing to summarize.
pub fn summarize(records: &[EngagementRecord]) -> Option<Summary> {
    let first = records.first()?;

    let authors: HashSet<&str> = records.iter().map(|r| r.author.as_str()).collect();
    let videos: HashSet<&str> = records.iter().map(|r| r.video_id.as_str()).collect();
    let total_likes: u64 = records.iter().map(|r| r.likes).sum();
    let max_likes = records.iter().map(|r| r.likes).max().unwrap_or(0);

    Some(Summary {
        platform: first.platform.clone(),
        total_items: records.len(),
        unique_authors: authors.len(),
        unique_videos: videos.len(),
        avg_likes: total_likes as f64 / records.len() as f64,
        max_likes,
        collection_date: format_timestamp(&first.collected_at, "%Y-%m-%d %H:%M:%S"),
    })
}

impl Summary {
    /// Key/value pairs for console output.
    pub fn items(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Platform", self.platform.clone()),
            ("Total items", self.total_items.to_string()),
            ("Unique authors", self.unique_authors.to_string()),
            ("Unique videos", self.unique_videos.to_string()),
            ("Average likes", format!("{:.2}", self.avg_likes)),
            ("Max likes", self.max_likes.to_string()),
            ("Collected", self.collection_date.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PLATFORM_YOUTUBE;

    fn record(author: &str, video: &str, likes: u64) -> EngagementRecord {
        EngagementRecord {
            platform: PLATFORM_YOUTUBE.to_string(),
            video_id: video.to_string(),
            video_title: "t".to_string(),
            video_views: 0,
            channel_title: "c".to_string(),
            comment_id: format!("{author}-{video}-{likes}"),
            parent_id: String::new(),
            author: author.to_string(),
            text: "hi".to_string(),
            likes,
            published_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: String::new(),
            is_reply: false,
            collected_at: "2024-05-06T07:08:09.123456".to_string(),
            hashtag_query: "#rust".to_string(),
        }
    }

    #[test]
    fn empty_has_no_summary() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn counts_distinct_authors_and_videos() {
        let records = vec![
            record("ann", "v1", 1),
            record("bob", "v1", 4),
            record("ann", "v2", 1),
        ];
        let summary = summarize(&records).unwrap();
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.unique_authors, 2);
        assert_eq!(summary.unique_videos, 2);
        assert_eq!(summary.max_likes, 4);
        assert!((summary.avg_likes - 2.0).abs() < 1e-9);
        assert_eq!(summary.collection_date, "2024-05-06 07:08:09");
        assert_eq!(summary.platform, "YouTube");
    }
}
