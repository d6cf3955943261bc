//! Video metadata and the per-run lookup cache.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::youtube::VideoResource;

/// Metadata for one video, as returned by `videos.list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

impl From<VideoResource> for VideoMetadata {
    fn from(resource: VideoResource) -> Self {
        Self {
            id: resource.id,
            title: resource.snippet.title,
            description: resource.snippet.description,
            channel_title: resource.snippet.channel_title,
            published_at: resource.snippet.published_at,
            views: resource.statistics.view_count,
            likes: resource.statistics.like_count,
            comments: resource.statistics.comment_count,
        }
    }
}

/// Video metadata keyed by video id, valid for a single collection run.
#[derive(Debug, Default)]
pub struct VideoCache {
    entries: HashMap<String, VideoMetadata>,
}

impl VideoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, video: VideoMetadata) {
        self.entries.insert(video.id.clone(), video);
    }

    pub fn get(&self, video_id: &str) -> Option<&VideoMetadata> {
        self.entries.get(video_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<VideoMetadata> for VideoCache {
    fn extend<T: IntoIterator<Item = VideoMetadata>>(&mut self, iter: T) {
        for video in iter {
            self.insert(video);
        }
    }
}
