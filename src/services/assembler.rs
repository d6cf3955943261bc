// src/services/assembler.rs

//! Maps comment-thread API items into flat engagement records.
//!
//! This is the validation boundary: required fields missing from an item
//! turn into a `Validation` error for that item only.

use crate::error::{AppError, Result};
use crate::models::youtube::{Comment, CommentThread};
use crate::models::{EngagementRecord, PLATFORM_YOUTUBE, VideoMetadata};

const UNKNOWN: &str = "Unknown";

/// Per-page context shared by every record assembled from that page.
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    pub video_id: &'a str,
    pub video: Option<&'a VideoMetadata>,
    pub hashtag_query: &'a str,
    pub collected_at: &'a str,
}

/// Assemble the records of one thread in source order: the top-level
/// comment first, then its replies when `include_replies` is set.
pub fn thread_records(
    ctx: &RecordContext<'_>,
    thread: &CommentThread,
    include_replies: bool,
) -> Vec<Result<EngagementRecord>> {
    let mut records = vec![assemble(
        ctx,
        Some(thread.id.as_str()),
        &thread.snippet.top_level_comment,
        None,
    )];

    if include_replies {
        if let Some(replies) = &thread.replies {
            records.extend(
                replies
                    .comments
                    .iter()
                    .map(|reply| assemble(ctx, reply.id.as_deref(), reply, Some(thread.id.as_str()))),
            );
        }
    }

    records
}

fn assemble(
    ctx: &RecordContext<'_>,
    comment_id: Option<&str>,
    comment: &Comment,
    parent_id: Option<&str>,
) -> Result<EngagementRecord> {
    let snippet = &comment.snippet;

    let comment_id = comment_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation(format!("comment on {} has no id", ctx.video_id)))?;
    let author = required(&snippet.author_display_name, "authorDisplayName", comment_id)?;
    let text = snippet
        .text_display
        .clone()
        .ok_or_else(|| missing("textDisplay", comment_id))?;
    let published_at = required(&snippet.published_at, "publishedAt", comment_id)?;

    Ok(EngagementRecord {
        platform: PLATFORM_YOUTUBE.to_string(),
        video_id: ctx.video_id.to_string(),
        video_title: ctx
            .video
            .map_or(UNKNOWN, |v| v.title.as_str())
            .to_string(),
        video_views: ctx.video.map_or(0, |v| v.views),
        channel_title: ctx
            .video
            .map_or(UNKNOWN, |v| v.channel_title.as_str())
            .to_string(),
        comment_id: comment_id.to_string(),
        parent_id: parent_id.unwrap_or_default().to_string(),
        author,
        text,
        likes: snippet.like_count,
        published_at,
        updated_at: snippet.updated_at.clone().unwrap_or_default(),
        is_reply: parent_id.is_some(),
        collected_at: ctx.collected_at.to_string(),
        hashtag_query: ctx.hashtag_query.to_string(),
    })
}

fn required(value: &Option<String>, field: &str, comment_id: &str) -> Result<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| missing(field, comment_id))
}

fn missing(field: &str, comment_id: &str) -> AppError {
    AppError::validation(format!("comment {comment_id} is missing {field}"))
}
