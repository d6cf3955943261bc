// src/pipeline/collect.rs

//! Comment collection pipeline.

use std::path::Path;

use chrono::Local;

use crate::analysis::summarize;
use crate::error::Result;
use crate::models::{CollectionOutcome, CollectionRequest};
use crate::services::{CommentCollector, VideoApi};
use crate::storage::{LocalStorage, RecordStorage, WriteMetadata};
use crate::utils::{clean_text, console, truncate_chars};

/// Where and how to save a collection run.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// File name (or absolute path); defaults to a timestamped name
    pub output: Option<String>,
    /// Also write a JSON copy next to the CSV
    pub json: bool,
}

/// Collect comments for one hashtag and save them.
///
/// Returns `None` when nothing was collected; no file is written then.
pub async fn run_collect(
    api: &dyn VideoApi,
    storage: &dyn RecordStorage,
    request: &CollectionRequest,
    options: &CollectOptions,
) -> Result<Option<WriteMetadata>> {
    console::header(&format!("Collecting YouTube comments for {}", request.query()));
    console::summary(
        "Request",
        &[
            ("Max comments", request.max_comments.to_string()),
            ("Max videos", request.max_videos.to_string()),
            ("Include replies", console::flag(request.include_replies).to_string()),
        ],
    );

    let outcome = CommentCollector::new(api).collect(request).await?;
    report_outcome(&outcome);

    if outcome.is_empty() {
        log::warn!("No comments collected for {}", request.query());
        return Ok(None);
    }

    let key = options
        .output
        .clone()
        .unwrap_or_else(|| LocalStorage::run_file_name(&request.hashtag, Local::now()));
    let metadata = storage.save_records(&key, &outcome.records).await?;
    log::info!(
        "Saved {} comments to {}",
        metadata.count,
        metadata.location.display()
    );

    if options.json {
        let json_key = Path::new(&key).with_extension("json");
        let json_key = json_key.to_string_lossy();
        if json_key != key {
            let copy = storage.save_records(&json_key, &outcome.records).await?;
            console::sub_item(&format!("JSON copy: {}", copy.location.display()));
        }
    }

    if let Some(summary) = summarize(&outcome.records) {
        console::summary("Dataset", &summary.items());
    }

    for record in outcome.records.iter().take(3) {
        log::debug!(
            "[{}] {}: {}",
            record.likes,
            record.author,
            truncate_chars(&clean_text(&record.text), 80)
        );
    }

    Ok(Some(metadata))
}

fn report_outcome(outcome: &CollectionOutcome) {
    let elapsed = outcome.finished_at - outcome.started_at;
    console::summary(
        "Collection complete",
        &[
            ("Comments", outcome.records.len().to_string()),
            ("Replies", outcome.reply_count().to_string()),
            ("Videos found", outcome.videos_found.to_string()),
            ("Videos processed", outcome.videos_processed.to_string()),
            ("Videos skipped", outcome.videos_skipped.to_string()),
            ("API requests", outcome.api_requests.to_string()),
            ("Elapsed", format!("{}s", elapsed.num_seconds())),
        ],
    );
}
