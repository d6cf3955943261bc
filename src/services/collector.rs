// src/services/collector.rs

//! Comment collector service.
//!
//! Finds candidate videos for a hashtag, then pages through each video's
//! comment threads in order until the global comment budget is spent.
//! Every call is awaited sequentially.

use chrono::{Local, Utc};

use crate::error::{Result, SkipReason};
use crate::models::{
    CollectionOutcome, CollectionRequest, EngagementRecord, VideoCache, VideoMetadata,
};
use crate::services::assembler::{RecordContext, thread_records};
use crate::services::youtube::{MAX_COMMENT_PAGE, MAX_SEARCH_RESULTS, VideoApi};
use crate::utils::truncate_chars;

/// Service for collecting engagement records for a hashtag.
pub struct CommentCollector<'a> {
    api: &'a dyn VideoApi,
}

impl<'a> CommentCollector<'a> {
    pub fn new(api: &'a dyn VideoApi) -> Self {
        Self { api }
    }

    /// Run one collection.
    ///
    /// Per-video failures are logged and skipped; the returned records never
    /// exceed `request.max_comments`.
    pub async fn collect(&self, request: &CollectionRequest) -> Result<CollectionOutcome> {
        let started_at = Utc::now();
        let requests_before = self.api.request_count();
        let mut outcome = CollectionOutcome::empty(started_at);

        if request.max_comments == 0 || request.max_videos == 0 {
            log::warn!("Nothing to collect: comment or video budget is zero");
            return Ok(outcome);
        }

        let video_ids = self.search(request).await;
        outcome.videos_found = video_ids.len();

        if video_ids.is_empty() {
            log::warn!("No videos found for {}", request.query());
            outcome.finished_at = Utc::now();
            outcome.api_requests = self.api.request_count() - requests_before;
            return Ok(outcome);
        }

        let cache = self.lookup_videos(&video_ids).await;
        for video_id in &video_ids {
            if let Some(video) = cache.get(video_id) {
                log::info!(
                    "  • {}... (Views: {})",
                    truncate_chars(&video.title, 50),
                    video.views
                );
            }
        }

        let total = video_ids.len();
        let query = request.query();
        let mut records = Vec::new();

        for (index, video_id) in video_ids.iter().enumerate() {
            log::info!(
                "Processing video {}/{} (ID: {})",
                index + 1,
                total,
                video_id
            );

            let before = records.len();
            outcome.videos_processed += 1;

            let result = self
                .collect_video(video_id, cache.get(video_id), &query, request, &mut records)
                .await;
            if let Err(error) = result {
                outcome.videos_skipped += 1;
                match error.skip_reason() {
                    SkipReason::CommentsDisabled => {
                        log::warn!("Comments disabled for video {}", video_id)
                    }
                    SkipReason::VideoNotFound => log::warn!("Video {} not found", video_id),
                    SkipReason::QuotaExceeded => {
                        log::warn!("Quota exceeded while fetching {}: {}", video_id, error)
                    }
                    SkipReason::Other => {
                        log::error!("Error fetching comments for {}: {}", video_id, error)
                    }
                }
            }

            log::info!(
                "  Collected {} comments (Total: {})",
                records.len() - before,
                records.len()
            );

            if records.len() >= request.max_comments {
                log::info!(
                    "Reached maximum comments limit ({})",
                    request.max_comments
                );
                break;
            }
        }

        outcome.records = records;
        outcome.finished_at = Utc::now();
        outcome.api_requests = self.api.request_count() - requests_before;
        Ok(outcome)
    }

    /// Resolve candidate video ids. A failed search yields no candidates.
    async fn search(&self, request: &CollectionRequest) -> Vec<String> {
        let query = request.query();
        log::info!("Searching for videos with hashtag: {}", query);

        let max_results = request.max_videos.min(MAX_SEARCH_RESULTS);
        match self.api.search_videos(&query, max_results).await {
            Ok(response) => {
                let ids: Vec<String> = response
                    .items
                    .into_iter()
                    .filter_map(|item| item.id.video_id)
                    .take(request.max_videos)
                    .collect();
                log::info!("Found {} videos for {}", ids.len(), query);
                ids
            }
            Err(error) => {
                log::error!("Error searching videos: {}", error);
                Vec::new()
            }
        }
    }

    /// Look up metadata for all candidates, in batches of at most 50 ids.
    async fn lookup_videos(&self, video_ids: &[String]) -> VideoCache {
        let mut cache = VideoCache::new();
        for batch in video_ids.chunks(MAX_SEARCH_RESULTS) {
            match self.api.list_videos(batch).await {
                Ok(response) => cache.extend(response.items.into_iter().map(VideoMetadata::from)),
                Err(error) => {
                    log::error!("Error getting video details: {}", error);
                }
            }
        }
        if cache.is_empty() && !video_ids.is_empty() {
            log::warn!("No video metadata available, records will use fallbacks");
        } else {
            log::debug!("Cached metadata for {}/{} videos", cache.len(), video_ids.len());
        }
        cache
    }

    /// Page through one video's comment threads, appending to `records`.
    ///
    /// Records pushed before an error stay in `records`.
    async fn collect_video(
        &self,
        video_id: &str,
        video: Option<&VideoMetadata>,
        hashtag_query: &str,
        request: &CollectionRequest,
        records: &mut Vec<EngagementRecord>,
    ) -> Result<()> {
        let mut page_token: Option<String> = None;

        loop {
            let remaining = request.max_comments.saturating_sub(records.len());
            if remaining == 0 {
                return Ok(());
            }

            let page = self
                .api
                .list_comment_threads(
                    video_id,
                    page_token.as_deref(),
                    remaining.min(MAX_COMMENT_PAGE),
                )
                .await?;

            let collected_at = Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
            let ctx = RecordContext {
                video_id,
                video,
                hashtag_query,
                collected_at: &collected_at,
            };

            'threads: for thread in &page.items {
                for record in thread_records(&ctx, thread, request.include_replies) {
                    if records.len() >= request.max_comments {
                        break 'threads;
                    }
                    match record {
                        Ok(record) => records.push(record),
                        Err(error) => log::warn!("Skipping malformed comment: {}", error),
                    }
                }
            }

            // An empty page cannot make progress even if it carries a token.
            if page.items.is_empty() {
                return Ok(());
            }
            match page.next_page_token {
                Some(token) if records.len() < request.max_comments => page_token = Some(token),
                _ => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::error::AppError;
    use crate::models::youtube::{
        CommentThreadListResponse, SearchListResponse, VideoListResponse,
    };

    /// In-memory API: pages are keyed by (video id, page token).
    #[derive(Default)]
    struct FakeApi {
        search: Vec<String>,
        search_fails: bool,
        pages: HashMap<(String, Option<String>), serde_json::Value>,
        failures: HashMap<String, (u16, String)>,
        comment_calls: Mutex<Vec<(String, Option<String>, usize)>>,
        video_batches: Mutex<Vec<usize>>,
        requests: AtomicUsize,
    }

    impl FakeApi {
        fn with_videos(ids: &[&str]) -> Self {
            Self {
                search: ids.iter().map(|s| s.to_string()).collect(),
                ..Self::default()
            }
        }

        /// Add a page of `threads` (each with `replies` replies) for a video.
        fn page(
            mut self,
            video: &str,
            token: Option<&str>,
            next: Option<&str>,
            threads: &[(&str, usize)],
        ) -> Self {
            let items: Vec<_> = threads
                .iter()
                .map(|(id, replies)| {
                    let replies: Vec<_> = (0..*replies)
                        .map(|n| {
                            json!({
                                "id": format!("{id}.r{n}"),
                                "snippet": {
                                    "authorDisplayName": format!("replier{n}"),
                                    "textDisplay": format!("reply {n} to {id}"),
                                    "parentId": id,
                                    "publishedAt": "2024-01-02T00:00:00Z"
                                }
                            })
                        })
                        .collect();
                    json!({
                        "id": id,
                        "snippet": {
                            "videoId": video,
                            "topLevelComment": {
                                "id": id,
                                "snippet": {
                                    "authorDisplayName": format!("author-{id}"),
                                    "textDisplay": format!("comment {id}"),
                                    "likeCount": 1,
                                    "publishedAt": "2024-01-01T00:00:00Z"
                                }
                            },
                            "totalReplyCount": replies.len()
                        },
                        "replies": {"comments": replies}
                    })
                })
                .collect();
            self.pages.insert(
                (video.to_string(), token.map(str::to_string)),
                json!({"items": items, "nextPageToken": next}),
            );
            self
        }

        fn fail(mut self, video: &str, status: u16, reason: &str) -> Self {
            self.failures
                .insert(video.to_string(), (status, reason.to_string()));
            self
        }

        fn comment_calls(&self) -> Vec<(String, Option<String>, usize)> {
            self.comment_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VideoApi for FakeApi {
        async fn search_videos(&self, _query: &str, max_results: usize) -> Result<SearchListResponse> {
            self.requests.fetch_add(1, Ordering::Relaxed);
            if self.search_fails {
                return Err(AppError::api(403, "quotaExceeded", "quota"));
            }
            let items: Vec<_> = self
                .search
                .iter()
                .take(max_results)
                .map(|id| json!({"id": {"kind": "youtube#video", "videoId": id}}))
                .collect();
            Ok(serde_json::from_value(json!({ "items": items }))?)
        }

        async fn list_videos(&self, ids: &[String]) -> Result<VideoListResponse> {
            self.requests.fetch_add(1, Ordering::Relaxed);
            self.video_batches.lock().unwrap().push(ids.len());
            let items: Vec<_> = ids
                .iter()
                .map(|id| {
                    json!({
                        "id": id,
                        "snippet": {"title": format!("Title {id}"), "channelTitle": "Chan"},
                        "statistics": {"viewCount": "42"}
                    })
                })
                .collect();
            Ok(serde_json::from_value(json!({ "items": items }))?)
        }

        async fn list_comment_threads(
            &self,
            video_id: &str,
            page_token: Option<&str>,
            max_results: usize,
        ) -> Result<CommentThreadListResponse> {
            self.requests.fetch_add(1, Ordering::Relaxed);
            self.comment_calls.lock().unwrap().push((
                video_id.to_string(),
                page_token.map(str::to_string),
                max_results,
            ));
            if let Some((status, reason)) = self.failures.get(video_id) {
                return Err(AppError::api(*status, reason.clone(), "failed"));
            }
            let key = (video_id.to_string(), page_token.map(str::to_string));
            let page = self.pages.get(&key).cloned().unwrap_or(json!({"items": []}));
            Ok(serde_json::from_value(page)?)
        }

        fn request_count(&self) -> usize {
            self.requests.load(Ordering::Relaxed)
        }
    }

    fn request(max_comments: usize, max_videos: usize, replies: bool) -> CollectionRequest {
        CollectionRequest::new("rust", max_comments, max_videos, replies).unwrap()
    }

    #[tokio::test]
    async fn zero_candidates_yields_empty_outcome() {
        let api = FakeApi::default();
        let outcome = CommentCollector::new(&api)
            .collect(&request(10, 5, true))
            .await
            .unwrap();
        assert!(outcome.is_empty());
        assert_eq!(outcome.videos_found, 0);
        assert_eq!(outcome.api_requests, 1);
    }

    #[tokio::test]
    async fn failed_search_is_not_fatal() {
        let api = FakeApi {
            search_fails: true,
            ..FakeApi::with_videos(&["v1"])
        };
        let outcome = CommentCollector::new(&api)
            .collect(&request(10, 5, true))
            .await
            .unwrap();
        assert!(outcome.is_empty());
        assert!(api.comment_calls().is_empty());
    }

    #[tokio::test]
    async fn paginates_and_respects_budget() {
        let api = FakeApi::with_videos(&["v1", "v2"])
            .page("v1", None, Some("p2"), &[("a", 0), ("b", 0)])
            .page("v1", Some("p2"), None, &[("c", 0)])
            .page("v2", None, None, &[("d", 0), ("e", 0), ("f", 0)]);

        let outcome = CommentCollector::new(&api)
            .collect(&request(4, 5, false))
            .await
            .unwrap();

        let ids: Vec<_> = outcome.records.iter().map(|r| r.comment_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);

        let calls = api.comment_calls();
        assert_eq!(
            calls,
            vec![
                ("v1".to_string(), None, 4),
                ("v1".to_string(), Some("p2".to_string()), 2),
                ("v2".to_string(), None, 1),
            ]
        );
        assert_eq!(outcome.videos_processed, 2);
    }

    #[tokio::test]
    async fn budget_cuts_replies_mid_thread() {
        let api = FakeApi::with_videos(&["v1"]).page("v1", None, None, &[("a", 5)]);

        let outcome = CommentCollector::new(&api)
            .collect(&request(3, 1, true))
            .await
            .unwrap();

        let ids: Vec<_> = outcome.records.iter().map(|r| r.comment_id.as_str()).collect();
        assert_eq!(ids, ["a", "a.r0", "a.r1"]);
        assert!(!outcome.records[0].is_reply);
        assert_eq!(outcome.records[1].parent_id, "a");
    }

    #[tokio::test]
    async fn no_parent_ids_without_replies() {
        let api = FakeApi::with_videos(&["v1"]).page("v1", None, None, &[("a", 2), ("b", 3)]);

        let outcome = CommentCollector::new(&api)
            .collect(&request(50, 1, false))
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.records.iter().all(|r| r.parent_id.is_empty()));
        assert_eq!(outcome.reply_count(), 0);
    }

    #[tokio::test]
    async fn record_count_never_exceeds_budget() {
        for budget in 1..12 {
            let api = FakeApi::with_videos(&["v1", "v2"])
                .page("v1", None, Some("n"), &[("a", 2), ("b", 1)])
                .page("v1", Some("n"), None, &[("c", 3)])
                .page("v2", None, None, &[("d", 4)]);

            let outcome = CommentCollector::new(&api)
                .collect(&request(budget, 2, true))
                .await
                .unwrap();
            assert!(outcome.records.len() <= budget, "budget {budget}");
        }
    }

    #[tokio::test]
    async fn failing_video_is_skipped_and_others_continue() {
        let api = FakeApi::with_videos(&["v1", "v2", "v3"])
            .fail("v1", 403, "commentsDisabled")
            .fail("v2", 404, "videoNotFound")
            .page("v3", None, None, &[("z", 0)]);

        let outcome = CommentCollector::new(&api)
            .collect(&request(10, 3, true))
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].video_id, "v3");
        assert_eq!(outcome.videos_skipped, 2);
    }

    #[tokio::test]
    async fn failure_mid_pagination_keeps_collected_records() {
        // The second page of v1 fails after the first page was collected.
        struct Flaky(FakeApi);

        #[async_trait]
        impl VideoApi for Flaky {
            async fn search_videos(&self, q: &str, n: usize) -> Result<SearchListResponse> {
                self.0.search_videos(q, n).await
            }
            async fn list_videos(&self, ids: &[String]) -> Result<VideoListResponse> {
                self.0.list_videos(ids).await
            }
            async fn list_comment_threads(
                &self,
                video_id: &str,
                page_token: Option<&str>,
                max_results: usize,
            ) -> Result<CommentThreadListResponse> {
                if page_token == Some("boom") {
                    return Err(AppError::api(500, "backendError", "boom"));
                }
                self.0
                    .list_comment_threads(video_id, page_token, max_results)
                    .await
            }
            fn request_count(&self) -> usize {
                self.0.request_count()
            }
        }

        let api = Flaky(
            FakeApi::with_videos(&["v1", "v2"])
                .page("v1", None, Some("boom"), &[("a", 0), ("b", 0)])
                .page("v2", None, None, &[("c", 0)]),
        );

        let outcome = CommentCollector::new(&api)
            .collect(&request(10, 2, true))
            .await
            .unwrap();

        let ids: Vec<_> = outcome.records.iter().map(|r| r.comment_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(outcome.videos_skipped, 1);
    }

    #[tokio::test]
    async fn metadata_is_looked_up_once_in_batches() {
        let ids: Vec<String> = (0..60).map(|i| format!("v{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let api = FakeApi::with_videos(&id_refs).page("v0", None, None, &[("a", 0)]);

        let outcome = CommentCollector::new(&api)
            .collect(&request(1, 60, true))
            .await
            .unwrap();

        // Search caps at 50 candidates, so a single batch is enough.
        assert_eq!(*api.video_batches.lock().unwrap(), vec![50]);
        assert_eq!(outcome.videos_found, 50);
        assert_eq!(outcome.records[0].video_title, "Title v0");
        assert_eq!(outcome.records[0].video_views, 42);
        assert_eq!(outcome.videos_processed, 1);
    }

    #[tokio::test]
    async fn identical_responses_yield_identical_records() {
        let build = || {
            FakeApi::with_videos(&["v1", "v2"])
                .page("v1", None, Some("n"), &[("a", 1)])
                .page("v1", Some("n"), None, &[("b", 2)])
                .page("v2", None, None, &[("c", 0)])
        };

        let (first, second) = (build(), build());
        let a = CommentCollector::new(&first)
            .collect(&request(20, 2, true))
            .await
            .unwrap();
        let b = CommentCollector::new(&second)
            .collect(&request(20, 2, true))
            .await
            .unwrap();

        let strip = |records: &[EngagementRecord]| -> Vec<EngagementRecord> {
            records.iter().map(|r| r.without_collection_time()).collect()
        };
        assert_eq!(strip(&a.records), strip(&b.records));
        assert_eq!(a.records.len(), 6);
    }
}
