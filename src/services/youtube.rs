// src/services/youtube.rs

//! YouTube Data API v3 client.
//!
//! A thin call-through to the `search`, `videos` and `commentThreads`
//! endpoints with a fixed delay before every call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::YouTubeConfig;
use crate::models::youtube::{
    CommentThreadListResponse, ErrorEnvelope, SearchListResponse, VideoListResponse,
};
use crate::utils::http::{create_client, endpoint_url};

/// Largest `maxResults` accepted by `search.list` and `videos.list` ids.
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Largest `maxResults` accepted by `commentThreads.list`.
pub const MAX_COMMENT_PAGE: usize = 100;

/// The upstream calls the collector depends on.
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// Search videos by free-text query, relevance-ranked.
    async fn search_videos(&self, query: &str, max_results: usize) -> Result<SearchListResponse>;

    /// Look up snippet and statistics for up to 50 video ids.
    async fn list_videos(&self, ids: &[String]) -> Result<VideoListResponse>;

    /// Fetch one page of comment threads (with replies) for a video.
    async fn list_comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
        max_results: usize,
    ) -> Result<CommentThreadListResponse>;

    /// Number of calls issued so far.
    fn request_count(&self) -> usize;
}

/// HTTP implementation of [`VideoApi`].
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
    delay: Duration,
    requests: AtomicUsize,
}

impl YouTubeClient {
    /// Create a client; fails before any call when the API key is missing.
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::config(
                "YouTube API key is required. Set it in .env or provide --api-key",
            ));
        }

        Ok(Self {
            client: create_client(config)?,
            api_key: config.api_key.trim().to_string(),
            base_url: config.base_url.clone(),
            delay: Duration::from_millis(config.request_delay_ms),
            requests: AtomicUsize::new(0),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<T> {
        let count = self.requests.fetch_add(1, Ordering::Relaxed) + 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if count % 10 == 0 {
            log::info!("  Made {} API requests...", count);
        }

        log::debug!("GET {} {:?}", endpoint, params);
        params.push(("key", self.api_key.clone()));
        let url = endpoint_url(&self.base_url, endpoint, &params)?;

        // The URL carries the API key; keep it out of error messages.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        if !status.is_success() {
            return Err(Self::decode_error(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn decode_error(status: u16, body: &str) -> AppError {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => AppError::api(
                status,
                envelope.error.reason(),
                envelope.error.message.as_str(),
            ),
            Err(_) => AppError::api(status, "", body.trim()),
        }
    }
}

/// Query for `search.list`: relevance-ranked videos, at most 50.
pub fn search_params(query: &str, max_results: usize) -> Vec<(&'static str, String)> {
    vec![
        ("part", "snippet".to_string()),
        ("q", query.to_string()),
        ("type", "video".to_string()),
        ("order", "relevance".to_string()),
        (
            "maxResults",
            max_results.clamp(1, MAX_SEARCH_RESULTS).to_string(),
        ),
    ]
}

/// Query for `videos.list` with snippet and statistics.
pub fn video_params(ids: &[String]) -> Vec<(&'static str, String)> {
    vec![
        ("part", "snippet,statistics".to_string()),
        ("id", ids.join(",")),
    ]
}

/// Query for one `commentThreads.list` page, at most 100 threads.
pub fn comment_thread_params(
    video_id: &str,
    page_token: Option<&str>,
    max_results: usize,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("part", "snippet,replies".to_string()),
        ("videoId", video_id.to_string()),
        ("textFormat", "plainText".to_string()),
        (
            "maxResults",
            max_results.clamp(1, MAX_COMMENT_PAGE).to_string(),
        ),
    ];
    if let Some(token) = page_token {
        params.push(("pageToken", token.to_string()));
    }
    params
}

#[async_trait]
impl VideoApi for YouTubeClient {
    async fn search_videos(&self, query: &str, max_results: usize) -> Result<SearchListResponse> {
        self.get("search", search_params(query, max_results)).await
    }

    async fn list_videos(&self, ids: &[String]) -> Result<VideoListResponse> {
        self.get("videos", video_params(ids)).await
    }

    async fn list_comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
        max_results: usize,
    ) -> Result<CommentThreadListResponse> {
        self.get(
            "commentThreads",
            comment_thread_params(video_id, page_token, max_results),
        )
        .await
    }

    fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}
