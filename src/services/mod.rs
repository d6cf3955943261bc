//! Service layer for the collector application.
//!
//! This module contains the business logic for:
//! - Talking to the YouTube Data API (`YouTubeClient`, `VideoApi`)
//! - Mapping API items into records (`assembler`)
//! - The paginated fan-out over videos (`CommentCollector`)

pub mod assembler;
mod collector;
mod youtube;

pub use collector::CommentCollector;
pub use youtube::{MAX_COMMENT_PAGE, MAX_SEARCH_RESULTS, VideoApi, YouTubeClient};
