// src/models/mod.rs

//! Domain models for the collector application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod record;
mod request;
mod video;
pub mod youtube;

// Re-export all public types
pub use config::{CollectionConfig, Config, LoggingConfig, OutputConfig, YouTubeConfig};
pub use record::{EngagementRecord, PLATFORM_YOUTUBE};
pub use request::{CollectionOutcome, CollectionRequest};
pub use video::{VideoCache, VideoMetadata};
