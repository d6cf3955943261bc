// src/error.rs

//! Unified error handling for the collector application.

use std::fmt;

use thiserror::Error;

/// Result type alias for collector operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading/writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Upstream API answered with a non-success status
    #[error("API error {status} ({reason}): {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Offline analysis error
    #[error("Analysis error: {0}")]
    Analysis(String),
}

/// Why a video was skipped during collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    CommentsDisabled,
    VideoNotFound,
    QuotaExceeded,
    Other,
}

impl AppError {
    /// Create an API error from a status code and the decoded error envelope.
    pub fn api(status: u16, reason: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Api {
            status,
            reason: reason.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an analysis error.
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis(message.into())
    }

    /// Classify an error raised while fetching a single video's comments.
    ///
    /// Only used to pick a log message; every class skips the video.
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            Self::Api { status: 403, reason, .. } if reason == "commentsDisabled" => {
                SkipReason::CommentsDisabled
            }
            Self::Api { status: 404, .. } => SkipReason::VideoNotFound,
            Self::Api { reason, .. }
                if reason == "quotaExceeded" || reason == "dailyLimitExceeded" =>
            {
                SkipReason::QuotaExceeded
            }
            _ => SkipReason::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_comments_disabled() {
        let err = AppError::api(403, "commentsDisabled", "disabled");
        assert_eq!(err.skip_reason(), SkipReason::CommentsDisabled);
    }

    #[test]
    fn forbidden_without_reason_is_other() {
        let err = AppError::api(403, "forbidden", "nope");
        assert_eq!(err.skip_reason(), SkipReason::Other);
    }

    #[test]
    fn classifies_not_found_and_quota() {
        assert_eq!(
            AppError::api(404, "videoNotFound", "gone").skip_reason(),
            SkipReason::VideoNotFound
        );
        assert_eq!(
            AppError::api(403, "quotaExceeded", "quota").skip_reason(),
            SkipReason::QuotaExceeded
        );
        assert_eq!(
            AppError::config("missing").skip_reason(),
            SkipReason::Other
        );
    }
}
