// src/analysis/sentiment.rs

//! Lexicon-based sentiment scoring over collected comment text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, Result};
use crate::storage::Table;

/// Scores at or above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Scores at or below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Label a compound score using the ±0.05 thresholds (inclusive).
    pub fn from_score(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            Self::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(AppError::analysis(format!("unknown sentiment label '{other}'"))),
        }
    }
}

/// Deserialize a label case-insensitively, e.g. `positive` or `NEUTRAL`.
pub fn deserialize_label<'de, D>(deserializer: D) -> std::result::Result<SentimentLabel, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Maps text to a compound score in [-1, 1].
pub trait SentimentScorer {
    fn score(&self, text: &str) -> f64;
}

/// VADER lexicon scorer.
pub struct VaderScorer {
    analyzer: vader_sentiment::SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: vader_sentiment::SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for VaderScorer {
    fn score(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        self.analyzer
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
    }
}

/// Label counts over a scored table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl LabelCounts {
    pub fn add(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Counts sorted descending, for display.
    pub fn ranked(&self) -> Vec<(SentimentLabel, usize)> {
        let mut counts = vec![
            (SentimentLabel::Positive, self.positive),
            (SentimentLabel::Negative, self.negative),
            (SentimentLabel::Neutral, self.neutral),
        ];
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

/// Score the `text` column and append `sentiment_score` and `sentiment`.
pub fn score_table(table: &mut Table, scorer: &dyn SentimentScorer) -> Result<LabelCounts> {
    let mut counts = LabelCounts::default();
    let mut scores = Vec::with_capacity(table.len());
    let mut labels = Vec::with_capacity(table.len());

    for text in table.column("text")? {
        let score = scorer.score(text);
        let label = SentimentLabel::from_score(score);
        counts.add(label);
        scores.push(score.to_string());
        labels.push(label.to_string());
    }

    table.set_column("sentiment_score", scores)?;
    table.set_column("sentiment", labels)?;
    Ok(counts)
}
