//! Pipeline entry points.
//!
//! - `run_collect`: Search, page through comments, save a run file
//! - `run_sentiment`: Score saved run files into one results table
//! - `run_network`: Build the author → video graph from scored comments
//! - `run_influence`: Rank authors by centrality and sentiment

#[cfg(feature = "analysis")]
pub mod analyze;
pub mod collect;

#[cfg(feature = "analysis")]
pub use analyze::{
    INFLUENCE_PROFILE_FILE, SENTIMENT_RESULTS_FILE, run_influence, run_network, run_sentiment,
};
pub use collect::{CollectOptions, run_collect};
