//! Offline analysis over saved engagement tables.
//!
//! - `summary`: headline statistics for a collection run
//! - `sentiment`: VADER scoring and labelling of comment text
//! - `network`: the author → video interaction graph
//! - `influence`: centrality metrics joined with author sentiment
//!
//! Everything but `summary` needs the `analysis` feature.

#[cfg(feature = "analysis")]
pub mod influence;
#[cfg(feature = "analysis")]
pub mod network;
#[cfg(feature = "analysis")]
pub mod sentiment;
pub mod summary;

pub use summary::{Summary, summarize};
