// src/pipeline/analyze.rs

//! Offline analysis pipelines over saved tables.

use std::path::{Path, PathBuf};

use crate::analysis::influence::{InfluenceRow, influence_profile};
use crate::analysis::network::{CommentNetwork, load_scored};
use crate::analysis::sentiment::{LabelCounts, SentimentScorer, score_table};
use crate::error::{AppError, Result};
use crate::storage::local::encode_csv;
use crate::storage::{LocalStorage, Table};
use crate::utils::console;

pub const SENTIMENT_RESULTS_FILE: &str = "youtube_sentiment_results.csv";
pub const INFLUENCE_PROFILE_FILE: &str = "author_influence_profile.csv";

/// Score every `youtube_*.csv` in `input_dir` and write one combined table.
pub fn run_sentiment(
    input_dir: &Path,
    output: &Path,
    scorer: &dyn SentimentScorer,
) -> Result<LabelCounts> {
    console::header("Sentiment analysis");

    let files: Vec<PathBuf> = LocalStorage::new(input_dir)
        .list_files("youtube_", ".csv")?
        .into_iter()
        .filter(|path| !is_derived(path, output))
        .collect();
    if files.is_empty() {
        return Err(AppError::analysis(format!(
            "no youtube_*.csv files found in {}",
            input_dir.display()
        )));
    }

    let mut tables = Vec::with_capacity(files.len());
    for file in &files {
        let mut table = Table::read(file)?;
        let source = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        table.set_column("source_file", vec![source; table.len()])?;
        console::sub_item(&format!("{} ({} rows)", file.display(), table.len()));
        tables.push(table);
    }

    let mut combined = Table::concat(tables);
    let counts = score_table(&mut combined, scorer)?;
    combined.write(output)?;

    log::info!(
        "Scored {} comments, results saved to {}",
        counts.total(),
        output.display()
    );
    let distribution: Vec<(&str, String)> = counts
        .ranked()
        .into_iter()
        .map(|(label, n)| (label.as_str(), n.to_string()))
        .collect();
    console::summary("Sentiment distribution", &distribution);

    Ok(counts)
}

/// Earlier analysis output sitting in the same directory.
fn is_derived(path: &Path, output: &Path) -> bool {
    path == output
        || path
            .file_name()
            .is_some_and(|name| name == SENTIMENT_RESULTS_FILE)
}

/// Build the author → video network and optionally export DOT.
pub fn run_network(input: &Path, top: usize, dot: Option<&Path>) -> Result<CommentNetwork> {
    console::header("Network analysis");

    let comments = load_scored(input)?;
    let network = CommentNetwork::build(&comments);

    console::summary(
        "Graph",
        &[
            ("Nodes", network.node_count().to_string()),
            ("Edges", network.edge_count().to_string()),
            ("Videos", network.video_count().to_string()),
        ],
    );
    let top_authors: Vec<(&str, String)> = network
        .top_commenters(top)
        .into_iter()
        .map(|(author, n)| (author, n.to_string()))
        .collect();
    console::summary(&format!("Top {} commenters", top), &top_authors);

    if let Some(path) = dot {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, network.to_dot(top))?;
        log::info!("DOT graph written to {}", path.display());
    }

    Ok(network)
}

/// Compute author influence metrics and write the profile table.
pub fn run_influence(input: &Path, output: &Path) -> Result<Vec<InfluenceRow>> {
    console::header("Influence analysis");

    let comments = load_scored(input)?;
    if comments.is_empty() {
        return Err(AppError::analysis(format!(
            "no scored comments in {}",
            input.display()
        )));
    }
    let rows = influence_profile(&comments);

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, encode_csv(&rows)?)?;
    log::info!(
        "Influence profile for {} authors saved to {}",
        rows.len(),
        output.display()
    );

    for row in rows.iter().take(5) {
        console::sub_item(&format!(
            "{}: prestige {:.4}, degree {:.4}, bridge {:.4}, {}",
            row.author,
            row.prestige_influence,
            row.degree_influence,
            row.bridge_score,
            row.sentiment
        ));
    }

    Ok(rows)
}
