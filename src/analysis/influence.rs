//! Influence metrics for commenters.
//!
//! Three centralities are computed on the author → video graph:
//! - degree: share of other nodes an author is directly linked to
//! - eigenvector ("prestige"): weighted by comment counts
//! - betweenness ("bridge"): normalized, endpoints excluded
//!
//! Each author row is then joined with that author's sentiment profile.

use std::collections::HashMap;
use std::convert::Infallible;

use rustworkx_core::centrality::{betweenness_centrality, eigenvector_centrality};
use rustworkx_core::petgraph::Direction;
use rustworkx_core::petgraph::graph::DiGraph;
use serde::Serialize;

use crate::analysis::network::{CommentNetwork, Interaction, NetworkNode, ScoredComment};
use crate::analysis::sentiment::SentimentLabel;

pub const EIGENVECTOR_MAX_ITER: usize = 1000;
pub const EIGENVECTOR_TOLERANCE: f64 = 1e-6;

/// Graphs below this size run betweenness single-threaded.
const PARALLEL_THRESHOLD: usize = 200;

/// Per-node centralities, indexed by node index.
#[derive(Debug, Clone, PartialEq)]
pub struct Centrality {
    pub degree: Vec<f64>,
    pub eigenvector: Vec<f64>,
    pub betweenness: Vec<f64>,
}

pub fn centrality(graph: &DiGraph<NetworkNode, Interaction>) -> Centrality {
    let n = graph.node_count();

    let degree = graph
        .node_indices()
        .map(|idx| {
            if n <= 1 {
                return 1.0;
            }
            let links = graph.edges_directed(idx, Direction::Outgoing).count()
                + graph.edges_directed(idx, Direction::Incoming).count();
            links as f64 / (n - 1) as f64
        })
        .collect();

    let eigenvector = match eigenvector_centrality(
        graph,
        |edge| Ok::<f64, Infallible>(f64::from(edge.weight().weight)),
        Some(EIGENVECTOR_MAX_ITER),
        Some(EIGENVECTOR_TOLERANCE),
    )
    .unwrap_or_else(|never| match never {})
    {
        Some(values) => values,
        None => {
            log::warn!(
                "Eigenvector centrality did not converge in {} iterations, using zeros",
                EIGENVECTOR_MAX_ITER
            );
            vec![0.0; n]
        }
    };

    let betweenness = betweenness_centrality(graph, false, true, PARALLEL_THRESHOLD)
        .into_iter()
        .map(|value| value.unwrap_or(0.0))
        .collect();

    Centrality {
        degree,
        eigenvector,
        betweenness,
    }
}

/// Mean sentiment score and most frequent label for one author.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentProfile {
    pub mean_score: f64,
    pub label: SentimentLabel,
}

#[derive(Default)]
struct ProfileAccumulator {
    total: f64,
    count: usize,
    /// Label counts in first-seen order.
    labels: Vec<(SentimentLabel, usize)>,
}

impl ProfileAccumulator {
    fn add(&mut self, comment: &ScoredComment) {
        self.total += comment.sentiment_score;
        self.count += 1;
        match self.labels.iter_mut().find(|(l, _)| *l == comment.sentiment) {
            Some((_, n)) => *n += 1,
            None => self.labels.push((comment.sentiment, 1)),
        }
    }

    fn finish(self) -> SentimentProfile {
        // max_by_key keeps the last maximum; walk in reverse so ties go to the first seen
        let label = self
            .labels
            .iter()
            .rev()
            .max_by_key(|(_, n)| *n)
            .map(|(l, _)| *l)
            .unwrap_or(SentimentLabel::Neutral);
        SentimentProfile {
            mean_score: if self.count == 0 {
                0.0
            } else {
                self.total / self.count as f64
            },
            label,
        }
    }
}

pub fn sentiment_profiles(comments: &[ScoredComment]) -> HashMap<String, SentimentProfile> {
    let mut acc: HashMap<&str, ProfileAccumulator> = HashMap::new();
    for comment in comments {
        acc.entry(comment.author.as_str()).or_default().add(comment);
    }
    acc.into_iter()
        .map(|(author, profile)| (author.to_string(), profile.finish()))
        .collect()
}

/// One row of `author_influence_profile.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluenceRow {
    pub author: String,
    pub degree_influence: f64,
    pub prestige_influence: f64,
    pub bridge_score: f64,
    pub sentiment_score: f64,
    pub sentiment: SentimentLabel,
}

/// Influence rows for every author, highest prestige first.
pub fn influence_profile(comments: &[ScoredComment]) -> Vec<InfluenceRow> {
    let network = CommentNetwork::build(comments);
    let scores = centrality(network.graph());
    let profiles = sentiment_profiles(comments);

    let mut rows: Vec<InfluenceRow> = network
        .authors()
        .filter_map(|(idx, author)| {
            let profile = profiles.get(author)?;
            let i = idx.index();
            Some(InfluenceRow {
                author: author.to_string(),
                degree_influence: scores.degree[i],
                prestige_influence: scores.eigenvector[i],
                bridge_score: scores.betweenness[i],
                sentiment_score: profile.mean_score,
                sentiment: profile.label,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.prestige_influence.total_cmp(&a.prestige_influence));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use SentimentLabel::*;

    fn comment(author: &str, video: &str, score: f64, sentiment: SentimentLabel) -> ScoredComment {
        ScoredComment {
            author: author.to_string(),
            video_id: video.to_string(),
            video_title: video.to_uppercase(),
            sentiment_score: score,
            sentiment,
        }
    }

    fn sample() -> Vec<ScoredComment> {
        vec![
            comment("ann", "v1", 0.5, Positive),
            comment("ann", "v1", -0.5, Negative),
            comment("ann", "v2", 0.0, Neutral),
            comment("bob", "v1", -0.6, Negative),
            comment("bob", "v2", -0.2, Negative),
            comment("cat", "v3", 0.9, Positive),
        ]
    }

    #[test]
    fn degree_is_links_over_other_nodes() {
        let network = CommentNetwork::build(&sample());
        let scores = centrality(network.graph());
        let ann = network.author_index("ann").unwrap().index();
        let cat = network.author_index("cat").unwrap().index();
        assert!((scores.degree[ann] - 0.4).abs() < 1e-9);
        assert!((scores.degree[cat] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn bipartite_graph_has_no_bridges() {
        let network = CommentNetwork::build(&sample());
        let scores = centrality(network.graph());
        assert_eq!(scores.betweenness.len(), network.node_count());
        assert!(scores.betweenness.iter().all(|b| *b == 0.0));
        assert_eq!(scores.eigenvector.len(), network.node_count());
        assert!(scores.eigenvector.iter().all(|e| e.is_finite() && *e >= 0.0));
    }

    #[test]
    fn single_node_degree_is_one() {
        let mut graph = DiGraph::new();
        graph.add_node(NetworkNode {
            label: "solo".to_string(),
            kind: crate::analysis::network::NodeKind::Author,
        });
        assert_eq!(centrality(&graph).degree, [1.0]);
    }

    #[test]
    fn profile_ties_go_to_first_label() {
        let profiles = sentiment_profiles(&sample());
        let ann = &profiles["ann"];
        assert_eq!(ann.label, Positive);
        assert!(ann.mean_score.abs() < 1e-9);

        let bob = &profiles["bob"];
        assert_eq!(bob.label, Negative);
        assert!((bob.mean_score + 0.4).abs() < 1e-9);
    }

    #[test]
    fn influence_rows_cover_every_author() {
        let rows = influence_profile(&sample());
        let mut authors: Vec<&str> = rows.iter().map(|r| r.author.as_str()).collect();
        authors.sort();
        assert_eq!(authors, ["ann", "bob", "cat"]);
        assert!(
            rows.windows(2)
                .all(|w| w[0].prestige_influence >= w[1].prestige_influence)
        );
    }

    #[test]
    fn influence_csv_columns() {
        let rows = influence_profile(&sample());
        let bytes = crate::storage::local::encode_csv(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(
            "author,degree_influence,prestige_influence,bridge_score,sentiment_score,sentiment\n"
        ));
    }
}
