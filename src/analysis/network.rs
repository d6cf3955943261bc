// src/analysis/network.rs

//! Author → video interaction graph built from scored comments.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use rustworkx_core::petgraph::dot::{Config as DotConfig, Dot};
use rustworkx_core::petgraph::graph::{DiGraph, NodeIndex};
use serde::Deserialize;

use crate::analysis::sentiment::{SentimentLabel, deserialize_label};
use crate::error::Result;
use crate::utils::truncate_chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Author,
    Video,
}

impl NodeKind {
    fn shape(&self) -> &'static str {
        match self {
            Self::Author => "ellipse",
            Self::Video => "box",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkNode {
    pub label: String,
    pub kind: NodeKind,
}

impl fmt::Display for NetworkNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Edge payload: how often an author commented on a video, and the
/// sentiment of the first such comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    pub weight: u32,
    pub sentiment: SentimentLabel,
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.weight)
    }
}

fn edge_color(sentiment: SentimentLabel) -> &'static str {
    match sentiment {
        SentimentLabel::Positive => "green",
        SentimentLabel::Negative => "red",
        SentimentLabel::Neutral => "gray",
    }
}

/// One row of a sentiment results table. Other columns are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredComment {
    pub author: String,
    pub video_id: String,
    pub video_title: String,
    pub sentiment_score: f64,
    #[serde(deserialize_with = "deserialize_label")]
    pub sentiment: SentimentLabel,
}

/// Load scored comments from a CSV file with a header row.
pub fn load_scored(path: impl AsRef<Path>) -> Result<Vec<ScoredComment>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut comments = Vec::new();
    for row in reader.deserialize() {
        comments.push(row?);
    }
    Ok(comments)
}

/// Node label for a video: `"<title> (<first 6 chars of id>)"`.
pub fn video_label(title: &str, video_id: &str) -> String {
    format!("{} ({})", title, truncate_chars(video_id, 6))
}

pub struct CommentNetwork {
    graph: DiGraph<NetworkNode, Interaction>,
    nodes: HashMap<(NodeKind, String), NodeIndex>,
    /// Comments per author, in first-seen order.
    activity: Vec<(String, usize)>,
}

impl CommentNetwork {
    pub fn build(comments: &[ScoredComment]) -> Self {
        let mut network = Self {
            graph: DiGraph::new(),
            nodes: HashMap::new(),
            activity: Vec::new(),
        };

        let mut activity_index: HashMap<&str, usize> = HashMap::new();
        for comment in comments {
            let author = network.node(NodeKind::Author, &comment.author);
            let video = network.node(
                NodeKind::Video,
                &video_label(&comment.video_title, &comment.video_id),
            );

            match network.graph.find_edge(author, video) {
                Some(edge) => network.graph[edge].weight += 1,
                None => {
                    network.graph.add_edge(
                        author,
                        video,
                        Interaction {
                            weight: 1,
                            sentiment: comment.sentiment,
                        },
                    );
                }
            }

            match activity_index.get(comment.author.as_str()) {
                Some(&i) => network.activity[i].1 += 1,
                None => {
                    activity_index.insert(&comment.author, network.activity.len());
                    network.activity.push((comment.author.clone(), 1));
                }
            }
        }
        network
    }

    fn node(&mut self, kind: NodeKind, label: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&(kind, label.to_string())) {
            return idx;
        }
        let idx = self.graph.add_node(NetworkNode {
            label: label.to_string(),
            kind,
        });
        self.nodes.insert((kind, label.to_string()), idx);
        idx
    }

    pub fn graph(&self) -> &DiGraph<NetworkNode, Interaction> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn author_index(&self, author: &str) -> Option<NodeIndex> {
        self.nodes.get(&(NodeKind::Author, author.to_string())).copied()
    }

    /// Author nodes with their labels.
    pub fn authors(&self) -> impl Iterator<Item = (NodeIndex, &str)> + '_ {
        self.graph
            .node_indices()
            .filter(|&i| self.graph[i].kind == NodeKind::Author)
            .map(|i| (i, self.graph[i].label.as_str()))
    }

    pub fn video_count(&self) -> usize {
        self.node_count() - self.activity.len()
    }

    /// The `n` most active commenters, most comments first.
    pub fn top_commenters(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .activity
            .iter()
            .map(|(author, count)| (author.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Subgraph of the top `n` commenters and the videos they touched.
    pub fn top_subgraph(&self, n: usize) -> DiGraph<NetworkNode, Interaction> {
        let mut keep = HashSet::new();
        for (author, _) in self.top_commenters(n) {
            if let Some(idx) = self.author_index(author) {
                keep.insert(idx);
                keep.extend(self.graph.neighbors(idx));
            }
        }
        self.graph.filter_map(
            |idx, node| keep.contains(&idx).then(|| node.clone()),
            |_, edge| Some(*edge),
        )
    }

    /// Graphviz DOT for the top-`n` subgraph, edges coloured by sentiment.
    pub fn to_dot(&self, n: usize) -> String {
        let sub = self.top_subgraph(n);
        let dot = Dot::with_attr_getters(
            &sub,
            &[DotConfig::EdgeNoLabel],
            &|_, edge| {
                let interaction = edge.weight();
                format!(
                    "color={} penwidth={}",
                    edge_color(interaction.sentiment),
                    interaction.weight
                )
            },
            &|_, (_, node)| format!("shape={}", node.kind.shape()),
        );
        format!("{dot}")
    }
}
