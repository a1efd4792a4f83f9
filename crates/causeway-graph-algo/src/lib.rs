//! Centrality primitives over a directed, unweighted id graph.
//!
//! Scores are returned as vectors indexed by insertion order of the node ids,
//! which callers keep sorted so every result is reproducible.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

mod centrality;
mod pagerank;

pub use centrality::{betweenness_centrality, bfs_distances, closeness_centrality, sample_sources};
pub use pagerank::{
    DEFAULT_DAMPING, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, PageRankConfig, PageRankOutcome,
    page_rank,
};

#[derive(Debug, Clone, Default)]
pub struct CentralityGraph {
    graph: DiGraph<String, ()>,
    index_by_id: HashMap<String, NodeIndex>,
}

impl CentralityGraph {
    pub fn new<I, S>(node_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut centrality = Self::default();
        for node_id in node_ids {
            let node_id = node_id.into();
            if centrality.index_by_id.contains_key(node_id.as_str()) {
                continue;
            }
            let index = centrality.graph.add_node(node_id.clone());
            centrality.index_by_id.insert(node_id, index);
        }
        centrality
    }

    /// Adds `source -> target`. Unknown ids and self-loops are ignored and
    /// parallel edges collapse into one, since centrality counts paths between
    /// nodes rather than between mechanisms.
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        let (Some(source), Some(target)) = (
            self.index_by_id.get(source).copied(),
            self.index_by_id.get(target).copied(),
        ) else {
            return false;
        };
        if source == target {
            return false;
        }
        self.graph.update_edge(source, target, ());
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn index_of(&self, node_id: &str) -> Option<usize> {
        self.index_by_id.get(node_id).map(|index| index.index())
    }

    pub fn node_id(&self, index: usize) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(index))
            .map(String::as_str)
    }

    /// Successor lists in ascending index order.
    pub(crate) fn successors(&self) -> Vec<Vec<usize>> {
        self.graph
            .node_indices()
            .map(|index| {
                let mut next = self
                    .graph
                    .neighbors_directed(index, Direction::Outgoing)
                    .map(|neighbor| neighbor.index())
                    .collect::<Vec<_>>();
                next.sort_unstable();
                next
            })
            .collect()
    }
}

/// Scales values into `[0, 1]` by the maximum; all-zero input stays zero.
pub fn normalize_by_max(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(0.0f64, f64::max);
    if max <= 0.0 {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|value| (value / max).clamp(0.0, 1.0))
        .collect()
}
