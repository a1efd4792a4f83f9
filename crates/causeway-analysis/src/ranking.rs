use std::collections::BTreeSet;

use causeway_config::{RankingConfig, RankingWeights};
use causeway_core::{
    CategoryFilter, CausalGraph, MAX_SCALE, MIN_SCALE, Mechanism, NodeConnections,
    score_mechanism,
};
use causeway_graph_algo::{
    CentralityGraph, PageRankConfig, betweenness_centrality, closeness_centrality,
    normalize_by_max, page_rank,
};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, ensure_in_range};

const IMPORTANCE_SCHEMA_VERSION: &str = "1.0";
pub const MIN_TOP_N: u32 = 1;
pub const MAX_TOP_N: u32 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ImportanceRequest {
    #[serde(default)]
    pub top_n: Option<u32>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub scales: Option<Vec<u8>>,
    #[serde(default)]
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeImportance {
    pub node_id: String,
    pub label: String,
    pub scale: Option<u8>,
    pub categories: Vec<String>,
    pub connections: NodeConnections,
    pub degree_score: f64,
    pub betweenness_score: f64,
    pub closeness_centrality: f64,
    pub page_rank: f64,
    pub evidence_score: f64,
    pub composite_score: f64,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceRankingResult {
    pub schema_version: String,
    pub categories: Vec<String>,
    pub scales: Vec<u8>,
    pub min_connections: u32,
    pub total_candidates: u32,
    pub weights: RankingWeights,
    pub pagerank_iterations: u32,
    pub pagerank_converged: bool,
    pub betweenness_sampled: bool,
    pub nodes: Vec<NodeImportance>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportanceRanker {
    config: RankingConfig,
}

impl ImportanceRanker {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Scores every candidate node over the subgraph the filters induce, so
    /// normalization never sees nodes outside the filter.
    pub fn rank(
        &self,
        graph: &CausalGraph,
        request: &ImportanceRequest,
    ) -> Result<ImportanceRankingResult, AnalysisError> {
        let top_n = request
            .top_n
            .map(|top_n| ensure_in_range("top_n", top_n, MIN_TOP_N, MAX_TOP_N))
            .transpose()?;
        let scales = request
            .scales
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|scale| ensure_in_range("scale", *scale, MIN_SCALE, MAX_SCALE))
            .collect::<Result<BTreeSet<_>, _>>()?;
        let min_connections = request.min_connections.unwrap_or(0);
        let filter = CategoryFilter::from_request(request.categories.as_deref());
        let weights = self.config.weights.normalized();

        let candidates = graph
            .nodes()
            .filter(|node| filter.allows_node(node))
            .filter(|node| {
                scales.is_empty() || node.scale.is_some_and(|scale| scales.contains(&scale))
            })
            .filter(|node| node.connections.total() >= min_connections)
            .collect::<Vec<_>>();

        let mut centrality = CentralityGraph::new(candidates.iter().map(|node| node.id.as_str()));
        let mut degree = vec![0u32; candidates.len()];
        let mut touching = vec![Vec::<&Mechanism>::new(); candidates.len()];
        // Id order keeps the floating-point evidence sums independent of input order.
        let mut scored_mechanisms = graph
            .traversable_mechanisms()
            .map(|(_, mechanism)| mechanism)
            .filter(|mechanism| filter.allows_mechanism(mechanism))
            .collect::<Vec<_>>();
        scored_mechanisms.sort_by(|left, right| {
            left.id
                .cmp(&right.id)
                .then_with(|| left.source.cmp(&right.source))
                .then_with(|| left.target.cmp(&right.target))
        });
        for mechanism in scored_mechanisms {
            let (Some(source), Some(target)) = (
                centrality.index_of(mechanism.source.as_str()),
                centrality.index_of(mechanism.target.as_str()),
            ) else {
                continue;
            };
            centrality.add_edge(mechanism.source.as_str(), mechanism.target.as_str());
            degree[source] = degree[source].saturating_add(1);
            touching[source].push(mechanism);
            if target != source {
                degree[target] = degree[target].saturating_add(1);
                touching[target].push(mechanism);
            }
        }

        let degree_scores =
            normalize_by_max(&degree.iter().map(|count| f64::from(*count)).collect::<Vec<_>>());
        let betweenness_sample = (candidates.len() > self.config.betweenness_sample_threshold)
            .then_some(self.config.betweenness_samples.max(1));
        let betweenness_scores =
            normalize_by_max(&betweenness_centrality(&centrality, betweenness_sample));
        let closeness_scores = closeness_centrality(&centrality);
        let pagerank = page_rank(
            &centrality,
            PageRankConfig {
                damping: self.config.pagerank_damping,
                max_iterations: self.config.pagerank_max_iterations,
                tolerance: self.config.pagerank_tolerance,
            },
        );
        let pagerank_scores = normalize_by_max(&pagerank.scores);

        let mut nodes = candidates
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let evidence_score = mean_evidence(&touching[index]);
                let degree_score = degree_scores[index];
                let betweenness_score = betweenness_scores[index];
                let closeness = closeness_scores[index];
                let page_rank = pagerank_scores[index];
                let composite_score = weights.degree * degree_score
                    + weights.betweenness * betweenness_score
                    + weights.closeness * closeness
                    + weights.pagerank * page_rank
                    + weights.evidence * evidence_score;
                NodeImportance {
                    node_id: node.id.clone(),
                    label: node.label.clone(),
                    scale: node.scale,
                    categories: node.categories.clone(),
                    connections: node.connections,
                    degree_score,
                    betweenness_score,
                    closeness_centrality: closeness,
                    page_rank,
                    evidence_score,
                    composite_score,
                    rank: 0,
                }
            })
            .collect::<Vec<_>>();

        nodes.sort_by(|left, right| {
            right
                .composite_score
                .partial_cmp(&left.composite_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| left.node_id.cmp(&right.node_id))
        });
        if let Some(top_n) = top_n {
            nodes.truncate(top_n as usize);
        }
        for (position, node) in nodes.iter_mut().enumerate() {
            node.rank = position as u32 + 1;
        }

        tracing::debug!(
            candidates = candidates.len(),
            returned = nodes.len(),
            pagerank_iterations = pagerank.iterations,
            pagerank_converged = pagerank.converged,
            betweenness_sampled = betweenness_sample.is_some(),
            "importance ranking complete"
        );

        Ok(ImportanceRankingResult {
            schema_version: IMPORTANCE_SCHEMA_VERSION.to_owned(),
            categories: filter.categories().map(str::to_owned).collect(),
            scales: scales.into_iter().collect(),
            min_connections,
            total_candidates: candidates.len() as u32,
            weights,
            pagerank_iterations: pagerank.iterations as u32,
            pagerank_converged: pagerank.converged,
            betweenness_sampled: betweenness_sample.is_some(),
            nodes,
        })
    }
}

fn mean_evidence(mechanisms: &[&Mechanism]) -> f64 {
    if mechanisms.is_empty() {
        return 0.0;
    }
    let total = mechanisms
        .iter()
        .map(|mechanism| score_mechanism(mechanism))
        .sum::<f64>();
    total / mechanisms.len() as f64
}
