use std::collections::{BTreeMap, HashMap, VecDeque};

use causeway_config::{
    CrisisConfig, MAX_CRISIS_DEGREES, MAX_CRISIS_SEEDS, MAX_EVIDENCE_STRENGTH, MIN_CRISIS_DEGREES,
    MIN_CRISIS_SEEDS, MIN_EVIDENCE_STRENGTH,
};
use causeway_core::{
    CRISIS_SCALE, CategoryFilter, CausalGraph, Direction, EvidenceGrade, Mechanism,
};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, ensure_in_range};

const CRISIS_SUBGRAPH_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CrisisSubgraphRequest {
    pub crisis_node_ids: Vec<String>,
    #[serde(default)]
    pub max_degrees: Option<u32>,
    #[serde(default)]
    pub min_strength: Option<u8>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisNodeEntry {
    pub id: String,
    pub label: String,
    pub scale: Option<u8>,
    pub categories: Vec<String>,
    /// Reverse hops to the nearest crisis seed; seeds are 0.
    pub degree_from_crisis: u32,
    pub is_policy_lever: bool,
    pub is_crisis_endpoint: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisEdgeEntry {
    pub id: String,
    pub source: String,
    pub target: String,
    pub direction: Direction,
    pub evidence_quality: Option<EvidenceGrade>,
    pub evidence_strength: u8,
    pub study_count: u32,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisSubgraphStats {
    pub total_nodes: u32,
    pub total_edges: u32,
    pub policy_levers: u32,
    pub crisis_endpoints: u32,
    pub avg_out_degree: f64,
    pub max_degree_reached: u32,
    pub category_breakdown: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisSubgraphResult {
    pub schema_version: String,
    pub crisis_node_ids: Vec<String>,
    pub max_degrees: u32,
    pub min_strength: u8,
    pub categories: Vec<String>,
    pub nodes: Vec<CrisisNodeEntry>,
    pub edges: Vec<CrisisEdgeEntry>,
    pub stats: CrisisSubgraphStats,
}

#[derive(Debug, Clone, Default)]
pub struct CrisisExtractor {
    config: CrisisConfig,
}

impl CrisisExtractor {
    pub fn new(config: CrisisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CrisisConfig {
        &self.config
    }

    /// Upstream neighbourhood of the crisis seeds. Mechanisms below
    /// `min_strength` or outside the category filter are invisible to the
    /// traversal, and `max_degrees` counts layers including the seeds.
    pub fn extract(
        &self,
        graph: &CausalGraph,
        request: &CrisisSubgraphRequest,
    ) -> Result<CrisisSubgraphResult, AnalysisError> {
        let seed_count = u32::try_from(request.crisis_node_ids.len()).unwrap_or(u32::MAX);
        ensure_in_range(
            "crisis_node_ids",
            seed_count,
            MIN_CRISIS_SEEDS as u32,
            MAX_CRISIS_SEEDS as u32,
        )?;
        let max_degrees = ensure_in_range(
            "max_degrees",
            request.max_degrees.unwrap_or(self.config.default_max_degrees),
            MIN_CRISIS_DEGREES,
            MAX_CRISIS_DEGREES,
        )?;
        let min_strength = ensure_in_range(
            "min_strength",
            request.min_strength.unwrap_or(self.config.default_min_strength),
            MIN_EVIDENCE_STRENGTH,
            MAX_EVIDENCE_STRENGTH,
        )?;
        let filter = CategoryFilter::from_request(request.categories.as_deref());

        let mut seeds = Vec::<&str>::new();
        for raw in &request.crisis_node_ids {
            let node_id = raw.trim();
            if seeds.contains(&node_id) {
                continue;
            }
            let Some(node) = graph.node(node_id) else {
                return Err(AnalysisError::UnknownCrisisNode(node_id.to_owned()));
            };
            if node.scale != Some(CRISIS_SCALE) {
                return Err(AnalysisError::InvalidCrisisNode {
                    node_id: node_id.to_owned(),
                    found: node
                        .scale
                        .map(|scale| scale.to_string())
                        .unwrap_or_else(|| "no scale".to_owned()),
                });
            }
            seeds.push(node_id);
        }

        let qualifies = |mechanism: &Mechanism| {
            mechanism.evidence_strength() >= min_strength && filter.allows_mechanism(mechanism)
        };

        let mut degree_by_node = HashMap::<&str, u32>::new();
        let mut queue = VecDeque::new();
        for &seed in &seeds {
            degree_by_node.insert(seed, 0);
            queue.push_back(seed);
        }
        while let Some(current) = queue.pop_front() {
            let degree = degree_by_node.get(current).copied().unwrap_or(0);
            if degree + 1 >= max_degrees {
                continue;
            }
            for index in graph.incoming(current) {
                let Some(mechanism) = graph.mechanism(*index) else {
                    continue;
                };
                if !qualifies(mechanism) {
                    continue;
                }
                let upstream = mechanism.source.as_str();
                if degree_by_node.contains_key(upstream) {
                    continue;
                }
                degree_by_node.insert(upstream, degree + 1);
                queue.push_back(upstream);
            }
        }

        let mut nodes = degree_by_node
            .iter()
            .filter_map(|(node_id, degree)| {
                let node = graph.node(node_id)?;
                Some(CrisisNodeEntry {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    scale: node.scale,
                    categories: node.categories.clone(),
                    degree_from_crisis: *degree,
                    is_policy_lever: node.is_policy_lever(),
                    is_crisis_endpoint: seeds.contains(node_id),
                })
            })
            .collect::<Vec<_>>();
        nodes.sort_by(|left, right| {
            left.degree_from_crisis
                .cmp(&right.degree_from_crisis)
                .then_with(|| left.id.cmp(&right.id))
        });

        let mut edges = graph
            .traversable_mechanisms()
            .map(|(_, mechanism)| mechanism)
            .filter(|&mechanism| qualifies(mechanism))
            .filter(|mechanism| {
                degree_by_node.contains_key(mechanism.source.as_str())
                    && degree_by_node.contains_key(mechanism.target.as_str())
            })
            .map(|mechanism| CrisisEdgeEntry {
                id: mechanism.id.clone(),
                source: mechanism.source.clone(),
                target: mechanism.target.clone(),
                direction: mechanism.direction,
                evidence_quality: mechanism.evidence_quality,
                evidence_strength: mechanism.evidence_strength(),
                study_count: mechanism.study_count,
                categories: mechanism.categories.clone(),
            })
            .collect::<Vec<_>>();
        edges.sort_by(|left, right| {
            left.source
                .cmp(&right.source)
                .then_with(|| left.target.cmp(&right.target))
                .then_with(|| left.id.cmp(&right.id))
        });

        let stats = subgraph_stats(&nodes, &edges);
        tracing::debug!(
            seeds = seeds.len(),
            max_degrees,
            min_strength,
            nodes = stats.total_nodes,
            edges = stats.total_edges,
            "crisis subgraph extracted"
        );

        Ok(CrisisSubgraphResult {
            schema_version: CRISIS_SUBGRAPH_SCHEMA_VERSION.to_owned(),
            crisis_node_ids: seeds.iter().map(|seed| (*seed).to_owned()).collect(),
            max_degrees,
            min_strength,
            categories: filter.categories().map(str::to_owned).collect(),
            nodes,
            edges,
            stats,
        })
    }
}

fn subgraph_stats(nodes: &[CrisisNodeEntry], edges: &[CrisisEdgeEntry]) -> CrisisSubgraphStats {
    let mut category_breakdown = BTreeMap::<String, u32>::new();
    for node in nodes {
        for category in &node.categories {
            let category = category.trim();
            if category.is_empty() {
                continue;
            }
            let count = category_breakdown.entry(category.to_owned()).or_insert(0);
            *count = count.saturating_add(1);
        }
    }

    let total_nodes = nodes.len() as u32;
    let total_edges = edges.len() as u32;
    CrisisSubgraphStats {
        total_nodes,
        total_edges,
        policy_levers: nodes.iter().filter(|node| node.is_policy_lever).count() as u32,
        crisis_endpoints: nodes.iter().filter(|node| node.is_crisis_endpoint).count() as u32,
        avg_out_degree: if total_nodes == 0 {
            0.0
        } else {
            f64::from(total_edges) / f64::from(total_nodes)
        },
        max_degree_reached: nodes
            .iter()
            .map(|node| node.degree_from_crisis)
            .max()
            .unwrap_or(0),
        category_breakdown,
    }
}
