use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use causeway_config::{MAX_PATH_DEPTH, MAX_PATHS, MIN_PATH_DEPTH, MIN_PATHS, PathfindingConfig};
use causeway_core::{
    CategoryFilter, CausalGraph, Direction, EvidenceGrade, EvidenceStrength, Mechanism,
    MechanismIndex, aggregate_path_evidence, average_grade_strength, score_mechanism,
    weakest_grade, weighted_path_score,
};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, ensure_in_range};

const PATHFINDING_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PathAlgorithm {
    #[default]
    Shortest,
    StrongestEvidence,
    AllSimple,
}

impl PathAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shortest => "shortest",
            Self::StrongestEvidence => "strongest_evidence",
            Self::AllSimple => "all_simple",
        }
    }
}

impl std::str::FromStr for PathAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "shortest" => Ok(Self::Shortest),
            "strongest_evidence" => Ok(Self::StrongestEvidence),
            "all_simple" => Ok(Self::AllSimple),
            other => Err(format!(
                "invalid algorithm '{other}', expected one of: shortest, strongest_evidence, all_simple"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathDirection {
    Positive,
    Negative,
    /// Some hop is backed by parallel mechanisms of opposite direction.
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathRequest {
    pub from_node: String,
    pub to_node: String,
    #[serde(default)]
    pub algorithm: Option<PathAlgorithm>,
    #[serde(default)]
    pub max_depth: Option<u32>,
    #[serde(default)]
    pub max_paths: Option<u32>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNodeEntry {
    pub id: String,
    pub label: String,
    pub scale: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMechanismEntry {
    pub id: String,
    pub source: String,
    pub target: String,
    pub direction: Direction,
    pub evidence_quality: Option<EvidenceGrade>,
    pub study_count: u32,
    pub evidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub nodes: Vec<PathNodeEntry>,
    pub mechanisms: Vec<PathMechanismEntry>,
    pub hop_count: u32,
    /// Mean grade on the 0..=3 scale (`C = 1`, `A = 3`).
    pub avg_evidence: f64,
    /// Weakest-link grade across the path.
    pub evidence_grade: EvidenceGrade,
    pub evidence_score: f64,
    pub evidence_strength: EvidenceStrength,
    pub direction: PathDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathfindingResult {
    pub schema_version: String,
    pub from_node: String,
    pub to_node: String,
    pub algorithm: PathAlgorithm,
    pub max_depth: u32,
    pub max_paths: u32,
    pub categories: Vec<String>,
    pub paths_found: u32,
    pub paths: Vec<PathResult>,
}

#[derive(Debug, Clone, Default)]
pub struct Pathfinder {
    config: PathfindingConfig,
}

struct SearchContext<'a> {
    graph: &'a CausalGraph,
    filter: CategoryFilter,
}

impl<'a> SearchContext<'a> {
    /// Outgoing mechanisms that survive the per-query filter, in adjacency
    /// order.
    fn outgoing(&self, node_id: &str) -> Vec<(MechanismIndex, &'a Mechanism)> {
        let graph = self.graph;
        graph
            .outgoing(node_id)
            .iter()
            .filter_map(|index| graph.mechanism(*index).map(|mechanism| (*index, mechanism)))
            .filter(|(_, mechanism)| self.filter.allows_mechanism(mechanism))
            .collect()
    }

    fn mechanism(&self, index: MechanismIndex) -> Option<&'a Mechanism> {
        self.graph.mechanism(index)
    }

    fn mechanisms(&self, path: &[MechanismIndex]) -> Vec<&'a Mechanism> {
        path.iter()
            .filter_map(|index| self.mechanism(*index))
            .collect()
    }
}

impl Pathfinder {
    pub fn new(config: PathfindingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PathfindingConfig {
        &self.config
    }

    pub fn find_paths(
        &self,
        graph: &CausalGraph,
        request: &PathRequest,
    ) -> Result<PathfindingResult, AnalysisError> {
        let algorithm = request.algorithm.unwrap_or_default();
        let max_depth = ensure_in_range(
            "max_depth",
            request.max_depth.unwrap_or(self.config.default_max_depth),
            MIN_PATH_DEPTH,
            MAX_PATH_DEPTH,
        )?;
        let max_paths = ensure_in_range(
            "max_paths",
            request.max_paths.unwrap_or(self.config.default_max_paths),
            MIN_PATHS,
            MAX_PATHS,
        )?;
        let filter = CategoryFilter::from_request(request.categories.as_deref());
        let from_node = request.from_node.trim();
        let to_node = request.to_node.trim();

        let context = SearchContext { graph, filter };
        let raw_paths = if from_node == to_node
            || !graph.contains_node(from_node)
            || !graph.contains_node(to_node)
        {
            Vec::new()
        } else {
            match algorithm {
                PathAlgorithm::Shortest => shortest_paths(
                    &context,
                    from_node,
                    to_node,
                    max_depth,
                    max_paths as usize,
                    self.config.shortest_enumeration_cap,
                ),
                PathAlgorithm::StrongestEvidence => strongest_evidence_paths(
                    &context,
                    from_node,
                    to_node,
                    max_depth,
                    max_paths as usize,
                    self.config.best_first_expansion_cap,
                ),
                PathAlgorithm::AllSimple => {
                    all_simple_paths(&context, from_node, to_node, max_depth, max_paths as usize)
                }
            }
        };

        let paths = raw_paths
            .iter()
            .filter_map(|path| describe_path(&context, from_node, path))
            .collect::<Vec<_>>();

        tracing::debug!(
            algorithm = algorithm.as_str(),
            from = from_node,
            to = to_node,
            max_depth,
            max_paths,
            paths_found = paths.len(),
            "pathfinding complete"
        );

        Ok(PathfindingResult {
            schema_version: PATHFINDING_SCHEMA_VERSION.to_owned(),
            from_node: from_node.to_owned(),
            to_node: to_node.to_owned(),
            algorithm,
            max_depth,
            max_paths,
            categories: context.filter.categories().map(str::to_owned).collect(),
            paths_found: paths.len() as u32,
            paths,
        })
    }
}

/// Layered BFS with a global distance map. Every minimal-hop predecessor is
/// kept so equal-length alternatives can be ranked by evidence afterwards.
fn shortest_paths(
    context: &SearchContext<'_>,
    from_node: &str,
    to_node: &str,
    max_depth: u32,
    max_paths: usize,
    enumeration_cap: usize,
) -> Vec<Vec<MechanismIndex>> {
    let mut distance = HashMap::<&str, u32>::new();
    let mut predecessors = HashMap::<&str, Vec<MechanismIndex>>::new();
    let mut queue = VecDeque::new();

    distance.insert(from_node, 0);
    queue.push_back(from_node);
    while let Some(current) = queue.pop_front() {
        let depth = distance.get(current).copied().unwrap_or(0);
        if current == to_node || depth >= max_depth {
            continue;
        }
        if distance.get(to_node).is_some_and(|target_depth| depth >= *target_depth) {
            continue;
        }

        for (index, mechanism) in context.outgoing(current) {
            let next = mechanism.target.as_str();
            match distance.get(next).copied() {
                None => {
                    distance.insert(next, depth + 1);
                    predecessors.entry(next).or_default().push(index);
                    queue.push_back(next);
                }
                Some(next_depth) if next_depth == depth + 1 => {
                    predecessors.entry(next).or_default().push(index);
                }
                Some(_) => {}
            }
        }
    }

    if !distance.contains_key(to_node) {
        return Vec::new();
    }

    let mut paths = Vec::new();
    let mut suffix = Vec::new();
    collect_predecessor_paths(
        context,
        &predecessors,
        from_node,
        to_node,
        &mut suffix,
        &mut paths,
        enumeration_cap.max(max_paths),
    );

    let mut scored = paths
        .into_iter()
        .map(|path| {
            let score = aggregate_path_evidence(&context.mechanisms(&path));
            (path, score)
        })
        .collect::<Vec<_>>();
    scored.sort_by(|left, right| {
        right
            .1
            .partial_cmp(&left.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| path_sort_key(context, &left.0).cmp(&path_sort_key(context, &right.0)))
    });
    scored
        .into_iter()
        .take(max_paths)
        .map(|(path, _)| path)
        .collect()
}

fn collect_predecessor_paths(
    context: &SearchContext<'_>,
    predecessors: &HashMap<&str, Vec<MechanismIndex>>,
    from_node: &str,
    current: &str,
    suffix: &mut Vec<MechanismIndex>,
    paths: &mut Vec<Vec<MechanismIndex>>,
    cap: usize,
) {
    if current == from_node {
        paths.push(suffix.iter().rev().copied().collect());
        return;
    }
    for &index in predecessors.get(current).map(Vec::as_slice).unwrap_or(&[]) {
        if paths.len() >= cap {
            return;
        }
        let Some(mechanism) = context.mechanism(index) else {
            continue;
        };
        suffix.push(index);
        collect_predecessor_paths(
            context,
            predecessors,
            from_node,
            mechanism.source.as_str(),
            suffix,
            paths,
            cap,
        );
        suffix.pop();
    }
}

/// Node-id sequence, then mechanism ids: the deterministic tie-break for
/// paths with equal evidence.
fn path_sort_key<'a>(context: &SearchContext<'a>, path: &[MechanismIndex]) -> Vec<&'a str> {
    let mechanisms = context.mechanisms(path);
    mechanisms
        .iter()
        .map(|mechanism| mechanism.target.as_str())
        .chain(mechanisms.iter().map(|mechanism| mechanism.id.as_str()))
        .collect()
}

#[derive(Debug)]
struct Frontier<'a> {
    score: f64,
    nodes: Vec<&'a str>,
    mechanisms: Vec<MechanismIndex>,
    mechanism_ids: Vec<&'a str>,
    scores: Vec<f64>,
}

impl PartialEq for Frontier<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier<'_> {}

impl PartialOrd for Frontier<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier<'_> {
    // Max-heap order: higher score, then fewer hops, then the smaller node
    // and mechanism id sequences pop first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.mechanisms.len().cmp(&self.mechanisms.len()))
            .then_with(|| other.nodes.cmp(&self.nodes))
            .then_with(|| other.mechanism_ids.cmp(&self.mechanism_ids))
    }
}

/// Best-first search over partial paths ordered by aggregate evidence. Each
/// partial path carries its own visited set (its node list).
///
/// The position-weighted score can rise when a hop is appended, so a path
/// popped later may outscore one completed earlier. Every completed path is
/// collected and ranked once the frontier is exhausted or the expansion cap
/// is reached.
fn strongest_evidence_paths(
    context: &SearchContext<'_>,
    from_node: &str,
    to_node: &str,
    max_depth: u32,
    max_paths: usize,
    expansion_cap: usize,
) -> Vec<Vec<MechanismIndex>> {
    let mut completed = Vec::new();
    let mut frontier = BinaryHeap::new();
    frontier.push(Frontier {
        score: 0.0,
        nodes: vec![from_node],
        mechanisms: Vec::new(),
        mechanism_ids: Vec::new(),
        scores: Vec::new(),
    });

    let mut expansions = 0usize;
    while let Some(candidate) = frontier.pop() {
        expansions += 1;
        if expansions > expansion_cap {
            tracing::debug!(expansion_cap, "strongest-evidence search hit expansion cap");
            break;
        }

        let Some(current) = candidate.nodes.last().copied() else {
            continue;
        };
        if current == to_node {
            completed.push((candidate.mechanisms, candidate.score));
            continue;
        }
        if candidate.mechanisms.len() as u32 >= max_depth {
            continue;
        }

        for (index, mechanism) in context.outgoing(current) {
            let next = mechanism.target.as_str();
            if candidate.nodes.contains(&next) {
                continue;
            }
            let mut nodes = candidate.nodes.clone();
            nodes.push(next);
            let mut mechanisms = candidate.mechanisms.clone();
            mechanisms.push(index);
            let mut mechanism_ids = candidate.mechanism_ids.clone();
            mechanism_ids.push(mechanism.id.as_str());
            let mut scores = candidate.scores.clone();
            scores.push(score_mechanism(mechanism));
            frontier.push(Frontier {
                score: weighted_path_score(&scores),
                nodes,
                mechanisms,
                mechanism_ids,
                scores,
            });
        }
    }

    completed.sort_by(|left, right| {
        right
            .1
            .total_cmp(&left.1)
            .then_with(|| left.0.len().cmp(&right.0.len()))
            .then_with(|| path_sort_key(context, &left.0).cmp(&path_sort_key(context, &right.0)))
    });
    completed
        .into_iter()
        .take(max_paths)
        .map(|(path, _)| path)
        .collect()
}

/// Depth-first enumeration of simple paths with a path-local visited set.
fn all_simple_paths(
    context: &SearchContext<'_>,
    from_node: &str,
    to_node: &str,
    max_depth: u32,
    max_paths: usize,
) -> Vec<Vec<MechanismIndex>> {
    let mut paths = Vec::new();
    let mut on_path = HashSet::new();
    let mut stack = Vec::new();
    on_path.insert(from_node);
    walk_simple_paths(
        context,
        from_node,
        to_node,
        max_depth as usize,
        max_paths,
        &mut on_path,
        &mut stack,
        &mut paths,
    );

    let mut scored = paths
        .into_iter()
        .map(|path| {
            let score = aggregate_path_evidence(&context.mechanisms(&path));
            (path, score)
        })
        .collect::<Vec<_>>();
    scored.sort_by(|left, right| {
        left.0
            .len()
            .cmp(&right.0.len())
            .then_with(|| right.1.partial_cmp(&left.1).unwrap_or(Ordering::Equal))
    });
    scored.into_iter().map(|(path, _)| path).collect()
}

#[allow(clippy::too_many_arguments)]
fn walk_simple_paths<'a>(
    context: &SearchContext<'a>,
    current: &str,
    to_node: &str,
    max_depth: usize,
    max_paths: usize,
    on_path: &mut HashSet<&'a str>,
    stack: &mut Vec<MechanismIndex>,
    paths: &mut Vec<Vec<MechanismIndex>>,
) {
    if paths.len() >= max_paths || stack.len() >= max_depth {
        return;
    }
    for (index, mechanism) in context.outgoing(current) {
        if paths.len() >= max_paths {
            return;
        }
        let next = mechanism.target.as_str();
        if on_path.contains(next) {
            continue;
        }
        stack.push(index);
        if next == to_node {
            paths.push(stack.clone());
        } else {
            on_path.insert(next);
            walk_simple_paths(
                context, next, to_node, max_depth, max_paths, on_path, stack, paths,
            );
            on_path.remove(next);
        }
        stack.pop();
    }
}

fn describe_path(
    context: &SearchContext<'_>,
    from_node: &str,
    path: &[MechanismIndex],
) -> Option<PathResult> {
    let mechanisms = context.mechanisms(path);
    if mechanisms.is_empty() || mechanisms.len() != path.len() {
        return None;
    }

    let node_ids = std::iter::once(from_node)
        .chain(mechanisms.iter().map(|mechanism| mechanism.target.as_str()))
        .collect::<Vec<_>>();
    let nodes = node_ids
        .iter()
        .map(|node_id| {
            let node = context.graph.node(node_id);
            PathNodeEntry {
                id: (*node_id).to_owned(),
                label: node
                    .map(|node| node.label.clone())
                    .unwrap_or_else(|| (*node_id).to_owned()),
                scale: node.and_then(|node| node.scale),
            }
        })
        .collect();

    let evidence_score = aggregate_path_evidence(&mechanisms);
    Some(PathResult {
        nodes,
        mechanisms: mechanisms
            .iter()
            .map(|mechanism| PathMechanismEntry {
                id: mechanism.id.clone(),
                source: mechanism.source.clone(),
                target: mechanism.target.clone(),
                direction: mechanism.direction,
                evidence_quality: mechanism.evidence_quality,
                study_count: mechanism.study_count,
                evidence_score: score_mechanism(mechanism),
            })
            .collect(),
        hop_count: mechanisms.len() as u32,
        avg_evidence: average_grade_strength(&mechanisms),
        evidence_grade: weakest_grade(&mechanisms).unwrap_or(EvidenceGrade::C),
        evidence_score,
        evidence_strength: EvidenceStrength::classify(evidence_score),
        direction: net_direction(context, &mechanisms),
    })
}

/// Product of edge signs; `Mixed` when any hop has a parallel mechanism
/// (within the query filter) pointing the other way.
fn net_direction(context: &SearchContext<'_>, mechanisms: &[&Mechanism]) -> PathDirection {
    let mut negative_edges = 0usize;
    for mechanism in mechanisms {
        let conflicting = context
            .outgoing(mechanism.source.as_str())
            .into_iter()
            .any(|(_, parallel)| {
                parallel.target == mechanism.target && parallel.direction != mechanism.direction
            });
        if conflicting {
            return PathDirection::Mixed;
        }
        if mechanism.direction == Direction::Negative {
            negative_edges += 1;
        }
    }
    if negative_edges % 2 == 0 {
        PathDirection::Positive
    } else {
        PathDirection::Negative
    }
}

#[cfg(test)]
mod tests {
    use causeway_core::{Node, build_graph};

    use super::*;

    fn edge(id: &str, source: &str, target: &str, grade: EvidenceGrade) -> Mechanism {
        Mechanism::new(id, source, target, Direction::Positive).with_grade(grade)
    }

    fn request(from: &str, to: &str, algorithm: PathAlgorithm) -> PathRequest {
        PathRequest {
            from_node: from.to_owned(),
            to_node: to.to_owned(),
            algorithm: Some(algorithm),
            ..PathRequest::default()
        }
    }

    /// a -> b -> d (C then A), a -> c -> d (A then A), a -> d via e in 3 hops.
    fn diamond() -> CausalGraph {
        build_graph(
            vec![
                edge("ab", "a", "b", EvidenceGrade::C),
                edge("bd", "b", "d", EvidenceGrade::A),
                edge("ac", "a", "c", EvidenceGrade::A),
                edge("cd", "c", "d", EvidenceGrade::A),
                edge("ae", "a", "e", EvidenceGrade::A),
                edge("ef", "e", "f", EvidenceGrade::A),
                edge("fd", "f", "d", EvidenceGrade::A),
            ],
            None,
        )
    }

    fn node_ids(path: &PathResult) -> Vec<&str> {
        path.nodes.iter().map(|node| node.id.as_str()).collect()
    }

    #[test]
    fn shortest_returns_minimal_hops_ranked_by_evidence() {
        let graph = diamond();
        let result = Pathfinder::default()
            .find_paths(&graph, &request("a", "d", PathAlgorithm::Shortest))
            .expect("find paths");

        assert_eq!(result.paths_found, 2);
        assert!(result.paths.iter().all(|path| path.hop_count == 2));
        assert_eq!(node_ids(&result.paths[0]), vec!["a", "c", "d"]);
        assert_eq!(node_ids(&result.paths[1]), vec!["a", "b", "d"]);
        assert_eq!(result.paths[1].evidence_grade, EvidenceGrade::C);
    }

    #[test]
    fn all_simple_enumerates_every_path_within_depth() {
        let graph = diamond();
        let mut all = request("a", "d", PathAlgorithm::AllSimple);
        all.max_paths = Some(50);
        let result = Pathfinder::default()
            .find_paths(&graph, &all)
            .expect("find paths");
        assert_eq!(result.paths_found, 3);
        assert_eq!(result.paths[2].hop_count, 3);

        all.max_depth = Some(2);
        let shallow = Pathfinder::default()
            .find_paths(&graph, &all)
            .expect("find paths");
        assert_eq!(shallow.paths_found, 2);

        all.max_depth = Some(5);
        all.max_paths = Some(1);
        let capped = Pathfinder::default()
            .find_paths(&graph, &all)
            .expect("find paths");
        assert_eq!(capped.paths_found, 1);
    }

    #[test]
    fn strongest_evidence_prefers_well_supported_paths() {
        let graph = diamond();
        let mut strongest = request("a", "d", PathAlgorithm::StrongestEvidence);
        strongest.max_paths = Some(3);
        let result = Pathfinder::default()
            .find_paths(&graph, &strongest)
            .expect("find paths");

        assert_eq!(result.paths_found, 3);
        let last = result.paths.last().expect("weakest path");
        assert_eq!(node_ids(last), vec!["a", "b", "d"]);
        assert!(result.paths[0].evidence_score >= result.paths[1].evidence_score);
        assert_eq!(result.paths[0].evidence_grade, EvidenceGrade::A);
    }

    #[test]
    fn strongest_evidence_ranks_late_completions_above_early_ones() {
        // The direct B edge completes first, but the C-then-A detour scores
        // higher because the final hop carries more weight.
        let graph = build_graph(
            vec![
                edge("ax", "a", "x", EvidenceGrade::C),
                edge("xt", "x", "t", EvidenceGrade::A),
                edge("at", "a", "t", EvidenceGrade::B),
            ],
            None,
        );
        let pathfinder = Pathfinder::default();

        let mut single = request("a", "t", PathAlgorithm::StrongestEvidence);
        single.max_paths = Some(1);
        let best = pathfinder.find_paths(&graph, &single).expect("find paths");
        assert_eq!(best.paths_found, 1);
        assert_eq!(node_ids(&best.paths[0]), vec!["a", "x", "t"]);

        let mut both = request("a", "t", PathAlgorithm::StrongestEvidence);
        both.max_paths = Some(2);
        let ranked = pathfinder.find_paths(&graph, &both).expect("find paths");
        assert_eq!(ranked.paths_found, 2);
        assert_eq!(node_ids(&ranked.paths[0]), vec!["a", "x", "t"]);
        assert_eq!(node_ids(&ranked.paths[1]), vec!["a", "t"]);
        assert!(ranked.paths[0].evidence_score > ranked.paths[1].evidence_score);
    }

    #[test]
    fn strongest_evidence_breaks_ties_by_mechanism_id() {
        let forward = vec![
            edge("m1", "a", "b", EvidenceGrade::A),
            edge("m2", "a", "b", EvidenceGrade::A),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        let pathfinder = Pathfinder::default();

        for mechanisms in [forward, reversed] {
            let graph = build_graph(mechanisms, None);
            let result = pathfinder
                .find_paths(&graph, &request("a", "b", PathAlgorithm::StrongestEvidence))
                .expect("find paths");
            let ids = result
                .paths
                .iter()
                .map(|path| path.mechanisms[0].id.as_str())
                .collect::<Vec<_>>();
            assert_eq!(ids, vec!["m1", "m2"]);
        }
    }

    #[test]
    fn cycles_are_never_revisited_within_a_path() {
        let graph = build_graph(
            vec![
                edge("ab", "a", "b", EvidenceGrade::B),
                edge("ba", "b", "a", EvidenceGrade::B),
                edge("bc", "b", "c", EvidenceGrade::B),
                edge("cb", "c", "b", EvidenceGrade::B),
            ],
            None,
        );
        for algorithm in [
            PathAlgorithm::Shortest,
            PathAlgorithm::StrongestEvidence,
            PathAlgorithm::AllSimple,
        ] {
            let mut search = request("a", "c", algorithm);
            search.max_paths = Some(50);
            search.max_depth = Some(8);
            let result = Pathfinder::default()
                .find_paths(&graph, &search)
                .expect("find paths");
            assert_eq!(result.paths_found, 1, "{}", algorithm.as_str());
            let ids = node_ids(&result.paths[0]);
            let unique = ids.iter().collect::<HashSet<_>>();
            assert_eq!(unique.len(), ids.len());
        }
    }

    #[test]
    fn direction_multiplies_signs_and_flags_conflicting_parallel_edges() {
        let negative = |id: &str, source: &str, target: &str| {
            Mechanism::new(id, source, target, Direction::Negative).with_grade(EvidenceGrade::B)
        };
        let graph = build_graph(
            vec![
                negative("ab", "a", "b"),
                negative("bc", "b", "c"),
                negative("cd", "c", "d"),
                edge("xy", "x", "y", EvidenceGrade::A),
                negative("xy-neg", "x", "y"),
            ],
            None,
        );
        let pathfinder = Pathfinder::default();

        let two = pathfinder
            .find_paths(&graph, &request("a", "c", PathAlgorithm::Shortest))
            .expect("find paths");
        assert_eq!(two.paths[0].direction, PathDirection::Positive);

        let three = pathfinder
            .find_paths(&graph, &request("a", "d", PathAlgorithm::Shortest))
            .expect("find paths");
        assert_eq!(three.paths[0].direction, PathDirection::Negative);

        let mixed = pathfinder
            .find_paths(&graph, &request("x", "y", PathAlgorithm::AllSimple))
            .expect("find paths");
        assert_eq!(mixed.paths_found, 2);
        assert!(
            mixed
                .paths
                .iter()
                .all(|path| path.direction == PathDirection::Mixed)
        );
    }

    #[test]
    fn category_filter_hides_edges_for_this_search_only() {
        let graph = build_graph(
            vec![
                edge("ab", "a", "b", EvidenceGrade::A).with_categories(["housing"]),
                edge("bc", "b", "c", EvidenceGrade::A).with_categories(["housing"]),
                edge("ac", "a", "c", EvidenceGrade::A).with_categories(["income"]),
            ],
            None,
        );
        let mut filtered = request("a", "c", PathAlgorithm::Shortest);
        filtered.categories = Some(vec!["Housing".to_owned()]);

        let pathfinder = Pathfinder::default();
        let result = pathfinder.find_paths(&graph, &filtered).expect("find paths");
        assert_eq!(result.paths_found, 1);
        assert_eq!(result.paths[0].hop_count, 2);
        assert_eq!(result.categories, vec!["housing"]);

        let unfiltered = pathfinder
            .find_paths(&graph, &request("a", "c", PathAlgorithm::Shortest))
            .expect("find paths");
        assert_eq!(unfiltered.paths[0].hop_count, 1);
    }

    #[test]
    fn unknown_or_identical_endpoints_yield_empty_results() {
        let graph = diamond();
        let pathfinder = Pathfinder::default();
        for (from, to) in [("a", "ghost"), ("ghost", "d"), ("a", "a"), ("d", "a")] {
            let result = pathfinder
                .find_paths(&graph, &request(from, to, PathAlgorithm::Shortest))
                .expect("empty result is not an error");
            assert_eq!(result.paths_found, 0);
            assert!(result.paths.is_empty());
        }
    }

    #[test]
    fn bounds_outside_documented_ranges_are_rejected() {
        let graph = diamond();
        let pathfinder = Pathfinder::default();

        let mut deep = request("a", "d", PathAlgorithm::Shortest);
        deep.max_depth = Some(9);
        let err = pathfinder.find_paths(&graph, &deep).expect_err("depth too large");
        assert!(err.is_validation());
        assert!(err.to_string().contains("max_depth"));

        let mut none = request("a", "d", PathAlgorithm::Shortest);
        none.max_paths = Some(0);
        let err = pathfinder.find_paths(&graph, &none).expect_err("zero paths");
        assert!(err.to_string().contains("max_paths must be between 1 and 50"));
    }

    #[test]
    fn path_nodes_carry_labels_and_scales() {
        let graph = build_graph(
            vec![edge("ab", "a", "b", EvidenceGrade::B)],
            Some(vec![
                Node::new("a", "Minimum wage", Some(1)),
                Node::new("b", "Food insecurity", Some(5)),
            ]),
        );
        let result = Pathfinder::default()
            .find_paths(&graph, &request("a", "b", PathAlgorithm::Shortest))
            .expect("find paths");
        let path = &result.paths[0];
        assert_eq!(path.nodes[0].label, "Minimum wage");
        assert_eq!(path.nodes[1].scale, Some(5));
        assert!((path.avg_evidence - 2.0).abs() < 1e-12);
        assert_eq!(path.evidence_strength, EvidenceStrength::Moderate);
    }
}
