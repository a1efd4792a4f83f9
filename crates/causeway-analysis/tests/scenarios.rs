use std::collections::BTreeSet;

use causeway_analysis::{
    CausalEngine, CrisisExtractor, CrisisSubgraphRequest, ImportanceRanker, ImportanceRequest,
    PathAlgorithm, PathDirection, PathRequest, Pathfinder,
};
use causeway_core::{
    CausalGraph, Direction, EvidenceGrade, GraphSnapshot, Mechanism, Node, build_graph,
};

fn mechanism(id: &str, source: &str, target: &str, grade: EvidenceGrade) -> Mechanism {
    Mechanism::new(id, source, target, Direction::Positive).with_grade(grade)
}

fn chain_snapshot() -> GraphSnapshot {
    GraphSnapshot::new(
        vec![
            mechanism("ab", "A", "B", EvidenceGrade::A),
            mechanism("bc", "B", "C", EvidenceGrade::B),
            mechanism("cd", "C", "D", EvidenceGrade::A),
        ],
        Some(vec![
            Node::new("A", "Zoning policy", Some(1)),
            Node::new("B", "Rent burden", Some(4)),
            Node::new("C", "Eviction", Some(6)),
            Node::new("D", "Homelessness", Some(7)),
        ]),
    )
}

/// Twelve nodes with `i -> i+1` and `i -> i+3` edges, grades cycling A/B/C.
/// Node 11 is the only crisis node.
fn lattice() -> CausalGraph {
    let grades = [EvidenceGrade::A, EvidenceGrade::B, EvidenceGrade::C];
    let mut mechanisms = Vec::new();
    for index in 0..12usize {
        for step in [1usize, 3] {
            let target = index + step;
            if target >= 12 {
                continue;
            }
            mechanisms.push(
                mechanism(
                    &format!("m{index:02}-{target:02}"),
                    &format!("n{index:02}"),
                    &format!("n{target:02}"),
                    grades[(index + step) % grades.len()],
                )
                .with_study_count((index * 7 % 20) as u32),
            );
        }
    }
    let nodes = (0..12usize)
        .map(|index| {
            let scale = if index == 11 { 7 } else { (index % 6) as u8 + 1 };
            Node::new(format!("n{index:02}"), format!("Node {index}"), Some(scale))
        })
        .collect();
    build_graph(mechanisms, Some(nodes))
}

fn path_request(from: &str, to: &str, algorithm: PathAlgorithm) -> PathRequest {
    PathRequest {
        from_node: from.to_owned(),
        to_node: to.to_owned(),
        algorithm: Some(algorithm),
        max_depth: Some(8),
        max_paths: Some(50),
        categories: None,
    }
}

#[test]
fn chain_round_trip_through_the_engine() -> Result<(), Box<dyn std::error::Error>> {
    let engine = CausalEngine::default();
    let snapshot = chain_snapshot();

    let paths = engine.find_paths(
        &snapshot,
        &PathRequest {
            from_node: "A".to_owned(),
            to_node: "D".to_owned(),
            ..PathRequest::default()
        },
    )?;
    assert_eq!(paths.algorithm, PathAlgorithm::Shortest);
    assert_eq!(paths.paths_found, 1);
    let path = &paths.paths[0];
    assert_eq!(path.hop_count, 3);
    assert_eq!(path.evidence_grade, EvidenceGrade::B);
    assert_eq!(path.direction, PathDirection::Positive);
    let node_ids = path
        .nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(node_ids, vec!["A", "B", "C", "D"]);

    let crisis = engine.crisis_subgraph(
        &snapshot,
        &CrisisSubgraphRequest {
            crisis_node_ids: vec!["D".to_owned()],
            max_degrees: Some(2),
            ..CrisisSubgraphRequest::default()
        },
    )?;
    let crisis_ids = crisis
        .nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<BTreeSet<_>>();
    assert_eq!(crisis_ids, BTreeSet::from(["C", "D"]));
    assert_eq!(crisis.stats.total_edges, 1);
    assert_eq!(crisis.stats.crisis_endpoints, 1);

    let ranking = engine.rank_nodes(&snapshot, &ImportanceRequest::default())?;
    let position = |id: &str| {
        ranking
            .nodes
            .iter()
            .position(|node| node.node_id == id)
            .expect("every chain node is ranked")
    };
    assert!(position("B") < position("A"));
    assert!(position("B") < position("D"));
    assert!(position("C") < position("A"));
    Ok(())
}

#[test]
fn empty_graph_yields_empty_results() -> Result<(), Box<dyn std::error::Error>> {
    let graph = build_graph(Vec::new(), None);

    for algorithm in [
        PathAlgorithm::Shortest,
        PathAlgorithm::StrongestEvidence,
        PathAlgorithm::AllSimple,
    ] {
        let result =
            Pathfinder::default().find_paths(&graph, &path_request("a", "b", algorithm))?;
        assert_eq!(result.paths_found, 0);
    }

    let ranking = ImportanceRanker::default().rank(&graph, &ImportanceRequest::default())?;
    assert_eq!(ranking.total_candidates, 0);
    assert!(ranking.nodes.is_empty());
    Ok(())
}

#[test]
fn seed_without_incoming_mechanisms_stands_alone() -> Result<(), Box<dyn std::error::Error>> {
    let graph = build_graph(
        vec![mechanism("m1", "crisis", "other", EvidenceGrade::A)],
        Some(vec![
            Node::new("crisis", "Acute crisis", Some(7)),
            Node::new("other", "Downstream", Some(7)),
        ]),
    );
    let result = CrisisExtractor::default().extract(
        &graph,
        &CrisisSubgraphRequest {
            crisis_node_ids: vec!["crisis".to_owned()],
            ..CrisisSubgraphRequest::default()
        },
    )?;

    assert_eq!(result.stats.total_nodes, 1);
    assert_eq!(result.stats.total_edges, 0);
    assert!(result.nodes[0].is_crisis_endpoint);
    assert_eq!(result.nodes[0].degree_from_crisis, 0);
    Ok(())
}

#[test]
fn repeated_queries_are_identical() -> Result<(), Box<dyn std::error::Error>> {
    let graph = lattice();
    let pathfinder = Pathfinder::default();

    for algorithm in [
        PathAlgorithm::Shortest,
        PathAlgorithm::StrongestEvidence,
        PathAlgorithm::AllSimple,
    ] {
        let request = path_request("n00", "n11", algorithm);
        let first = pathfinder.find_paths(&graph, &request)?;
        let second = pathfinder.find_paths(&graph, &request)?;
        assert_eq!(first, second);
        assert!(first.paths_found > 0, "{}", algorithm.as_str());
    }

    let crisis_request = CrisisSubgraphRequest {
        crisis_node_ids: vec!["n11".to_owned()],
        min_strength: Some(1),
        ..CrisisSubgraphRequest::default()
    };
    let extractor = CrisisExtractor::default();
    assert_eq!(
        extractor.extract(&graph, &crisis_request)?,
        extractor.extract(&graph, &crisis_request)?
    );

    let ranker = ImportanceRanker::default();
    assert_eq!(
        ranker.rank(&graph, &ImportanceRequest::default())?,
        ranker.rank(&graph, &ImportanceRequest::default())?
    );
    Ok(())
}

#[test]
fn input_order_does_not_change_results() -> Result<(), Box<dyn std::error::Error>> {
    let graph = lattice();
    let mut reversed_mechanisms = graph.mechanisms().to_vec();
    reversed_mechanisms.reverse();
    let mut reversed_nodes = graph.nodes().cloned().collect::<Vec<_>>();
    reversed_nodes.reverse();
    let reversed = build_graph(reversed_mechanisms, Some(reversed_nodes));

    let pathfinder = Pathfinder::default();
    for algorithm in [
        PathAlgorithm::Shortest,
        PathAlgorithm::StrongestEvidence,
        PathAlgorithm::AllSimple,
    ] {
        let request = path_request("n00", "n09", algorithm);
        assert_eq!(
            pathfinder.find_paths(&graph, &request)?,
            pathfinder.find_paths(&reversed, &request)?
        );
    }

    let ranker = ImportanceRanker::default();
    assert_eq!(
        ranker.rank(&graph, &ImportanceRequest::default())?,
        ranker.rank(&reversed, &ImportanceRequest::default())?
    );
    Ok(())
}

#[test]
fn shortest_paths_never_exceed_simple_path_lengths() -> Result<(), Box<dyn std::error::Error>> {
    let graph = lattice();
    let pathfinder = Pathfinder::default();
    let ids = graph.node_ids().map(str::to_owned).collect::<Vec<_>>();

    for from in &ids {
        for to in &ids {
            let shortest =
                pathfinder.find_paths(&graph, &path_request(from, to, PathAlgorithm::Shortest))?;
            let simple =
                pathfinder.find_paths(&graph, &path_request(from, to, PathAlgorithm::AllSimple))?;
            assert_eq!(shortest.paths.is_empty(), simple.paths.is_empty());
            let Some(minimal) = shortest.paths.first().map(|path| path.hop_count) else {
                continue;
            };
            assert!(shortest.paths.iter().all(|path| path.hop_count == minimal));
            assert!(simple.paths.iter().all(|path| path.hop_count >= minimal));
        }
    }
    Ok(())
}

#[test]
fn path_grade_is_the_weakest_link() -> Result<(), Box<dyn std::error::Error>> {
    let graph = build_graph(
        vec![
            mechanism("m1", "a", "b", EvidenceGrade::A),
            mechanism("m2", "b", "c", EvidenceGrade::C),
            mechanism("m3", "c", "d", EvidenceGrade::A),
        ],
        None,
    );
    let result =
        Pathfinder::default().find_paths(&graph, &path_request("a", "d", PathAlgorithm::Shortest))?;
    let path = &result.paths[0];
    assert_eq!(path.evidence_grade, EvidenceGrade::C);
    assert!((path.avg_evidence - 7.0 / 3.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn crisis_subgraph_respects_depth_and_strength() -> Result<(), Box<dyn std::error::Error>> {
    let graph = lattice();
    let extractor = CrisisExtractor::default();

    for max_degrees in 1..=8u32 {
        for min_strength in 1..=3u8 {
            let result = extractor.extract(
                &graph,
                &CrisisSubgraphRequest {
                    crisis_node_ids: vec!["n11".to_owned()],
                    max_degrees: Some(max_degrees),
                    min_strength: Some(min_strength),
                    categories: None,
                },
            )?;
            assert!(
                result
                    .nodes
                    .iter()
                    .all(|node| node.degree_from_crisis < max_degrees)
            );
            assert!(
                result
                    .edges
                    .iter()
                    .all(|edge| edge.evidence_strength >= min_strength)
            );
        }
    }
    Ok(())
}

#[test]
fn raising_min_connections_only_shrinks_candidates() -> Result<(), Box<dyn std::error::Error>> {
    let graph = lattice();
    let ranker = ImportanceRanker::default();

    let mut previous: Option<BTreeSet<String>> = None;
    for min_connections in 0..=6u32 {
        let result = ranker.rank(
            &graph,
            &ImportanceRequest {
                min_connections: Some(min_connections),
                ..ImportanceRequest::default()
            },
        )?;
        assert!(
            result
                .nodes
                .iter()
                .all(|node| node.connections.total() >= min_connections)
        );
        let current = result
            .nodes
            .iter()
            .map(|node| node.node_id.clone())
            .collect::<BTreeSet<_>>();
        if let Some(previous) = &previous {
            assert!(current.is_subset(previous));
        }
        previous = Some(current);
    }
    Ok(())
}
