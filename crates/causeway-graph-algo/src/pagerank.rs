use crate::CentralityGraph;

pub const DEFAULT_DAMPING: f64 = 0.85;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankConfig {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRankOutcome {
    /// Probability mass per node; sums to 1 for a non-empty graph.
    pub scores: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Power-method PageRank over outgoing edges. Mass on nodes without
/// successors is spread uniformly. Iteration stops once the L1 change drops
/// below `tolerance` or after `max_iterations`, whichever comes first.
pub fn page_rank(graph: &CentralityGraph, config: PageRankConfig) -> PageRankOutcome {
    let successors = graph.successors();
    let node_count = successors.len();
    if node_count == 0 {
        return PageRankOutcome {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }

    let damping = config.damping.clamp(0.0, 1.0);
    let n = node_count as f64;
    let teleport = (1.0 - damping) / n;
    let mut scores = vec![1.0 / n; node_count];
    let mut next = vec![0.0f64; node_count];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        iterations += 1;

        let dangling_mass = successors
            .iter()
            .zip(scores.iter())
            .filter(|(targets, _)| targets.is_empty())
            .map(|(_, score)| *score)
            .sum::<f64>();
        next.fill(teleport + damping * dangling_mass / n);

        for (source, targets) in successors.iter().enumerate() {
            if targets.is_empty() {
                continue;
            }
            let share = damping * scores[source] / targets.len() as f64;
            for &target in targets {
                next[target] += share;
            }
        }

        let delta = scores
            .iter()
            .zip(next.iter())
            .map(|(before, after)| (before - after).abs())
            .sum::<f64>();
        std::mem::swap(&mut scores, &mut next);
        if delta < config.tolerance {
            converged = true;
            break;
        }
    }

    PageRankOutcome {
        scores,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_converges_immediately() {
        let outcome = page_rank(&CentralityGraph::default(), PageRankConfig::default());
        assert!(outcome.scores.is_empty());
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn sink_of_a_chain_ranks_highest_and_mass_is_conserved() {
        let mut graph = CentralityGraph::new(["a", "b", "c", "d"]);
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("c", "d");

        let outcome = page_rank(&graph, PageRankConfig::default());
        let total = outcome.scores.iter().sum::<f64>();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(outcome.converged);
        assert!(outcome.scores[3] > outcome.scores[2]);
        assert!(outcome.scores[2] > outcome.scores[1]);
        assert!(outcome.scores[1] > outcome.scores[0]);
    }

    #[test]
    fn iteration_cap_bounds_work() {
        let mut graph = CentralityGraph::new(["a", "b"]);
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");

        let outcome = page_rank(
            &graph,
            PageRankConfig {
                damping: 0.85,
                max_iterations: 3,
                tolerance: 0.0,
            },
        );
        assert_eq!(outcome.iterations, 3);
        assert!(!outcome.converged);
    }
}
