use std::collections::VecDeque;

use crate::CentralityGraph;

/// Hop distance from `source` to every node, `None` when unreachable.
pub fn bfs_distances(graph: &CentralityGraph, source: usize) -> Vec<Option<u32>> {
    let successors = graph.successors();
    bfs_with(&successors, source)
}

fn bfs_with(successors: &[Vec<usize>], source: usize) -> Vec<Option<u32>> {
    let mut distance = vec![None; successors.len()];
    if source >= successors.len() {
        return distance;
    }

    let mut queue = VecDeque::new();
    distance[source] = Some(0);
    queue.push_back(source);
    while let Some(current) = queue.pop_front() {
        let Some(depth) = distance[current] else {
            continue;
        };
        for &next in &successors[current] {
            if distance[next].is_none() {
                distance[next] = Some(depth + 1);
                queue.push_back(next);
            }
        }
    }
    distance
}

/// Inverse of the mean hop distance to every node reachable from each node.
/// Nodes that reach nothing score 0.
pub fn closeness_centrality(graph: &CentralityGraph) -> Vec<f64> {
    let successors = graph.successors();
    (0..successors.len())
        .map(|source| {
            let (total, reached) = bfs_with(&successors, source)
                .into_iter()
                .enumerate()
                .filter(|(index, _)| *index != source)
                .filter_map(|(_, distance)| distance)
                .fold((0u64, 0u64), |(total, reached), distance| {
                    (total + u64::from(distance), reached + 1)
                });
            if reached == 0 || total == 0 {
                0.0
            } else {
                reached as f64 / total as f64
            }
        })
        .collect()
}

/// Evenly spaced source indices, `count` of them out of `node_count`. Returns
/// every index when `count` covers the graph.
pub fn sample_sources(node_count: usize, count: usize) -> Vec<usize> {
    if count == 0 || count >= node_count {
        return (0..node_count).collect();
    }
    let step = node_count as f64 / count as f64;
    let mut sources = (0..count)
        .map(|position| ((position as f64 * step) as usize).min(node_count - 1))
        .collect::<Vec<_>>();
    sources.dedup();
    sources
}

/// Brandes betweenness (raw shortest-path dependency counts, directed).
///
/// With `sample` set and smaller than the graph, only that many evenly spaced
/// sources are expanded and the totals are rescaled by `n / sampled`.
pub fn betweenness_centrality(graph: &CentralityGraph, sample: Option<usize>) -> Vec<f64> {
    let successors = graph.successors();
    let node_count = successors.len();
    let mut centrality = vec![0.0f64; node_count];
    if node_count == 0 {
        return centrality;
    }

    let sources = match sample {
        Some(count) => sample_sources(node_count, count),
        None => (0..node_count).collect(),
    };

    let mut stack = Vec::with_capacity(node_count);
    let mut predecessors = vec![Vec::<usize>::new(); node_count];
    let mut sigma = vec![0.0f64; node_count];
    let mut distance = vec![-1i64; node_count];
    let mut delta = vec![0.0f64; node_count];
    let mut queue = VecDeque::new();

    for &source in &sources {
        stack.clear();
        for list in predecessors.iter_mut() {
            list.clear();
        }
        sigma.fill(0.0);
        distance.fill(-1);
        delta.fill(0.0);

        sigma[source] = 1.0;
        distance[source] = 0;
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            stack.push(current);
            for &next in &successors[current] {
                if distance[next] < 0 {
                    distance[next] = distance[current] + 1;
                    queue.push_back(next);
                }
                if distance[next] == distance[current] + 1 {
                    sigma[next] += sigma[current];
                    predecessors[next].push(current);
                }
            }
        }

        while let Some(node) = stack.pop() {
            for &previous in &predecessors[node] {
                if sigma[node] > 0.0 {
                    delta[previous] += sigma[previous] / sigma[node] * (1.0 + delta[node]);
                }
            }
            if node != source {
                centrality[node] += delta[node];
            }
        }
    }

    if sources.len() < node_count && !sources.is_empty() {
        let scale = node_count as f64 / sources.len() as f64;
        for value in centrality.iter_mut() {
            *value *= scale;
        }
    }
    centrality
}
