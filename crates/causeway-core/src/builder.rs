use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::filter::normalize_category;
use crate::graph::{CausalGraph, MechanismIndex};
use crate::{Mechanism, Node, NodeConnections, NodeId};

/// Builds the graph model from a flat mechanism list.
///
/// When `nodes` is supplied it is the canonical node set and is used as-is
/// (first record wins on duplicate ids). Otherwise nodes are synthesized from
/// mechanism endpoints: the first label and scale seen for an id win, and the
/// node inherits the union of its mechanisms' categories. Connection counts
/// are always recomputed here; mechanisms with a missing endpoint still count
/// for the endpoint that is present.
pub fn build_graph(mechanisms: Vec<Mechanism>, nodes: Option<Vec<Node>>) -> CausalGraph {
    let mut by_id = match nodes {
        Some(nodes) => authoritative_nodes(nodes),
        None => synthesize_nodes(&mechanisms),
    };

    let mut connections = HashMap::<&str, NodeConnections>::new();
    for mechanism in &mechanisms {
        if let Some(source) = mechanism.source_id() {
            let entry = connections.entry(source).or_default();
            entry.outgoing = entry.outgoing.saturating_add(1);
        }
        if let Some(target) = mechanism.target_id() {
            let entry = connections.entry(target).or_default();
            entry.incoming = entry.incoming.saturating_add(1);
        }
    }
    for node in by_id.values_mut() {
        node.connections = connections
            .get(node.id.as_str())
            .copied()
            .unwrap_or_default();
    }

    let mut forward = HashMap::<NodeId, Vec<MechanismIndex>>::new();
    let mut reverse = HashMap::<NodeId, Vec<MechanismIndex>>::new();
    let mut skipped = 0usize;
    for (index, mechanism) in mechanisms.iter().enumerate() {
        let Some((source, target)) = mechanism.endpoints() else {
            skipped += 1;
            continue;
        };
        if !by_id.contains_key(source) || !by_id.contains_key(target) {
            skipped += 1;
            continue;
        }
        forward.entry(source.to_owned()).or_default().push(index);
        reverse.entry(target.to_owned()).or_default().push(index);
    }
    for indices in forward.values_mut() {
        indices.sort_by(|left, right| {
            let left = &mechanisms[*left];
            let right = &mechanisms[*right];
            left.target
                .cmp(&right.target)
                .then_with(|| left.id.cmp(&right.id))
        });
    }
    for indices in reverse.values_mut() {
        indices.sort_by(|left, right| {
            let left = &mechanisms[*left];
            let right = &mechanisms[*right];
            left.source
                .cmp(&right.source)
                .then_with(|| left.id.cmp(&right.id))
        });
    }

    if skipped > 0 {
        tracing::warn!(
            skipped,
            total = mechanisms.len(),
            "mechanisms without resolvable endpoints excluded from traversal"
        );
    }

    CausalGraph {
        nodes: by_id,
        mechanisms,
        forward,
        reverse,
    }
}

fn authoritative_nodes(nodes: Vec<Node>) -> BTreeMap<NodeId, Node> {
    let mut by_id = BTreeMap::new();
    for node in nodes {
        if by_id.contains_key(node.id.as_str()) {
            tracing::warn!(node_id = %node.id, "duplicate node id in snapshot; keeping first");
            continue;
        }
        by_id.insert(node.id.clone(), node);
    }
    by_id
}

fn synthesize_nodes(mechanisms: &[Mechanism]) -> BTreeMap<NodeId, Node> {
    let mut by_id = BTreeMap::<NodeId, Node>::new();
    let mut labeled = BTreeSet::<NodeId>::new();
    let mut categories = HashMap::<NodeId, BTreeSet<String>>::new();

    for mechanism in mechanisms {
        let endpoints = [
            (
                mechanism.source_id(),
                mechanism.source_label.as_deref(),
                mechanism.source_scale,
            ),
            (
                mechanism.target_id(),
                mechanism.target_label.as_deref(),
                mechanism.target_scale,
            ),
        ];
        for (node_id, label, scale) in endpoints {
            let Some(node_id) = node_id else {
                continue;
            };
            let node = by_id
                .entry(node_id.to_owned())
                .or_insert_with(|| Node::new(node_id, node_id, None));

            let label = label.map(str::trim).filter(|label| !label.is_empty());
            if let Some(label) = label {
                if labeled.insert(node_id.to_owned()) {
                    node.label = label.to_owned();
                }
            }
            if node.scale.is_none() {
                node.scale = scale;
            }

            let tags = categories.entry(node_id.to_owned()).or_default();
            for category in &mechanism.categories {
                let normalized = normalize_category(category);
                if !normalized.is_empty() {
                    tags.insert(normalized);
                }
            }
        }
    }

    for (node_id, tags) in categories {
        if let Some(node) = by_id.get_mut(node_id.as_str()) {
            node.categories = tags.into_iter().collect();
        }
    }
    by_id
}
