use std::collections::{BTreeMap, HashMap};

use crate::{Mechanism, Node, NodeConnections, NodeId};

/// Position of a mechanism in [`CausalGraph::mechanisms`].
pub type MechanismIndex = usize;

/// Immutable causal graph snapshot: nodes keyed by id plus forward and
/// reverse adjacency over the traversable mechanisms. Built once by
/// [`crate::build_graph`] and never mutated afterwards; both adjacency maps
/// are always derived from the same mechanism list.
#[derive(Debug, Clone, Default)]
pub struct CausalGraph {
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) mechanisms: Vec<Mechanism>,
    pub(crate) forward: HashMap<NodeId, Vec<MechanismIndex>>,
    pub(crate) reverse: HashMap<NodeId, Vec<MechanismIndex>>,
}

impl CausalGraph {
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every mechanism supplied to the builder, including malformed and
    /// dangling ones.
    pub fn mechanisms(&self) -> &[Mechanism] {
        &self.mechanisms
    }

    pub fn mechanism_count(&self) -> usize {
        self.mechanisms.len()
    }

    pub fn mechanism(&self, index: MechanismIndex) -> Option<&Mechanism> {
        self.mechanisms.get(index)
    }

    /// Traversable mechanisms leaving `node_id`, ordered by (target, id).
    pub fn outgoing(&self, node_id: &str) -> &[MechanismIndex] {
        self.forward.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Traversable mechanisms entering `node_id`, ordered by (source, id).
    pub fn incoming(&self, node_id: &str) -> &[MechanismIndex] {
        self.reverse.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn connections(&self, node_id: &str) -> NodeConnections {
        self.nodes
            .get(node_id)
            .map(|node| node.connections)
            .unwrap_or_default()
    }

    /// Mechanisms whose endpoints are both present and resolve to nodes.
    pub fn traversable_mechanisms(&self) -> impl Iterator<Item = (MechanismIndex, &Mechanism)> {
        self.mechanisms
            .iter()
            .enumerate()
            .filter(move |(_, mechanism)| self.is_traversable(mechanism))
    }

    pub fn is_traversable(&self, mechanism: &Mechanism) -> bool {
        mechanism.endpoints().is_some_and(|(source, target)| {
            self.nodes.contains_key(source) && self.nodes.contains_key(target)
        })
    }

    pub fn malformed_mechanism_count(&self) -> usize {
        self.mechanisms
            .iter()
            .filter(|mechanism| mechanism.endpoints().is_none())
            .count()
    }

    pub fn dangling_mechanism_count(&self) -> usize {
        self.mechanisms
            .iter()
            .filter(|mechanism| mechanism.endpoints().is_some() && !self.is_traversable(mechanism))
            .count()
    }
}
