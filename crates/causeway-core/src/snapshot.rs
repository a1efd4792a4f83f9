use serde::{Deserialize, Serialize};

use crate::{CausalGraph, Mechanism, Node, build_graph};

/// The node/mechanism collection handed over by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
    #[serde(default)]
    pub mechanisms: Vec<Mechanism>,
}

impl GraphSnapshot {
    pub fn new(mechanisms: Vec<Mechanism>, nodes: Option<Vec<Node>>) -> Self {
        Self { nodes, mechanisms }
    }

    /// blake3 digest of the canonical JSON encoding; equal snapshots share a
    /// version and any edit to a node or mechanism changes it.
    pub fn content_version(&self) -> Result<String, serde_json::Error> {
        let mut hasher = blake3::Hasher::new();
        serde_json::to_writer(&mut hasher, self)?;
        Ok(hasher.finalize().to_hex().to_string())
    }

    pub fn build(&self) -> CausalGraph {
        build_graph(self.mechanisms.clone(), self.nodes.clone())
    }
}
