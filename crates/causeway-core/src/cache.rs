use std::sync::{Arc, Mutex, PoisonError};

use crate::{CausalGraph, GraphSnapshot};

#[derive(Debug, Clone)]
pub struct GraphLookup {
    pub graph: Arc<CausalGraph>,
    pub content_version: String,
    pub cache_hit: bool,
}

/// Single-slot graph cache keyed by [`GraphSnapshot::content_version`]. A
/// version mismatch replaces the whole entry; cached graphs are shared
/// read-only and never patched.
#[derive(Debug, Default)]
pub struct GraphCache {
    slot: Mutex<Option<(String, Arc<CausalGraph>)>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &self,
        snapshot: &GraphSnapshot,
    ) -> Result<GraphLookup, serde_json::Error> {
        let content_version = snapshot.content_version()?;
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((cached_version, graph)) = slot.as_ref() {
            if *cached_version == content_version {
                return Ok(GraphLookup {
                    graph: Arc::clone(graph),
                    content_version,
                    cache_hit: true,
                });
            }
        }

        let graph = Arc::new(snapshot.build());
        *slot = Some((content_version.clone(), Arc::clone(&graph)));
        tracing::debug!(
            content_version = %content_version,
            nodes = graph.node_count(),
            mechanisms = graph.mechanism_count(),
            "graph cache refreshed"
        );
        Ok(GraphLookup {
            graph,
            content_version,
            cache_hit: false,
        })
    }

    pub fn current_version(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(version, _)| version.clone())
    }

    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
