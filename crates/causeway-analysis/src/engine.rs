use std::path::Path;
use std::sync::Arc;

use causeway_config::{CausewayConfig, load_workspace_config_checked};
use causeway_core::{GraphCache, GraphLookup, GraphSnapshot};

use crate::crisis::{CrisisExtractor, CrisisSubgraphRequest, CrisisSubgraphResult};
use crate::error::AnalysisError;
use crate::pathfinder::{PathRequest, Pathfinder, PathfindingResult};
use crate::ranking::{ImportanceRanker, ImportanceRankingResult, ImportanceRequest};

/// Entry point for the three graph queries. Each query resolves the snapshot
/// to an immutable graph, reusing the cached build when the content version
/// is unchanged.
#[derive(Debug)]
pub struct CausalEngine {
    config: CausewayConfig,
    cache: GraphCache,
    pathfinder: Pathfinder,
    crisis: CrisisExtractor,
    ranker: ImportanceRanker,
}

impl Default for CausalEngine {
    fn default() -> Self {
        Self::new(CausewayConfig::default())
    }
}

impl CausalEngine {
    pub fn new(config: CausewayConfig) -> Self {
        Self {
            pathfinder: Pathfinder::new(config.pathfinding.clone()),
            crisis: CrisisExtractor::new(config.crisis.clone()),
            ranker: ImportanceRanker::new(config.ranking.clone()),
            cache: GraphCache::new(),
            config,
        }
    }

    /// Loads `.causeway/config.toml` under `workspace`. Replaced values are
    /// logged, not returned as errors.
    pub fn open(workspace: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let (config, warnings) = load_workspace_config_checked(workspace)?;
        for warning in &warnings {
            tracing::warn!(code = warning.code, "{}", warning.message);
        }
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &CausewayConfig {
        &self.config
    }

    pub fn graph(&self, snapshot: &GraphSnapshot) -> Result<GraphLookup, AnalysisError> {
        if self.config.cache.enabled {
            return Ok(self.cache.get_or_build(snapshot)?);
        }
        Ok(GraphLookup {
            graph: Arc::new(snapshot.build()),
            content_version: snapshot.content_version()?,
            cache_hit: false,
        })
    }

    pub fn find_paths(
        &self,
        snapshot: &GraphSnapshot,
        request: &PathRequest,
    ) -> Result<PathfindingResult, AnalysisError> {
        let lookup = self.graph(snapshot)?;
        self.pathfinder.find_paths(&lookup.graph, request)
    }

    pub fn crisis_subgraph(
        &self,
        snapshot: &GraphSnapshot,
        request: &CrisisSubgraphRequest,
    ) -> Result<CrisisSubgraphResult, AnalysisError> {
        let lookup = self.graph(snapshot)?;
        self.crisis.extract(&lookup.graph, request)
    }

    pub fn rank_nodes(
        &self,
        snapshot: &GraphSnapshot,
        request: &ImportanceRequest,
    ) -> Result<ImportanceRankingResult, AnalysisError> {
        let lookup = self.graph(snapshot)?;
        self.ranker.rank(&lookup.graph, request)
    }
}
