mod crisis;
mod engine;
mod error;
mod pathfinder;
mod ranking;

pub use crisis::{
    CrisisEdgeEntry, CrisisExtractor, CrisisNodeEntry, CrisisSubgraphRequest,
    CrisisSubgraphResult, CrisisSubgraphStats,
};
pub use engine::CausalEngine;
pub use error::AnalysisError;
pub use pathfinder::{
    PathAlgorithm, PathDirection, PathMechanismEntry, PathNodeEntry, PathRequest, PathResult,
    Pathfinder, PathfindingResult,
};
pub use ranking::{
    ImportanceRanker, ImportanceRankingResult, ImportanceRequest, MAX_TOP_N, MIN_TOP_N,
    NodeImportance,
};
