use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CAUSEWAY_DIR_NAME: &str = ".causeway";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const MIN_PATH_DEPTH: u32 = 1;
pub const MAX_PATH_DEPTH: u32 = 8;
pub const MIN_PATHS: u32 = 1;
pub const MAX_PATHS: u32 = 50;
pub const MIN_CRISIS_DEGREES: u32 = 1;
pub const MAX_CRISIS_DEGREES: u32 = 8;
pub const MIN_EVIDENCE_STRENGTH: u8 = 1;
pub const MAX_EVIDENCE_STRENGTH: u8 = 3;
pub const MIN_CRISIS_SEEDS: usize = 1;
pub const MAX_CRISIS_SEEDS: usize = 10;

pub const DEFAULT_MAX_DEPTH: u32 = 5;
pub const DEFAULT_MAX_PATHS: u32 = 10;
pub const DEFAULT_SHORTEST_ENUMERATION_CAP: usize = 1_000;
pub const DEFAULT_BEST_FIRST_EXPANSION_CAP: usize = 20_000;
pub const DEFAULT_MAX_DEGREES: u32 = 5;
pub const DEFAULT_MIN_STRENGTH: u8 = 2;
pub const DEFAULT_PAGERANK_DAMPING: f64 = 0.85;
pub const DEFAULT_PAGERANK_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_PAGERANK_TOLERANCE: f64 = 1e-6;
pub const DEFAULT_BETWEENNESS_SAMPLE_THRESHOLD: usize = 500;
pub const DEFAULT_BETWEENNESS_SAMPLES: usize = 128;
pub const DEFAULT_SCORE_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CausewayConfig {
    #[serde(default)]
    pub pathfinding: PathfindingConfig,
    #[serde(default)]
    pub crisis: CrisisConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    pub default_max_depth: u32,
    pub default_max_paths: u32,
    /// Upper bound on minimal-hop paths enumerated before tie-breaking.
    pub shortest_enumeration_cap: usize,
    /// Upper bound on partial paths popped by the best-first search.
    pub best_first_expansion_cap: usize,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            default_max_depth: DEFAULT_MAX_DEPTH,
            default_max_paths: DEFAULT_MAX_PATHS,
            shortest_enumeration_cap: DEFAULT_SHORTEST_ENUMERATION_CAP,
            best_first_expansion_cap: DEFAULT_BEST_FIRST_EXPANSION_CAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrisisConfig {
    pub default_max_degrees: u32,
    pub default_min_strength: u8,
}

impl Default for CrisisConfig {
    fn default() -> Self {
        Self {
            default_max_degrees: DEFAULT_MAX_DEGREES,
            default_min_strength: DEFAULT_MIN_STRENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub pagerank_damping: f64,
    pub pagerank_max_iterations: usize,
    pub pagerank_tolerance: f64,
    /// Above this many candidate nodes betweenness is computed from sampled
    /// sources.
    pub betweenness_sample_threshold: usize,
    pub betweenness_samples: usize,
    pub weights: RankingWeights,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            pagerank_damping: DEFAULT_PAGERANK_DAMPING,
            pagerank_max_iterations: DEFAULT_PAGERANK_MAX_ITERATIONS,
            pagerank_tolerance: DEFAULT_PAGERANK_TOLERANCE,
            betweenness_sample_threshold: DEFAULT_BETWEENNESS_SAMPLE_THRESHOLD,
            betweenness_samples: DEFAULT_BETWEENNESS_SAMPLES,
            weights: RankingWeights::default(),
        }
    }
}

/// Composite importance weights. Equal by default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub degree: f64,
    pub betweenness: f64,
    pub closeness: f64,
    pub pagerank: f64,
    pub evidence: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            degree: DEFAULT_SCORE_WEIGHT,
            betweenness: DEFAULT_SCORE_WEIGHT,
            closeness: DEFAULT_SCORE_WEIGHT,
            pagerank: DEFAULT_SCORE_WEIGHT,
            evidence: DEFAULT_SCORE_WEIGHT,
        }
    }
}

impl RankingWeights {
    pub fn total(&self) -> f64 {
        self.degree + self.betweenness + self.closeness + self.pagerank + self.evidence
    }

    fn is_valid(&self) -> bool {
        let parts = [
            self.degree,
            self.betweenness,
            self.closeness,
            self.pagerank,
            self.evidence,
        ];
        parts.iter().all(|weight| weight.is_finite() && *weight >= 0.0) && self.total() > 0.0
    }

    /// Weights rescaled to sum to 1; invalid weights fall back to equal.
    pub fn normalized(&self) -> Self {
        if !self.is_valid() {
            return Self::default();
        }
        let total = self.total();
        Self {
            degree: self.degree / total,
            betweenness: self.betweenness / total,
            closeness: self.closeness / total,
            pagerank: self.pagerank / total,
            evidence: self.evidence / total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to serialize config TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub fn causeway_dir(workspace_root: impl AsRef<Path>) -> PathBuf {
    workspace_root.as_ref().join(CAUSEWAY_DIR_NAME)
}

pub fn config_path(workspace_root: impl AsRef<Path>) -> PathBuf {
    causeway_dir(workspace_root).join(CONFIG_FILE_NAME)
}

pub fn load_workspace_config(
    workspace_root: impl AsRef<Path>,
) -> Result<CausewayConfig, ConfigError> {
    load_workspace_config_checked(workspace_root).map(|(config, _)| config)
}

/// Loads and normalizes the workspace config, returning the warnings for
/// every value that had to be replaced.
pub fn load_workspace_config_checked(
    workspace_root: impl AsRef<Path>,
) -> Result<(CausewayConfig, Vec<ConfigWarning>), ConfigError> {
    let path = config_path(workspace_root);
    if !path.exists() {
        return Ok((CausewayConfig::default(), Vec::new()));
    }

    let raw = fs::read_to_string(path)?;
    let parsed: CausewayConfig = toml::from_str(&raw)?;
    let warnings = validate_config(&parsed);
    Ok((normalize_config(parsed), warnings))
}

pub fn ensure_workspace_config(
    workspace_root: impl AsRef<Path>,
) -> Result<CausewayConfig, ConfigError> {
    let workspace_root = workspace_root.as_ref();
    fs::create_dir_all(causeway_dir(workspace_root))?;

    let path = config_path(workspace_root);
    if path.exists() {
        return load_workspace_config(workspace_root);
    }

    let config = CausewayConfig::default();
    let content = toml::to_string_pretty(&config)?;
    fs::write(path, content)?;

    Ok(config)
}

pub fn validate_config(config: &CausewayConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    let pathfinding = &config.pathfinding;
    if !(MIN_PATH_DEPTH..=MAX_PATH_DEPTH).contains(&pathfinding.default_max_depth) {
        warnings.push(ConfigWarning {
            code: "pathfinding.default_max_depth",
            message: format!(
                "default_max_depth {} outside {MIN_PATH_DEPTH}..={MAX_PATH_DEPTH}; using {DEFAULT_MAX_DEPTH}",
                pathfinding.default_max_depth
            ),
        });
    }
    if !(MIN_PATHS..=MAX_PATHS).contains(&pathfinding.default_max_paths) {
        warnings.push(ConfigWarning {
            code: "pathfinding.default_max_paths",
            message: format!(
                "default_max_paths {} outside {MIN_PATHS}..={MAX_PATHS}; using {DEFAULT_MAX_PATHS}",
                pathfinding.default_max_paths
            ),
        });
    }
    if pathfinding.shortest_enumeration_cap == 0 || pathfinding.best_first_expansion_cap == 0 {
        warnings.push(ConfigWarning {
            code: "pathfinding.caps",
            message: "search caps must be positive; zero values replaced by defaults".to_owned(),
        });
    }

    let crisis = &config.crisis;
    if !(MIN_CRISIS_DEGREES..=MAX_CRISIS_DEGREES).contains(&crisis.default_max_degrees) {
        warnings.push(ConfigWarning {
            code: "crisis.default_max_degrees",
            message: format!(
                "default_max_degrees {} outside {MIN_CRISIS_DEGREES}..={MAX_CRISIS_DEGREES}; using {DEFAULT_MAX_DEGREES}",
                crisis.default_max_degrees
            ),
        });
    }
    if !(MIN_EVIDENCE_STRENGTH..=MAX_EVIDENCE_STRENGTH).contains(&crisis.default_min_strength) {
        warnings.push(ConfigWarning {
            code: "crisis.default_min_strength",
            message: format!(
                "default_min_strength {} outside {MIN_EVIDENCE_STRENGTH}..={MAX_EVIDENCE_STRENGTH}; using {DEFAULT_MIN_STRENGTH}",
                crisis.default_min_strength
            ),
        });
    }

    let ranking = &config.ranking;
    if !(ranking.pagerank_damping > 0.0 && ranking.pagerank_damping < 1.0) {
        warnings.push(ConfigWarning {
            code: "ranking.pagerank_damping",
            message: format!(
                "pagerank_damping {} must be in (0, 1); using {DEFAULT_PAGERANK_DAMPING}",
                ranking.pagerank_damping
            ),
        });
    }
    if ranking.pagerank_max_iterations == 0 {
        warnings.push(ConfigWarning {
            code: "ranking.pagerank_max_iterations",
            message: format!(
                "pagerank_max_iterations must be positive; using {DEFAULT_PAGERANK_MAX_ITERATIONS}"
            ),
        });
    }
    if !(ranking.pagerank_tolerance.is_finite() && ranking.pagerank_tolerance > 0.0) {
        warnings.push(ConfigWarning {
            code: "ranking.pagerank_tolerance",
            message: format!(
                "pagerank_tolerance must be a positive number; using {DEFAULT_PAGERANK_TOLERANCE}"
            ),
        });
    }
    if !ranking.weights.is_valid() {
        warnings.push(ConfigWarning {
            code: "ranking.weights",
            message: "ranking weights must be non-negative with a positive sum; using equal weights"
                .to_owned(),
        });
    }

    warnings
}

fn normalize_config(mut config: CausewayConfig) -> CausewayConfig {
    let defaults = CausewayConfig::default();

    let pathfinding = &mut config.pathfinding;
    if !(MIN_PATH_DEPTH..=MAX_PATH_DEPTH).contains(&pathfinding.default_max_depth) {
        pathfinding.default_max_depth = defaults.pathfinding.default_max_depth;
    }
    if !(MIN_PATHS..=MAX_PATHS).contains(&pathfinding.default_max_paths) {
        pathfinding.default_max_paths = defaults.pathfinding.default_max_paths;
    }
    if pathfinding.shortest_enumeration_cap == 0 {
        pathfinding.shortest_enumeration_cap = defaults.pathfinding.shortest_enumeration_cap;
    }
    if pathfinding.best_first_expansion_cap == 0 {
        pathfinding.best_first_expansion_cap = defaults.pathfinding.best_first_expansion_cap;
    }

    let crisis = &mut config.crisis;
    if !(MIN_CRISIS_DEGREES..=MAX_CRISIS_DEGREES).contains(&crisis.default_max_degrees) {
        crisis.default_max_degrees = defaults.crisis.default_max_degrees;
    }
    if !(MIN_EVIDENCE_STRENGTH..=MAX_EVIDENCE_STRENGTH).contains(&crisis.default_min_strength) {
        crisis.default_min_strength = defaults.crisis.default_min_strength;
    }

    let ranking = &mut config.ranking;
    if !(ranking.pagerank_damping > 0.0 && ranking.pagerank_damping < 1.0) {
        ranking.pagerank_damping = defaults.ranking.pagerank_damping;
    }
    if ranking.pagerank_max_iterations == 0 {
        ranking.pagerank_max_iterations = defaults.ranking.pagerank_max_iterations;
    }
    if !(ranking.pagerank_tolerance.is_finite() && ranking.pagerank_tolerance > 0.0) {
        ranking.pagerank_tolerance = defaults.ranking.pagerank_tolerance;
    }
    ranking.weights = ranking.weights.normalized();

    config
}
