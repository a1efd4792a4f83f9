use causeway_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
    #[error("crisis node '{node_id}' must have scale 7, found {found}")]
    InvalidCrisisNode { node_id: String, found: String },
    #[error("crisis node '{0}' not found in graph")]
    UnknownCrisisNode(String),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to encode graph snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Caller-correctable request problems, as opposed to environment
    /// failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. } | Self::InvalidCrisisNode { .. } | Self::UnknownCrisisNode(_)
        )
    }
}

pub(crate) fn ensure_in_range<T>(
    field: &'static str,
    value: T,
    min: T,
    max: T,
) -> Result<T, AnalysisError>
where
    T: Copy + PartialOrd + Into<i64>,
{
    if value < min || value > max {
        return Err(AnalysisError::OutOfRange {
            field,
            min: min.into(),
            max: max.into(),
            value: value.into(),
        });
    }
    Ok(value)
}
