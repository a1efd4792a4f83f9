use serde::{Deserialize, Serialize};

mod builder;
mod cache;
mod evidence;
mod filter;
mod graph;
mod snapshot;

pub use builder::build_graph;
pub use cache::{GraphCache, GraphLookup};
pub use evidence::{
    EvidenceStrength, GRADE_A_WEIGHT, GRADE_B_WEIGHT, GRADE_C_WEIGHT, MODERATE_THRESHOLD,
    STRONG_THRESHOLD, UNKNOWN_GRADE_WEIGHT, aggregate_path_evidence, average_grade_strength,
    grade_weight, score_mechanism, study_bonus, weakest_grade, weighted_path_score,
};
pub use filter::CategoryFilter;
pub use graph::{CausalGraph, MechanismIndex};
pub use snapshot::GraphSnapshot;

pub type NodeId = String;

pub const MIN_SCALE: u8 = 1;
pub const MAX_SCALE: u8 = 7;
pub const POLICY_LEVER_SCALE: u8 = MIN_SCALE;
pub const CRISIS_SCALE: u8 = MAX_SCALE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            other => Err(format!(
                "invalid direction '{other}', expected one of: positive, negative"
            )),
        }
    }
}

/// Literature support for a mechanism. Variants are declared weakest first so
/// that `Ord` and `min()` follow evidence strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvidenceGrade {
    C,
    B,
    A,
}

impl EvidenceGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }

    /// Numeric strength on the 1..=3 scale (`C = 1`, `A = 3`).
    pub fn strength(self) -> u8 {
        match self {
            Self::A => 3,
            Self::B => 2,
            Self::C => 1,
        }
    }

    /// Unknown grades count as the weakest present grade.
    pub fn resolve(grade: Option<Self>) -> Self {
        grade.unwrap_or(Self::C)
    }
}

impl std::str::FromStr for EvidenceGrade {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            other => Err(format!(
                "invalid evidence grade '{other}', expected one of: A, B, C"
            )),
        }
    }
}

pub fn grade_strength(grade: Option<EvidenceGrade>) -> u8 {
    EvidenceGrade::resolve(grade).strength()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeConnections {
    pub incoming: u32,
    pub outgoing: u32,
}

impl NodeConnections {
    pub fn total(self) -> u32 {
        self.incoming.saturating_add(self.outgoing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    #[serde(default)]
    pub scale: Option<u8>,
    #[serde(default, alias = "category")]
    pub categories: Vec<String>,
    /// Derived from the mechanism set by the graph builder; input values are
    /// ignored.
    #[serde(default)]
    pub connections: NodeConnections,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, scale: Option<u8>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            scale,
            categories: Vec::new(),
            connections: NodeConnections::default(),
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_crisis(&self) -> bool {
        self.scale == Some(CRISIS_SCALE)
    }

    pub fn is_policy_lever(&self) -> bool {
        self.scale == Some(POLICY_LEVER_SCALE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mechanism {
    pub id: String,
    #[serde(default)]
    pub source: NodeId,
    #[serde(default)]
    pub target: NodeId,
    pub direction: Direction,
    #[serde(default)]
    pub evidence_quality: Option<EvidenceGrade>,
    #[serde(default)]
    pub study_count: u32,
    #[serde(default, alias = "category")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_scale: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_scale: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Mechanism {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            direction,
            evidence_quality: None,
            study_count: 0,
            categories: Vec::new(),
            source_label: None,
            target_label: None,
            source_scale: None,
            target_scale: None,
            description: None,
        }
    }

    pub fn with_grade(mut self, grade: EvidenceGrade) -> Self {
        self.evidence_quality = Some(grade);
        self
    }

    pub fn with_study_count(mut self, study_count: u32) -> Self {
        self.study_count = study_count;
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn source_id(&self) -> Option<&str> {
        non_empty(self.source.as_str())
    }

    pub fn target_id(&self) -> Option<&str> {
        non_empty(self.target.as_str())
    }

    /// Both endpoints, or `None` for a malformed mechanism.
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        Some((self.source_id()?, self.target_id()?))
    }

    pub fn evidence_strength(&self) -> u8 {
        grade_strength(self.evidence_quality)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.trim().is_empty()).then_some(value)
}
