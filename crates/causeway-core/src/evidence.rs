use serde::{Deserialize, Serialize};

use crate::{EvidenceGrade, Mechanism};

pub const GRADE_A_WEIGHT: f64 = 1.0;
pub const GRADE_B_WEIGHT: f64 = 0.6;
pub const GRADE_C_WEIGHT: f64 = 0.3;
pub const UNKNOWN_GRADE_WEIGHT: f64 = 0.3;

pub const STRONG_THRESHOLD: f64 = 0.7;
pub const MODERATE_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStrength {
    Strong,
    Moderate,
    Weak,
}

impl EvidenceStrength {
    pub fn classify(score: f64) -> Self {
        if score >= STRONG_THRESHOLD {
            Self::Strong
        } else if score >= MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::Weak
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
        }
    }
}

pub fn grade_weight(grade: Option<EvidenceGrade>) -> f64 {
    match grade {
        Some(EvidenceGrade::A) => GRADE_A_WEIGHT,
        Some(EvidenceGrade::B) => GRADE_B_WEIGHT,
        Some(EvidenceGrade::C) => GRADE_C_WEIGHT,
        None => UNKNOWN_GRADE_WEIGHT,
    }
}

/// `log10(study_count + 1) / 10`: roughly +0.1 at 10 studies, +0.2 at 100.
pub fn study_bonus(study_count: u32) -> f64 {
    (f64::from(study_count) + 1.0).log10() / 10.0
}

pub fn score_mechanism(mechanism: &Mechanism) -> f64 {
    (grade_weight(mechanism.evidence_quality) + study_bonus(mechanism.study_count)).clamp(0.0, 1.0)
}

/// Weighted mean of per-edge scores in path order, edge `i` weighted `i + 1`
/// so links nearer the outcome count more. Empty input scores 0.
pub fn weighted_path_score(scores: &[f64]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (index, score) in scores.iter().enumerate() {
        let weight = (index + 1) as f64;
        weighted_sum += score * weight;
        weight_total += weight;
    }
    if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        0.0
    }
}

pub fn aggregate_path_evidence(mechanisms: &[&Mechanism]) -> f64 {
    let scores = mechanisms
        .iter()
        .map(|mechanism| score_mechanism(mechanism))
        .collect::<Vec<_>>();
    weighted_path_score(&scores)
}

/// Weakest-link grade of a path; `None` only for an empty path.
pub fn weakest_grade(mechanisms: &[&Mechanism]) -> Option<EvidenceGrade> {
    mechanisms
        .iter()
        .map(|mechanism| EvidenceGrade::resolve(mechanism.evidence_quality))
        .min()
}

/// Mean grade on the 0..=3 scale (`C = 1`, `B = 2`, `A = 3`).
pub fn average_grade_strength(mechanisms: &[&Mechanism]) -> f64 {
    if mechanisms.is_empty() {
        return 0.0;
    }
    let total = mechanisms
        .iter()
        .map(|mechanism| f64::from(mechanism.evidence_strength()))
        .sum::<f64>();
    total / mechanisms.len() as f64
}
