//! Compliance report types produced by the rubric evaluator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::CognitiveLevel;

/// The outcome of one rubric evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Weighted combination of the three sub-scores, in [0, 100].
    pub overall_score: f64,
    pub cognitive_distribution_score: f64,
    pub question_type_score: f64,
    pub competency_score: f64,
    /// Number of questions evaluated.
    pub question_count: usize,
    pub detailed_analysis: DetailedAnalysis,
    /// Ordered guidance; duplicates are kept.
    pub recommendations: Vec<String>,
}

/// Per-category breakdown behind the sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub cognitive: CognitiveAnalysis,
    pub question_types: QuestionTypeAnalysis,
    pub competency: CompetencyAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveAnalysis {
    pub score: f64,
    /// Percentage of questions per cognitive level.
    pub distribution: BTreeMap<CognitiveLevel, f64>,
    /// One entry per level outside its band.
    pub issues: Vec<String>,
    /// Corrective action per level outside its band.
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTypeAnalysis {
    pub score: f64,
    /// Percentage of questions per literal type tag.
    pub distribution: BTreeMap<String, f64>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyAnalysis {
    pub score: f64,
    /// Percentage of questions exhibiting each keyword/level feature.
    pub distribution: BTreeMap<String, f64>,
    pub distinct_types: usize,
    /// Labels of the features that were met.
    pub features_found: Vec<String>,
    /// One entry per feature that was not met.
    pub issues: Vec<String>,
}

impl ComplianceReport {
    /// True when the overall score reaches `threshold`.
    pub fn passes(&self, threshold: f64) -> bool {
        self.overall_score >= threshold
    }
}
