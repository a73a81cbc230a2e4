//! Scoring rubric tables.
//!
//! [`Rubric::nep_2020`] encodes the NEP 2020 guidelines. A rubric is a plain
//! value owned by the evaluator, so alternates can be built in code or loaded
//! from TOML; every field left out of a TOML file keeps its NEP 2020 value.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{CognitiveLevel, QuestionType};

/// Inclusive accepted percentage band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, percentage: f64) -> bool {
        self.min <= percentage && percentage <= self.max
    }
}

/// Relative weight of each sub-score in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub cognitive: f64,
    pub question_type: f64,
    pub competency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            cognitive: 0.4,
            question_type: 0.3,
            competency: 0.3,
        }
    }
}

/// Score cut-offs below which each recommendation rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub overall: f64,
    pub cognitive: f64,
    pub question_type: f64,
    pub competency: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            overall: 70.0,
            cognitive: 80.0,
            question_type: 80.0,
            competency: 70.0,
        }
    }
}

/// Competency-feature heuristics. Keyword checks are plain case-insensitive
/// substring matches against the question text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetencyRubric {
    pub real_world_keywords: Vec<String>,
    pub real_world_min_percentage: f64,
    pub critical_thinking_keywords: Vec<String>,
    pub critical_thinking_min_percentage: f64,
    pub min_distinct_types: usize,
    pub higher_order_levels: Vec<CognitiveLevel>,
    pub higher_order_min_percentage: f64,
    pub points_per_feature: f64,
}

impl Default for CompetencyRubric {
    fn default() -> Self {
        Self {
            real_world_keywords: strings(&["real-world", "practical", "scenario", "case", "example"]),
            real_world_min_percentage: 30.0,
            critical_thinking_keywords: strings(&[
                "analyze", "evaluate", "compare", "justify", "critique",
            ]),
            critical_thinking_min_percentage: 20.0,
            min_distinct_types: 3,
            higher_order_levels: vec![
                CognitiveLevel::Analyze,
                CognitiveLevel::Evaluate,
                CognitiveLevel::Create,
            ],
            higher_order_min_percentage: 25.0,
            points_per_feature: 25.0,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A complete scoring rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rubric {
    /// Accepted share of the paper per cognitive level.
    pub cognitive_bands: BTreeMap<CognitiveLevel, Band>,
    /// MCQ share above this percentage is penalized.
    pub mcq_max_percentage: f64,
    pub mcq_penalty: f64,
    /// Types counted as application-based.
    pub application_types: Vec<QuestionType>,
    /// Application-based share below this percentage is penalized.
    pub application_min_percentage: f64,
    pub application_penalty: f64,
    pub competency: CompetencyRubric,
    pub weights: ScoreWeights,
    pub thresholds: RecommendationThresholds,
}

impl Default for Rubric {
    fn default() -> Self {
        Self::nep_2020()
    }
}

impl Rubric {
    /// The NEP 2020 rubric.
    pub fn nep_2020() -> Self {
        let cognitive_bands = BTreeMap::from([
            (CognitiveLevel::Remember, Band::new(15.0, 25.0)),
            (CognitiveLevel::Understand, Band::new(20.0, 30.0)),
            (CognitiveLevel::Apply, Band::new(20.0, 30.0)),
            (CognitiveLevel::Analyze, Band::new(10.0, 20.0)),
            (CognitiveLevel::Evaluate, Band::new(5.0, 15.0)),
            (CognitiveLevel::Create, Band::new(0.0, 10.0)),
        ]);

        Self {
            cognitive_bands,
            mcq_max_percentage: 30.0,
            mcq_penalty: 20.0,
            application_types: vec![
                QuestionType::Application,
                QuestionType::CaseStudy,
                QuestionType::ProblemSolving,
            ],
            application_min_percentage: 40.0,
            application_penalty: 25.0,
            competency: CompetencyRubric::default(),
            weights: ScoreWeights::default(),
            thresholds: RecommendationThresholds::default(),
        }
    }

    /// Load a rubric from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read rubric: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse rubric: {}", path.display()))
    }

    /// Parse a rubric from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let rubric: Rubric = toml::from_str(content)?;
        for (level, band) in &rubric.cognitive_bands {
            anyhow::ensure!(
                band.min <= band.max,
                "band for {level} has min {} above max {}",
                band.min,
                band.max
            );
        }
        Ok(rubric)
    }
}
