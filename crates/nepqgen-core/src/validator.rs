//! Rubric evaluator.
//!
//! Scores a question set along three axes (cognitive-level distribution,
//! question-type mix, competency features) and folds them into a
//! [`ComplianceReport`]. Evaluation is pure: no I/O, no shared state, and no
//! failure mode. An empty set scores every percentage as 0.

use std::collections::{BTreeMap, BTreeSet};

use crate::compliance::{
    CognitiveAnalysis, CompetencyAnalysis, ComplianceReport, DetailedAnalysis,
    QuestionTypeAnalysis,
};
use crate::model::{CognitiveLevel, GenerationConfig, Question};
use crate::recommendations::synthesize_with_thresholds;
use crate::rubric::Rubric;

pub const FEATURE_REAL_WORLD: &str = "Good real-world application";
pub const FEATURE_CRITICAL_THINKING: &str = "Promotes critical thinking";
pub const FEATURE_DIVERSE_METHODS: &str = "Diverse assessment methods";
pub const FEATURE_HIGHER_ORDER: &str = "Encourages higher-order thinking";

/// Evaluates question sets against an owned [`Rubric`].
#[derive(Debug, Clone, Default)]
pub struct RubricEvaluator {
    rubric: Rubric,
}

impl RubricEvaluator {
    pub fn new(rubric: Rubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    /// Score `questions` and build a report, recommendations included.
    ///
    /// `_config` is accepted for callers that carry paper settings alongside
    /// the questions; it does not influence the scores.
    pub fn evaluate(&self, questions: &[Question], _config: &GenerationConfig) -> ComplianceReport {
        let cognitive = self.analyze_cognitive(questions);
        let question_types = self.analyze_question_types(questions);
        let competency = self.analyze_competency(questions);

        let weights = &self.rubric.weights;
        let overall_score = clamp_score(
            cognitive.score * weights.cognitive
                + question_types.score * weights.question_type
                + competency.score * weights.competency,
        );

        let mut report = ComplianceReport {
            overall_score,
            cognitive_distribution_score: cognitive.score,
            question_type_score: question_types.score,
            competency_score: competency.score,
            question_count: questions.len(),
            detailed_analysis: DetailedAnalysis {
                cognitive,
                question_types,
                competency,
            },
            recommendations: Vec::new(),
        };
        report.recommendations = synthesize_with_thresholds(&report, &self.rubric.thresholds);
        report
    }

    fn analyze_cognitive(&self, questions: &[Question]) -> CognitiveAnalysis {
        let bands = &self.rubric.cognitive_bands;
        let total = questions.len();

        let mut counts: BTreeMap<CognitiveLevel, usize> =
            bands.keys().map(|level| (*level, 0)).collect();
        for question in questions {
            if let Some(count) = counts.get_mut(&question.cognitive_level) {
                *count += 1;
            }
        }

        let distribution: BTreeMap<CognitiveLevel, f64> = counts
            .iter()
            .map(|(level, count)| (*level, percentage(*count, total)))
            .collect();

        let mut in_band = 0usize;
        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        for (level, &share) in &distribution {
            let band = &bands[level];
            if band.contains(share) {
                in_band += 1;
            } else if share < band.min {
                issues.push(format!(
                    "{} level questions are {:.1}% below minimum",
                    level.title(),
                    band.min - share
                ));
                recommendations.push(format!(
                    "Increase {level} level questions to at least {}%",
                    band.min
                ));
            } else {
                issues.push(format!(
                    "{} level questions are {:.1}% above maximum",
                    level.title(),
                    share - band.max
                ));
                recommendations.push(format!(
                    "Reduce {level} level questions to maximum {}%",
                    band.max
                ));
            }
        }

        let score = if bands.is_empty() {
            0.0
        } else {
            in_band as f64 / bands.len() as f64 * 100.0
        };

        CognitiveAnalysis {
            score,
            distribution,
            issues,
            recommendations,
        }
    }

    fn analyze_question_types(&self, questions: &[Question]) -> QuestionTypeAnalysis {
        let rubric = &self.rubric;
        let total = questions.len();

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for question in questions {
            *counts.entry(question.question_type.to_string()).or_default() += 1;
        }
        let distribution: BTreeMap<String, f64> = counts
            .into_iter()
            .map(|(tag, count)| (tag, percentage(count, total)))
            .collect();

        let mut score = 100.0;
        let mut issues = Vec::new();

        let mcq_share = distribution.get("mcq").copied().unwrap_or(0.0);
        if mcq_share > rubric.mcq_max_percentage {
            score -= rubric.mcq_penalty;
            issues.push(format!(
                "MCQ percentage ({mcq_share:.1}%) exceeds recommended maximum ({}%)",
                rubric.mcq_max_percentage
            ));
        }

        let application_count = questions
            .iter()
            .filter(|q| rubric.application_types.contains(&q.question_type))
            .count();
        let application_share = percentage(application_count, total);
        if application_share < rubric.application_min_percentage {
            score -= rubric.application_penalty;
            issues.push(format!(
                "Application-based questions ({application_share:.1}%) below minimum ({}%)",
                rubric.application_min_percentage
            ));
        }

        QuestionTypeAnalysis {
            score: clamp_score(score),
            distribution,
            issues,
        }
    }

    fn analyze_competency(&self, questions: &[Question]) -> CompetencyAnalysis {
        let rubric = &self.rubric.competency;
        let total = questions.len();

        let real_world = questions
            .iter()
            .filter(|q| mentions_any(&q.text, &rubric.real_world_keywords))
            .count();
        let critical = questions
            .iter()
            .filter(|q| mentions_any(&q.text, &rubric.critical_thinking_keywords))
            .count();
        let higher_order = questions
            .iter()
            .filter(|q| rubric.higher_order_levels.contains(&q.cognitive_level))
            .count();
        let distinct_types = questions
            .iter()
            .map(|q| &q.question_type)
            .collect::<BTreeSet<_>>()
            .len();

        let real_world_share = percentage(real_world, total);
        let critical_share = percentage(critical, total);
        let higher_order_share = percentage(higher_order, total);

        let distribution = BTreeMap::from([
            ("real_world".to_string(), real_world_share),
            ("critical_thinking".to_string(), critical_share),
            ("higher_order".to_string(), higher_order_share),
        ]);

        if total == 0 {
            return CompetencyAnalysis {
                score: 0.0,
                distribution,
                distinct_types,
                features_found: Vec::new(),
                issues: vec!["No questions available for competency analysis".to_string()],
            };
        }

        let mut score = 0.0;
        let mut features_found = Vec::new();
        let mut issues = Vec::new();

        if real_world_share >= rubric.real_world_min_percentage {
            score += rubric.points_per_feature;
            features_found.push(FEATURE_REAL_WORLD.to_string());
        } else {
            issues.push(format!(
                "Real-world application appears in {real_world_share:.1}% of questions (minimum {}%)",
                rubric.real_world_min_percentage
            ));
        }

        if critical_share >= rubric.critical_thinking_min_percentage {
            score += rubric.points_per_feature;
            features_found.push(FEATURE_CRITICAL_THINKING.to_string());
        } else {
            issues.push(format!(
                "Critical-thinking prompts appear in {critical_share:.1}% of questions (minimum {}%)",
                rubric.critical_thinking_min_percentage
            ));
        }

        if distinct_types >= rubric.min_distinct_types {
            score += rubric.points_per_feature;
            features_found.push(FEATURE_DIVERSE_METHODS.to_string());
        } else {
            issues.push(format!(
                "Only {distinct_types} distinct question type(s) used (minimum {})",
                rubric.min_distinct_types
            ));
        }

        if higher_order_share >= rubric.higher_order_min_percentage {
            score += rubric.points_per_feature;
            features_found.push(FEATURE_HIGHER_ORDER.to_string());
        } else {
            issues.push(format!(
                "Higher-order questions make up {higher_order_share:.1}% of the paper (minimum {}%)",
                rubric.higher_order_min_percentage
            ));
        }

        CompetencyAnalysis {
            score: clamp_score(score),
            distribution,
            distinct_types,
            features_found,
            issues,
        }
    }
}

/// Evaluate against the NEP 2020 rubric.
pub fn evaluate(questions: &[Question], config: &GenerationConfig) -> ComplianceReport {
    RubricEvaluator::default().evaluate(questions, config)
}

/// `count` as a percentage of `total`; 0 when `total` is 0.
pub(crate) fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

fn mentions_any(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| text.contains(&keyword.to_lowercase()))
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}
