//! Recommendation synthesis.
//!
//! Turns a scored [`ComplianceReport`] into an ordered list of guidance
//! strings. Rules fire in a fixed order and their output is never
//! deduplicated, so the same advice may appear twice.

use crate::compliance::ComplianceReport;
use crate::rubric::RecommendationThresholds;

pub const NEEDS_IMPROVEMENT: &str = "Paper needs significant improvement for NEP 2020 compliance";
pub const MORE_COMPETENCY_QUESTIONS: &str =
    "Include more competency-based and application-oriented questions";
pub const MORE_REAL_WORLD_SCENARIOS: &str = "Add real-world scenarios and case studies";

/// Recommendations under the NEP 2020 thresholds.
pub fn synthesize_recommendations(report: &ComplianceReport) -> Vec<String> {
    synthesize_with_thresholds(report, &RecommendationThresholds::default())
}

/// Recommendations under caller-supplied thresholds.
pub fn synthesize_with_thresholds(
    report: &ComplianceReport,
    thresholds: &RecommendationThresholds,
) -> Vec<String> {
    let analysis = &report.detailed_analysis;
    let mut recommendations = Vec::new();

    if report.overall_score < thresholds.overall {
        recommendations.push(NEEDS_IMPROVEMENT.to_string());
    }

    if report.cognitive_distribution_score < thresholds.cognitive {
        recommendations.extend(analysis.cognitive.recommendations.iter().cloned());
    }

    if report.question_type_score < thresholds.question_type {
        recommendations.extend(analysis.question_types.issues.iter().cloned());
    }

    if report.competency_score < thresholds.competency {
        recommendations.push(MORE_COMPETENCY_QUESTIONS.to_string());
        recommendations.push(MORE_REAL_WORLD_SCENARIOS.to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CognitiveLevel, GenerationConfig, Question};
    use crate::validator::evaluate;

    fn report_with_scores(overall: f64, cognitive: f64, types: f64, competency: f64) -> ComplianceReport {
        let mut report = evaluate(&[], &GenerationConfig::default());
        report.overall_score = overall;
        report.cognitive_distribution_score = cognitive;
        report.question_type_score = types;
        report.competency_score = competency;
        report.detailed_analysis.cognitive.recommendations =
            vec!["Increase apply level questions to at least 20%".into()];
        report.detailed_analysis.question_types.issues =
            vec!["MCQ percentage (50.0%) exceeds recommended maximum (30%)".into()];
        report
    }

    #[test]
    fn golden_output_for_single_level_paper() {
        let questions: Vec<Question> = [
            "State Newton's first law.",
            "Define momentum.",
            "Explain inertia.",
            "Describe friction.",
        ]
        .iter()
        .map(|text| {
            Question::new(*text, "short")
                .with_marks(5)
                .with_level(CognitiveLevel::Understand)
        })
        .collect();

        let report = evaluate(&questions, &GenerationConfig::default());
        let expected = vec![
            NEEDS_IMPROVEMENT,
            "Increase remember level questions to at least 15%",
            "Reduce understand level questions to maximum 30%",
            "Increase apply level questions to at least 20%",
            "Increase analyze level questions to at least 10%",
            "Increase evaluate level questions to at least 5%",
            "Application-based questions (0.0%) below minimum (40%)",
            MORE_COMPETENCY_QUESTIONS,
            MORE_REAL_WORLD_SCENARIOS,
        ];

        assert_eq!(synthesize_recommendations(&report), expected);
        assert_eq!(report.recommendations, expected);
    }

    #[test]
    fn thresholds_are_strict() {
        let report = report_with_scores(70.0, 80.0, 80.0, 70.0);
        assert!(synthesize_recommendations(&report).is_empty());
    }

    #[test]
    fn rules_fire_in_order() {
        let report = report_with_scores(10.0, 10.0, 10.0, 10.0);
        assert_eq!(
            synthesize_recommendations(&report),
            vec![
                NEEDS_IMPROVEMENT,
                "Increase apply level questions to at least 20%",
                "MCQ percentage (50.0%) exceeds recommended maximum (30%)",
                MORE_COMPETENCY_QUESTIONS,
                MORE_REAL_WORLD_SCENARIOS,
            ]
        );
    }

    #[test]
    fn only_competency_rule() {
        let report = report_with_scores(90.0, 100.0, 100.0, 50.0);
        assert_eq!(
            synthesize_recommendations(&report),
            vec![MORE_COMPETENCY_QUESTIONS, MORE_REAL_WORLD_SCENARIOS]
        );
    }

    #[test]
    fn duplicates_are_kept() {
        let mut report = report_with_scores(90.0, 100.0, 50.0, 100.0);
        report.detailed_analysis.question_types.issues = vec![
            "Application-based questions (10.0%) below minimum (40%)".into(),
            "Application-based questions (10.0%) below minimum (40%)".into(),
        ];
        let recommendations = synthesize_recommendations(&report);
        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0], recommendations[1]);
    }

    #[test]
    fn custom_thresholds() {
        let report = report_with_scores(75.0, 100.0, 100.0, 100.0);
        let strict = RecommendationThresholds {
            overall: 90.0,
            ..Default::default()
        };
        assert_eq!(
            synthesize_with_thresholds(&report, &strict),
            vec![NEEDS_IMPROVEMENT]
        );
    }
}
