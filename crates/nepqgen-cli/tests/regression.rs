//! Regression detection integration tests.
//!
//! Exercises the paper comparison workflow end-to-end: evaluation, JSON
//! persistence, reloading and score regression detection.

use nepqgen_core::model::{CognitiveLevel, GenerationConfig, Question};
use nepqgen_core::parser;
use nepqgen_core::report::PaperReport;
use nepqgen_core::rubric::Rubric;
use nepqgen_core::validator::{evaluate, RubricEvaluator};

fn paper() -> GenerationConfig {
    GenerationConfig {
        title: "Economics Midterm".into(),
        subject: "Economics".into(),
        ..Default::default()
    }
}

fn balanced_questions() -> Vec<Question> {
    let plan = [
        ("Define opportunity cost.", "short", CognitiveLevel::Remember, 2),
        ("List the factors of production.", "short", CognitiveLevel::Remember, 2),
        ("Explain the law of demand.", "short", CognitiveLevel::Understand, 3),
        ("Explain why supply curves slope upward.", "short", CognitiveLevel::Understand, 3),
        ("Apply elasticity to a real-world fuel price rise.", "application", CognitiveLevel::Apply, 5),
        ("Calculate equilibrium price for the given schedule.", "problem_solving", CognitiveLevel::Apply, 5),
        ("Analyze a practical case of a price ceiling on rent.", "case_study", CognitiveLevel::Analyze, 6),
        ("Compare monopoly and perfect competition outcomes.", "long", CognitiveLevel::Analyze, 6),
        ("Evaluate a subsidy on electric vehicles.", "application", CognitiveLevel::Evaluate, 8),
        ("Design a policy to reduce urban congestion.", "case_study", CognitiveLevel::Create, 10),
    ];
    plan.iter()
        .map(|(text, kind, level, marks)| {
            Question::new(*text, *kind)
                .with_level(*level)
                .with_marks(*marks)
                .with_topic("Markets")
        })
        .collect()
}

fn recall_only_questions() -> Vec<Question> {
    (1..=10)
        .map(|i| {
            let mut q = Question::new(format!("Which of these is example {i} of a good?"), "mcq")
                .with_level(CognitiveLevel::Remember)
                .with_marks(1);
            q.options = vec!["A".into(), "B".into(), "C".into(), "D".into()];
            q
        })
        .collect()
}

fn make_report(questions: Vec<Question>) -> PaperReport {
    let config = paper();
    let compliance = evaluate(&questions, &config);
    PaperReport::new(&config, questions, compliance)
}

#[test]
fn regression_detected_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");

    make_report(balanced_questions())
        .save_json(&baseline_path)
        .unwrap();
    make_report(recall_only_questions())
        .save_json(&current_path)
        .unwrap();

    let baseline = PaperReport::load_json(&baseline_path).unwrap();
    let current = PaperReport::load_json(&current_path).unwrap();
    let diff = current.compare(&baseline, 5.0);

    assert!(diff.has_regressions());
    let metrics: Vec<&str> = diff.regressions.iter().map(|r| r.metric.as_str()).collect();
    assert!(metrics.contains(&"overall"));
    assert!(metrics.contains(&"question_type"));
    assert!(diff
        .added_recommendations
        .iter()
        .all(|rec| current.compliance.recommendations.contains(rec)));
    assert_eq!(diff.baseline_id, baseline.id);
    assert_eq!(diff.current_id, current.id);
}

#[test]
fn no_regression_within_threshold() {
    let baseline = make_report(balanced_questions());
    let mut tweaked = balanced_questions();
    tweaked[0].text = "Define opportunity cost with an example.".into();
    let current = make_report(tweaked);

    let diff = current.compare(&baseline, 0.5);
    assert!(!diff.has_regressions());
    assert!(diff.improvements.is_empty());
    assert!(diff.deltas.iter().all(|d| d.delta.abs() < 1e-9));
}

#[test]
fn saved_report_is_a_question_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.json");
    let report = make_report(balanced_questions());
    report.save_json(&path).unwrap();

    let questions = parser::load_questions(&path).unwrap();
    assert_eq!(questions, report.questions);

    let rescored = evaluate(&questions, &paper());
    assert!((rescored.overall_score - report.compliance.overall_score).abs() < 1e-9);
}

#[test]
fn stricter_rubric_lowers_scores() {
    let questions = balanced_questions();
    let lenient = evaluate(&questions, &paper());

    let strict = Rubric::from_toml_str("application_min_percentage = 90.0\napplication_penalty = 60.0\n")
        .unwrap();
    let strict_report = RubricEvaluator::new(strict).evaluate(&questions, &paper());

    assert!(strict_report.question_type_score < lenient.question_type_score);
    assert!(strict_report.overall_score < lenient.overall_score);
}
