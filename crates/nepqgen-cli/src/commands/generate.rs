//! The `nepqgen generate` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use nepqgen_core::generator::{ProgressReporter, QuestionGenerator, QuestionSource, SetOutcome};
use nepqgen_core::model::{QuestionSetSpec, Syllabus};
use nepqgen_core::parser::{self, SyllabusInput};
use nepqgen_core::report::{GenerationSummary, PaperReport};
use nepqgen_core::validator::RubricEvaluator;
use nepqgen_providers::config::{load_config_from, NepqgenConfig};
use nepqgen_providers::create_provider;

use super::output::{load_rubric, print_summary, write_reports};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_set_start(&self, index: usize, set: &QuestionSetSpec) {
        eprintln!(
            "  Starting set {}: {} x {} ({} marks each)",
            index + 1,
            set.count,
            set.question_type,
            set.marks
        );
    }

    fn on_set_complete(&self, outcome: &SetOutcome) {
        let note = match &outcome.error {
            Some(e) => format!(" [{e}]"),
            None => String::new(),
        };
        eprintln!(
            "  Done set {}: {} from model, {} fallback ({}, {}ms){}",
            outcome.index + 1,
            outcome.from_model,
            outcome.from_fallback,
            outcome.source,
            outcome.latency_ms,
            note
        );
    }

    fn on_generation_complete(&self, total_questions: usize, fallback_sets: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {total_questions} questions, {fallback_sets} set(s) from fallback ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

/// Split "provider/model" into its parts, defaulting the provider.
fn parse_model_spec(spec: Option<&str>, config: &NepqgenConfig) -> (String, String) {
    match spec {
        Some(s) => match s.trim().split_once('/') {
            Some((provider, model)) => (provider.to_string(), model.to_string()),
            None => (config.default_provider.clone(), s.trim().to_string()),
        },
        None => (
            config.default_provider.clone(),
            config.default_model.clone(),
        ),
    }
}

pub async fn execute(
    syllabus_path: PathBuf,
    paper_path: PathBuf,
    offline: bool,
    model: Option<String>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let paper = parser::parse_generation_config(&paper_path)?;
    let rubric = load_rubric(None, &config)?;
    let syllabus_input = parser::parse_syllabus(&syllabus_path)?;

    let (provider_name, model_name) = parse_model_spec(model.as_deref(), &config);
    let generator_config = config.generator_config(&model_name)?;

    let (generator, model_label) = if offline {
        (QuestionGenerator::offline(generator_config), "offline".to_string())
    } else {
        let Some(pconfig) = config.providers.get(&provider_name) else {
            anyhow::bail!(
                "provider '{}' not found in config. Available: {:?}. Use --offline to generate without a model.",
                provider_name,
                config.providers.keys().collect::<Vec<_>>()
            );
        };
        if generator_config.question_prompt_template.is_none() {
            tracing::warn!(
                "no question_prompt_template configured; every set will use the built-in fallback questions"
            );
        }
        let provider = create_provider(&provider_name, pconfig)?;
        (
            QuestionGenerator::new(Arc::from(provider), generator_config),
            format!("{provider_name}/{model_name}"),
        )
    };

    let syllabus: Syllabus = match syllabus_input {
        SyllabusInput::Structured(syllabus) => syllabus,
        SyllabusInput::Raw(text) => {
            let structured = generator.structure_syllabus(&text).await;
            if structured.source == QuestionSource::Fallback {
                eprintln!(
                    "Syllabus structured from text heuristics{}",
                    structured
                        .error
                        .as_deref()
                        .map(|e| format!(" ({e})"))
                        .unwrap_or_default()
                );
            }
            structured.syllabus
        }
    };

    let set_count = paper.effective_question_sets().len();
    eprintln!(
        "nepqgen v{}: generating {} question set(s) for {} with {}",
        env!("CARGO_PKG_VERSION"),
        set_count,
        syllabus.subject,
        model_label
    );
    eprintln!();

    let generated = generator.generate(&syllabus, &paper, &ConsoleReporter).await;

    let mut paper = paper;
    if paper.subject.is_empty() {
        paper.subject = syllabus.subject.clone();
    }

    for warning in parser::validate_question_set(&generated.questions, Some(&paper)) {
        eprintln!("WARNING: {warning}");
    }

    let compliance = RubricEvaluator::new(rubric).evaluate(&generated.questions, &paper);
    let report = PaperReport::new(&paper, generated.questions.clone(), compliance)
        .with_generation(GenerationSummary::from_generated(model_label, &generated));

    print_summary(&report);

    let output = output.unwrap_or_else(|| config.output_dir.clone());
    write_reports(&report, &output, &format)?;

    println!(
        "Generated {} questions ({} marks), overall score {:.1}",
        report.stats.question_count, report.stats.total_marks, report.compliance.overall_score
    );

    Ok(())
}
