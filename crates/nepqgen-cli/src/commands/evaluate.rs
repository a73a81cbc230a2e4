//! The `nepqgen evaluate` command.

use std::path::PathBuf;

use anyhow::Result;

use nepqgen_core::parser;
use nepqgen_core::report::PaperReport;
use nepqgen_core::validator::RubricEvaluator;
use nepqgen_providers::config::load_config_from;

use super::output::{load_paper, load_rubric, print_summary, write_reports};

pub fn execute(
    questions_path: PathBuf,
    paper_path: Option<PathBuf>,
    rubric_path: Option<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    min_score: Option<f64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    if let Some(min) = min_score {
        anyhow::ensure!(
            (0.0..=100.0).contains(&min),
            "min-score must be between 0 and 100"
        );
    }

    let config = load_config_from(config_path.as_deref())?;
    let paper = load_paper(paper_path.as_deref())?;
    let rubric = load_rubric(rubric_path.as_deref(), &config)?;

    let questions = parser::load_questions(&questions_path)?;
    if questions.is_empty() {
        eprintln!("WARNING: no questions found in {}", questions_path.display());
    }

    for warning in parser::validate_question_set(&questions, Some(&paper)) {
        eprintln!("WARNING: {warning}");
    }

    let compliance = RubricEvaluator::new(rubric).evaluate(&questions, &paper);
    let report = PaperReport::new(&paper, questions, compliance);

    print_summary(&report);

    let output = output.unwrap_or_else(|| config.output_dir.clone());
    write_reports(&report, &output, &format)?;

    println!("Overall score: {:.1}", report.compliance.overall_score);

    if let Some(min) = min_score {
        if !report.compliance.passes(min) {
            anyhow::bail!(
                "overall score {:.1} is below the required {:.1}",
                report.compliance.overall_score,
                min
            );
        }
    }

    Ok(())
}
