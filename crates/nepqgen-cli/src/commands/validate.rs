//! The `nepqgen validate` command.

use std::path::PathBuf;

use anyhow::Result;

use nepqgen_core::parser;
use nepqgen_core::statistics::compute_paper_stats;

use super::output::load_paper;

pub fn execute(questions_path: PathBuf, paper_path: Option<PathBuf>) -> Result<()> {
    let paper = match &paper_path {
        Some(_) => Some(load_paper(paper_path.as_deref())?),
        None => None,
    };
    let questions = parser::load_questions(&questions_path)?;
    let stats = compute_paper_stats(&questions);

    println!(
        "Questions: {} ({} questions, {} marks)",
        questions_path.display(),
        stats.question_count,
        stats.total_marks
    );
    for (kind, count) in &stats.questions_by_type {
        println!("  {kind}: {count}");
    }

    let warnings = parser::validate_question_set(&questions, paper.as_ref());
    for w in &warnings {
        println!("  WARNING: {w}");
    }

    if questions.is_empty() {
        println!("No questions found.");
    } else if warnings.is_empty() {
        println!("All questions valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
