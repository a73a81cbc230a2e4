//! Helpers shared by the commands that produce paper reports.

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Table};

use nepqgen_core::model::{CognitiveLevel, GenerationConfig};
use nepqgen_core::parser;
use nepqgen_core::report::PaperReport;
use nepqgen_core::rubric::Rubric;
use nepqgen_providers::NepqgenConfig;
use nepqgen_report::html::write_html_report;
use nepqgen_report::markdown::write_markdown_report;

/// Load the paper spec, or defaults when none was given.
pub fn load_paper(path: Option<&Path>) -> Result<GenerationConfig> {
    match path {
        Some(p) => parser::parse_generation_config(p),
        None => Ok(GenerationConfig::default()),
    }
}

/// The rubric named on the command line, else the one in config, else NEP 2020.
pub fn load_rubric(explicit: Option<&Path>, config: &NepqgenConfig) -> Result<Rubric> {
    match explicit.or(config.rubric.as_deref()) {
        Some(path) => Rubric::load(path),
        None => Ok(Rubric::nep_2020()),
    }
}

/// Write `report` in each requested format and return the written paths.
pub fn write_reports(report: &PaperReport, output: &Path, format: &str) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "markdown"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    let mut written = Vec::new();
    for fmt in formats {
        match fmt {
            "json" => {
                let path = output.join(format!("paper-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Report saved to: {}", path.display());
                written.push(path);
            }
            "html" => {
                let path = output.join(format!("paper-{timestamp}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
                written.push(path);
            }
            "markdown" | "md" => {
                let path = output.join(format!("paper-{timestamp}.md"));
                write_markdown_report(report, &path)?;
                eprintln!("Markdown report: {}", path.display());
                written.push(path);
            }
            other => {
                eprintln!("Unknown format: {other}");
            }
        }
    }
    Ok(written)
}

/// Print score and cognitive-level tables plus recommendations.
pub fn print_summary(report: &PaperReport) {
    let compliance = &report.compliance;

    let mut scores = Table::new();
    scores.set_header(vec!["Score", "Value"]);
    for (label, value) in [
        ("Overall", compliance.overall_score),
        ("Cognitive distribution", compliance.cognitive_distribution_score),
        ("Question types", compliance.question_type_score),
        ("Competency", compliance.competency_score),
    ] {
        scores.add_row(vec![Cell::new(label), Cell::new(format!("{value:.1}"))]);
    }

    let mut levels = Table::new();
    levels.set_header(vec!["Level", "Questions %", "Marks %"]);
    for level in CognitiveLevel::ALL {
        let share = compliance
            .detailed_analysis
            .cognitive
            .distribution
            .get(&level)
            .copied()
            .unwrap_or(0.0);
        levels.add_row(vec![
            Cell::new(level.title()),
            Cell::new(format!("{share:.1}%")),
            Cell::new(format!("{:.1}%", report.stats.level_mark_share(level))),
        ]);
    }

    eprintln!(
        "\n{}: {} questions, {} marks",
        report.title, report.stats.question_count, report.stats.total_marks
    );
    eprintln!("{scores}");
    eprintln!("{levels}");

    if !compliance.recommendations.is_empty() {
        eprintln!("\nRecommendations:");
        for rec in &compliance.recommendations {
            eprintln!("  - {rec}");
        }
    }
}
