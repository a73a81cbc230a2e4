//! Markdown rendering of a paper report.

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use std::path::Path;

use nepqgen_core::report::PaperReport;

/// Escape characters that would break a table cell.
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Render the report as a Markdown document.
pub fn generate_markdown(report: &PaperReport) -> String {
    let mut md = String::new();
    let compliance = &report.compliance;

    md.push_str(&format!("# {}\n\n", report.title));
    md.push_str(&format!(
        "**Subject:** {} | **Questions:** {} | **Marks:** {} | **Created:** {}\n\n",
        report.subject,
        report.stats.question_count,
        report.stats.total_marks,
        report.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));

    md.push_str("## Compliance\n\n");
    md.push_str("| Score | Value |\n|-------|-------|\n");
    md.push_str(&format!("| Overall | {:.1} |\n", compliance.overall_score));
    md.push_str(&format!(
        "| Cognitive distribution | {:.1} |\n",
        compliance.cognitive_distribution_score
    ));
    md.push_str(&format!(
        "| Question types | {:.1} |\n",
        compliance.question_type_score
    ));
    md.push_str(&format!("| Competency | {:.1} |\n\n", compliance.competency_score));

    md.push_str("### Cognitive levels\n\n");
    md.push_str("| Level | Questions % | Marks |\n|-------|-------------|-------|\n");
    for (level, pct) in &compliance.detailed_analysis.cognitive.distribution {
        let marks = report.stats.marks_by_level.get(level).copied().unwrap_or(0);
        md.push_str(&format!("| {} | {:.1} | {} |\n", level.title(), pct, marks));
    }
    md.push('\n');

    if !compliance.recommendations.is_empty() {
        md.push_str("## Recommendations\n\n");
        for (i, rec) in compliance.recommendations.iter().enumerate() {
            md.push_str(&format!("{}. {}\n", i + 1, rec));
        }
        md.push('\n');
    }

    if let Some(generation) = &report.generation {
        md.push_str("## Generation\n\n");
        md.push_str(&format!(
            "Model `{}`, {} tokens, {}ms.\n\n",
            generation.model, generation.token_usage.total_tokens, generation.duration_ms
        ));
        md.push_str("| Set | Type | Requested | Source | Note |\n|-----|------|-----------|--------|------|\n");
        for set in &generation.sets {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                set.index + 1,
                set.question_type,
                set.requested,
                set.source,
                cell(set.error.as_deref().unwrap_or("")),
            ));
        }
        md.push('\n');
    }

    md.push_str("## Questions\n\n");
    for (i, q) in report.questions.iter().enumerate() {
        md.push_str(&format!(
            "{}. {} _({}, {} marks, {}, {})_\n",
            i + 1,
            q.text.trim(),
            q.question_type,
            q.marks,
            q.cognitive_level,
            q.topic
        ));
        for (j, option) in q.options.iter().enumerate() {
            let letter = char::from(b'a' + (j % 26) as u8);
            md.push_str(&format!("   - ({letter}) {option}\n"));
        }
    }

    md
}

/// Write the Markdown rendering to a file.
pub fn write_markdown_report(report: &PaperReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate_markdown(report))
        .with_context(|| format!("failed to write markdown report to {}", path.display()))?;
    Ok(())
}
