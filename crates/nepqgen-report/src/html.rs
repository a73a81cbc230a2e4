//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use nepqgen_core::report::PaperReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML page for a paper report.
pub fn generate_html(report: &PaperReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>nepqgen report: {}</title>\n",
        html_escape(&report.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.title)));
    html.push_str(&format!(
        "<p class=\"meta\">Subject: <strong>{}</strong> | {} questions | {} marks | {}</p>\n",
        html_escape(&report.subject),
        report.stats.question_count,
        report.stats.total_marks,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Compliance dashboard
    let compliance = &report.compliance;
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>NEP 2020 Compliance</h2>\n");
    html.push_str(&generate_bar_chart(&[
        ("Overall", compliance.overall_score),
        ("Cognitive distribution", compliance.cognitive_distribution_score),
        ("Question types", compliance.question_type_score),
        ("Competency", compliance.competency_score),
    ]));

    html.push_str("<h3>Cognitive levels</h3>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Level</th><th>Questions %</th><th>Marks</th></tr></thead>\n<tbody>\n");
    for (level, pct) in &compliance.detailed_analysis.cognitive.distribution {
        let marks = report.stats.marks_by_level.get(level).copied().unwrap_or(0);
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.1}%</td><td>{}</td></tr>\n",
            level.title(),
            pct,
            marks
        ));
    }
    html.push_str("</tbody></table>\n");

    html.push_str("<h3>Question types</h3>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Type</th><th>Questions %</th><th>Marks</th></tr></thead>\n<tbody>\n");
    for (tag, pct) in &compliance.detailed_analysis.question_types.distribution {
        let marks = report.stats.marks_by_type.get(tag).copied().unwrap_or(0);
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.1}%</td><td>{}</td></tr>\n",
            html_escape(tag),
            pct,
            marks
        ));
    }
    html.push_str("</tbody></table>\n");

    let competency = &compliance.detailed_analysis.competency;
    if !competency.features_found.is_empty() {
        html.push_str("<p>Competency features found: ");
        let found: Vec<String> = competency
            .features_found
            .iter()
            .map(|f| html_escape(f))
            .collect();
        html.push_str(&found.join(", "));
        html.push_str("</p>\n");
    }
    html.push_str("</section>\n");

    // Issues and recommendations
    let issues: Vec<&String> = compliance
        .detailed_analysis
        .cognitive
        .issues
        .iter()
        .chain(&compliance.detailed_analysis.question_types.issues)
        .chain(&competency.issues)
        .collect();
    if !issues.is_empty() || !compliance.recommendations.is_empty() {
        html.push_str("<section class=\"guidance\">\n");
        if !issues.is_empty() {
            html.push_str("<h2>Issues</h2>\n<ul class=\"issues\">\n");
            for issue in issues {
                html.push_str(&format!("<li>{}</li>\n", html_escape(issue)));
            }
            html.push_str("</ul>\n");
        }
        if !compliance.recommendations.is_empty() {
            html.push_str("<h2>Recommendations</h2>\n<ol>\n");
            for rec in &compliance.recommendations {
                html.push_str(&format!("<li>{}</li>\n", html_escape(rec)));
            }
            html.push_str("</ol>\n");
        }
        html.push_str("</section>\n");
    }

    // Generation outcomes
    if let Some(generation) = &report.generation {
        html.push_str("<section class=\"generation\">\n");
        html.push_str("<h2>Generation</h2>\n");
        html.push_str(&format!(
            "<p class=\"meta\">Model: <strong>{}</strong> | {} tokens | ${:.4} | {}ms</p>\n",
            html_escape(&generation.model),
            generation.token_usage.total_tokens,
            generation.token_usage.estimated_cost_usd,
            generation.duration_ms
        ));
        html.push_str("<table class=\"summary\">\n");
        html.push_str("<thead><tr><th>Set</th><th>Type</th><th>Requested</th><th>From model</th><th>Fallback</th><th>Note</th></tr></thead>\n<tbody>\n");
        for set in &generation.sets {
            let class = if set.from_fallback > 0 { "fail" } else { "pass" };
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                class,
                set.index + 1,
                html_escape(set.question_type.as_str()),
                set.requested,
                set.from_model,
                set.from_fallback,
                html_escape(set.error.as_deref().unwrap_or("")),
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // Questions
    html.push_str("<section class=\"questions\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"questions\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Question</th><th onclick=\"sortTable(2)\">Type</th><th onclick=\"sortTable(3)\">Marks</th><th onclick=\"sortTable(4)\">Level</th><th onclick=\"sortTable(5)\">Topic</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (i, q) in report.questions.iter().enumerate() {
        let mut text = html_escape(&q.text);
        if !q.options.is_empty() {
            text.push_str("<ol type=\"a\" class=\"options\">");
            for option in &q.options {
                text.push_str(&format!("<li>{}</li>", html_escape(option)));
            }
            text.push_str("</ol>");
        }
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            i + 1,
            text,
            html_escape(q.question_type.as_str()),
            q.marks,
            q.cognitive_level,
            html_escape(&q.topic),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &PaperReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Horizontal bars for 0-100 scores.
fn generate_bar_chart(scores: &[(&str, f64)]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = scores.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (label, score)) in scores.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let fraction = (score / 100.0).clamp(0.0, 1.0);
        let width = (fraction * max_width as f64) as usize;

        let color = if *score >= 80.0 {
            "#22c55e"
        } else if *score >= 60.0 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fef3c7; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #78350f; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.options { margin: 0.5rem 0 0 0; }
.issues li { color: #b45309; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('questions');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  const numeric = col == 0 || col == 3;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const cmp = numeric ? Number(va) - Number(vb) : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use nepqgen_core::generator::{GeneratorConfig, NoopReporter, QuestionGenerator};
    use nepqgen_core::model::{CognitiveLevel, GenerationConfig, Question, Syllabus};
    use nepqgen_core::report::GenerationSummary;
    use nepqgen_core::validator::evaluate;

    fn make_test_report() -> PaperReport {
        let config = GenerationConfig {
            title: "Midterm <Physics>".into(),
            subject: "Physics".into(),
            ..Default::default()
        };
        let questions = vec![
            Question::new("Which law relates force & acceleration?", "mcq")
                .with_marks(1)
                .with_level(CognitiveLevel::Remember)
                .with_topic("Mechanics"),
            Question::new("Analyze the motion of a pendulum in a real-world clock.", "long")
                .with_marks(10)
                .with_level(CognitiveLevel::Analyze)
                .with_topic("Oscillations"),
        ];
        let compliance = evaluate(&questions, &config);
        PaperReport::new(&config, questions, compliance)
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Physics"));
        assert!(html.contains("Oscillations"));
        assert!(html.contains("<svg"));
        assert!(html.contains("Recommendations"));
        assert!(!html.contains("Generation</h2>"));
    }

    #[test]
    fn html_escapes_user_text() {
        let report = make_test_report();
        let html = generate_html(&report);
        assert!(html.contains("Midterm &lt;Physics&gt;"));
        assert!(html.contains("force &amp; acceleration"));
        assert!(!html.contains("<Physics>"));
    }

    #[tokio::test]
    async fn html_includes_generation_outcomes() {
        let paper = GenerationConfig::default();
        let syllabus = Syllabus::fallback_from_text("Thermodynamics and heat engines");
        let generated = QuestionGenerator::offline(GeneratorConfig::default())
            .generate(&syllabus, &paper, &NoopReporter)
            .await;
        let compliance = evaluate(&generated.questions, &paper);
        let report = PaperReport::new(&paper, generated.questions.clone(), compliance)
            .with_generation(GenerationSummary::from_generated("offline", &generated));

        let html = generate_html(&report);
        assert!(html.contains("Generation</h2>"));
        assert!(html.contains("offline"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("paper.html");

        write_html_report(&report, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }

    #[test]
    fn bar_width_is_clamped() {
        let svg = generate_bar_chart(&[("Overflow", 150.0), ("Negative", -5.0)]);
        assert!(svg.contains("width=\"400\""));
        assert!(svg.contains("width=\"0\""));
    }
}
