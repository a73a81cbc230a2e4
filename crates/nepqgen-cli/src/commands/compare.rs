//! The `nepqgen compare` command.

use std::path::PathBuf;

use anyhow::Result;

use nepqgen_core::report::PaperReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(threshold >= 0.0, "threshold must not be negative");

    let baseline = PaperReport::load_json(&baseline_path)?;
    let current = PaperReport::load_json(&current_path)?;

    let diff = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", diff.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&diff)?);
        }
        _ => {
            println!(
                "Comparison: {} regressions, {} improvements ({} vs {})",
                diff.regressions.len(),
                diff.improvements.len(),
                current.title,
                baseline.title
            );

            for d in &diff.deltas {
                println!(
                    "  {:<24} {:>6.1} -> {:>6.1} ({:+.1})",
                    d.metric, d.baseline_score, d.current_score, d.delta
                );
            }

            if !diff.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &diff.regressions {
                    println!("  {} dropped by {:.1} points", r.metric, -r.delta);
                }
            }

            if !diff.added_recommendations.is_empty() {
                println!("\nNew recommendations:");
                for rec in &diff.added_recommendations {
                    println!("  + {rec}");
                }
            }
            if !diff.resolved_recommendations.is_empty() {
                println!("\nResolved recommendations:");
                for rec in &diff.resolved_recommendations {
                    println!("  - {rec}");
                }
            }
        }
    }

    if fail_on_regression && diff.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
