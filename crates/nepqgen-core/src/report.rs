//! Paper report types with JSON persistence and regression detection.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compliance::ComplianceReport;
use crate::generator::{GeneratedQuestions, SetOutcome};
use crate::model::{GenerationConfig, Question};
use crate::statistics::{compute_paper_stats, PaperStats};
use crate::traits::TokenUsage;

/// A question paper together with its compliance evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub subject: String,
    pub questions: Vec<Question>,
    pub stats: PaperStats,
    pub compliance: ComplianceReport,
    /// Present when the questions were generated rather than loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenerationSummary>,
}

/// How a generated paper was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// `provider/model`, or "offline".
    pub model: String,
    pub sets: Vec<SetOutcome>,
    pub token_usage: TokenUsage,
    pub duration_ms: u64,
}

impl GenerationSummary {
    pub fn from_generated(model: impl Into<String>, generated: &GeneratedQuestions) -> Self {
        Self {
            model: model.into(),
            sets: generated.outcomes.clone(),
            token_usage: generated.token_usage,
            duration_ms: generated.duration_ms,
        }
    }
}

impl PaperReport {
    /// Build a report for `questions` that were already evaluated.
    pub fn new(
        config: &GenerationConfig,
        questions: Vec<Question>,
        compliance: ComplianceReport,
    ) -> Self {
        let title = if config.title.is_empty() {
            "Question Paper".to_string()
        } else {
            config.title.clone()
        };
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            title,
            subject: config.subject.clone(),
            stats: compute_paper_stats(&questions),
            questions,
            compliance,
            generation: None,
        }
    }

    pub fn with_generation(mut self, generation: GenerationSummary) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: PaperReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline.
    ///
    /// A score counts as regressed when it dropped by more than `threshold`
    /// points (scores are on a 0-100 scale).
    pub fn compare(&self, baseline: &PaperReport, threshold: f64) -> ComplianceDiff {
        let pairs = [
            (
                "overall",
                baseline.compliance.overall_score,
                self.compliance.overall_score,
            ),
            (
                "cognitive_distribution",
                baseline.compliance.cognitive_distribution_score,
                self.compliance.cognitive_distribution_score,
            ),
            (
                "question_type",
                baseline.compliance.question_type_score,
                self.compliance.question_type_score,
            ),
            (
                "competency",
                baseline.compliance.competency_score,
                self.compliance.competency_score,
            ),
        ];

        let mut deltas = Vec::with_capacity(pairs.len());
        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        for (metric, baseline_score, current_score) in pairs {
            let delta = ScoreDelta {
                metric: metric.to_string(),
                baseline_score,
                current_score,
                delta: current_score - baseline_score,
            };
            if delta.delta < -threshold {
                regressions.push(delta.clone());
            } else if delta.delta > threshold {
                improvements.push(delta.clone());
            }
            deltas.push(delta);
        }

        let current_recs = &self.compliance.recommendations;
        let baseline_recs = &baseline.compliance.recommendations;
        let added_recommendations = dedup_missing(current_recs, baseline_recs);
        let resolved_recommendations = dedup_missing(baseline_recs, current_recs);

        ComplianceDiff {
            baseline_id: baseline.id,
            current_id: self.id,
            threshold,
            deltas,
            regressions,
            improvements,
            added_recommendations,
            resolved_recommendations,
        }
    }
}

/// Entries of `from` absent from `other`, first occurrence only.
fn dedup_missing(from: &[String], other: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for rec in from {
        if !other.contains(rec) && !out.contains(rec) {
            out.push(rec.clone());
        }
    }
    out
}

/// Result of comparing two paper reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceDiff {
    pub baseline_id: Uuid,
    pub current_id: Uuid,
    pub threshold: f64,
    /// One entry per score, in report order.
    pub deltas: Vec<ScoreDelta>,
    /// Scores that dropped by more than the threshold.
    pub regressions: Vec<ScoreDelta>,
    /// Scores that rose by more than the threshold.
    pub improvements: Vec<ScoreDelta>,
    /// Recommendations new in the current report.
    pub added_recommendations: Vec<String>,
    /// Baseline recommendations no longer present.
    pub resolved_recommendations: Vec<String>,
}

/// Change in a single score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub metric: String,
    pub baseline_score: f64,
    pub current_score: f64,
    pub delta: f64,
}

impl ComplianceDiff {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements (threshold {:.1} points)\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.threshold
        ));

        md.push_str("| Score | Baseline | Current | Delta |\n");
        md.push_str("|-------|----------|---------|-------|\n");
        for d in &self.deltas {
            md.push_str(&format!(
                "| {} | {:.1} | {:.1} | {:+.1} |\n",
                d.metric, d.baseline_score, d.current_score, d.delta
            ));
        }
        md.push('\n');

        if !self.regressions.is_empty() {
            md.push_str("### Regressions\n\n");
            for r in &self.regressions {
                md.push_str(&format!(
                    "- {}: {:.1} -> {:.1} ({:+.1})\n",
                    r.metric, r.baseline_score, r.current_score, r.delta
                ));
            }
            md.push('\n');
        }

        if !self.added_recommendations.is_empty() {
            md.push_str("### New recommendations\n\n");
            for rec in &self.added_recommendations {
                md.push_str(&format!("- {rec}\n"));
            }
            md.push('\n');
        }

        if !self.resolved_recommendations.is_empty() {
            md.push_str("### Resolved recommendations\n\n");
            for rec in &self.resolved_recommendations {
                md.push_str(&format!("- {rec}\n"));
            }
        }

        md
    }

    /// Returns true if any score regressed.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}
