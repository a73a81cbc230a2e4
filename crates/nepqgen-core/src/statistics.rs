//! Paper statistics: counts and marks broken down by type, topic and level.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{CognitiveLevel, Question};

/// Summary figures for a question paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperStats {
    pub question_count: usize,
    pub total_marks: u64,
    /// Mean marks per question (0 for an empty paper).
    pub average_marks: f64,
    pub questions_by_type: BTreeMap<String, usize>,
    pub marks_by_type: BTreeMap<String, u64>,
    pub questions_by_topic: BTreeMap<String, usize>,
    pub marks_by_level: BTreeMap<CognitiveLevel, u64>,
}

impl PaperStats {
    /// Share of total marks carried by `level`, as a percentage.
    pub fn level_mark_share(&self, level: CognitiveLevel) -> f64 {
        if self.total_marks == 0 {
            return 0.0;
        }
        let marks = self.marks_by_level.get(&level).copied().unwrap_or(0);
        marks as f64 * 100.0 / self.total_marks as f64
    }
}

/// Compute statistics for a question set.
///
/// Marks are summed as `u64`, so any number of `u32` marks fits.
pub fn compute_paper_stats(questions: &[Question]) -> PaperStats {
    let mut stats = PaperStats {
        question_count: questions.len(),
        ..Default::default()
    };

    for question in questions {
        let tag = question.question_type.to_string();
        let marks = u64::from(question.marks);
        stats.total_marks += marks;
        *stats.questions_by_type.entry(tag.clone()).or_default() += 1;
        *stats.marks_by_type.entry(tag).or_default() += marks;
        *stats
            .questions_by_topic
            .entry(question.topic.clone())
            .or_default() += 1;
        *stats
            .marks_by_level
            .entry(question.cognitive_level)
            .or_default() += marks;
    }

    if !questions.is_empty() {
        stats.average_marks = stats.total_marks as f64 / questions.len() as f64;
    }

    stats
}
