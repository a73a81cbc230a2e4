//! Deterministic stand-ins used when no model answer is available.
//!
//! Everything here is a pure function of its inputs so that offline runs and
//! failed generations still produce a complete, scoreable paper.

use crate::model::{CognitiveLevel, Question, QuestionSetSpec, QuestionType, Syllabus, Topic};

const FALLBACK_TOPIC: &str = "General Topic";

/// Cognitive level implied by a question's shape.
pub fn infer_cognitive_level(
    question_type: &QuestionType,
    marks: u32,
    difficulty: u8,
) -> CognitiveLevel {
    if *question_type == QuestionType::Mcq {
        if difficulty <= 3 {
            CognitiveLevel::Remember
        } else {
            CognitiveLevel::Understand
        }
    } else if marks <= 2 {
        CognitiveLevel::Understand
    } else if marks <= 5 {
        if difficulty <= 6 {
            CognitiveLevel::Apply
        } else {
            CognitiveLevel::Analyze
        }
    } else if difficulty <= 8 {
        CognitiveLevel::Evaluate
    } else {
        CognitiveLevel::Create
    }
}

/// A templated question built from the syllabus alone.
///
/// Marks are 1 for MCQs and 5 otherwise; types without a dedicated template
/// reuse the short-answer text.
pub fn fallback_question(
    syllabus: &Syllabus,
    difficulty: u8,
    question_type: &QuestionType,
) -> Question {
    let subject = &syllabus.subject;
    let topic = syllabus
        .topics
        .first()
        .map(|t| t.name.clone())
        .unwrap_or_else(|| FALLBACK_TOPIC.to_string());

    let text = match question_type {
        QuestionType::Mcq => {
            format!("Which of the following best describes a key concept in {subject}?")
        }
        QuestionType::Medium => {
            format!("Analyze the importance and applications of {topic} in {subject}.")
        }
        QuestionType::Long => format!(
            "Provide a comprehensive discussion of {topic}, including its theoretical \
             foundations and practical applications in {subject}."
        ),
        _ => format!("Explain the fundamental principles of {topic} as covered in the syllabus."),
    };

    let marks = if *question_type == QuestionType::Mcq { 1 } else { 5 };
    let options = if *question_type == QuestionType::Mcq {
        vec![
            "Correct option".to_string(),
            "Incorrect option 1".to_string(),
            "Incorrect option 2".to_string(),
            "Incorrect option 3".to_string(),
        ]
    } else {
        Vec::new()
    };

    Question {
        text,
        question_type: question_type.clone(),
        marks,
        cognitive_level: infer_cognitive_level(question_type, marks, difficulty),
        topic: topic.clone(),
        difficulty: Some(difficulty),
        answer: Some(format!("Expected comprehensive answer about {topic}")),
        marking_scheme: vec![format!("Complete answer: {marks} marks")],
        options,
    }
}

impl Syllabus {
    /// Minimal structure derived from raw syllabus text without a model.
    ///
    /// The subject is the first of the first ten lines whose trimmed length
    /// lies strictly between 5 and 100 characters.
    pub fn fallback_from_text(raw_text: &str) -> Self {
        let subject = raw_text
            .lines()
            .take(10)
            .map(str::trim)
            .find(|line| {
                let len = line.chars().count();
                len > 5 && len < 100
            })
            .unwrap_or("Unknown Subject")
            .to_string();

        Self {
            subject,
            topics: vec![Topic {
                name: "General Topics".to_string(),
                subtopics: Vec::new(),
                importance: "medium".to_string(),
                cognitive_level: CognitiveLevel::Understand,
            }],
            learning_objectives: vec!["Understand the subject matter".to_string()],
            question_patterns: vec![QuestionSetSpec {
                topics: vec!["General".to_string()],
                ..QuestionSetSpec::default()
            }],
            difficulty_areas: vec!["Advanced concepts".to_string()],
            key_concepts: vec!["Core principles".to_string()],
        }
    }
}
