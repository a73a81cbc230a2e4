//! Question set, paper spec and syllabus loaders.
//!
//! Question files are JSON (a bare array or `{ "questions": [...] }`) or TOML
//! (`[[questions]]` tables). Field values are coerced leniently, see
//! [`crate::model::Question`].

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{GenerationConfig, Question, QuestionType, Syllabus};

/// On-disk document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    /// Format implied by the file extension; anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        if path.extension().is_some_and(|ext| ext == "toml") {
            FileFormat::Toml
        } else {
            FileFormat::Json
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuestionsDocument {
    List(Vec<Question>),
    Wrapped { questions: Vec<Question> },
}

impl QuestionsDocument {
    fn into_questions(self) -> Vec<Question> {
        match self {
            QuestionsDocument::List(questions) => questions,
            QuestionsDocument::Wrapped { questions } => questions,
        }
    }
}

/// Parse a single question file.
pub fn parse_questions_file(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file: {}", path.display()))?;

    parse_questions_str(&content, FileFormat::from_path(path), path)
}

/// Parse question file contents (useful for testing).
pub fn parse_questions_str(
    content: &str,
    format: FileFormat,
    source_path: &Path,
) -> Result<Vec<Question>> {
    let document: QuestionsDocument = match format {
        FileFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?,
        FileFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?,
    };
    Ok(document.into_questions())
}

/// Load questions from a file, or from every question file under a directory.
pub fn load_questions(path: &Path) -> Result<Vec<Question>> {
    if path.is_dir() {
        load_question_directory(path)
    } else {
        parse_questions_file(path)
    }
}

/// Recursively load all `.json` and `.toml` question files from a directory.
///
/// Files are visited in path order. Files that fail to parse are skipped with
/// a warning.
pub fn load_question_directory(dir: &Path) -> Result<Vec<Question>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    paths.sort();

    let mut questions = Vec::new();
    for path in paths {
        if path.is_dir() {
            questions.extend(load_question_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "json" || ext == "toml")
        {
            match parse_questions_file(&path) {
                Ok(parsed) => questions.extend(parsed),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
    }

    Ok(questions)
}

/// Load a paper spec from JSON or TOML.
pub fn parse_generation_config(path: &Path) -> Result<GenerationConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read paper spec: {}", path.display()))?;

    parse_generation_config_str(&content, FileFormat::from_path(path), path)
}

pub fn parse_generation_config_str(
    content: &str,
    format: FileFormat,
    source_path: &Path,
) -> Result<GenerationConfig> {
    let config: GenerationConfig = match format {
        FileFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?,
        FileFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?,
    };
    anyhow::ensure!(
        (1..=10).contains(&config.difficulty),
        "difficulty must be between 1 and 10, got {} ({})",
        config.difficulty,
        source_path.display()
    );
    Ok(config)
}

/// A syllabus as found on disk.
#[derive(Debug, Clone)]
pub enum SyllabusInput {
    /// Already structured (JSON).
    Structured(Syllabus),
    /// Free text still to be analyzed.
    Raw(String),
}

/// Load a syllabus: `.json` files are parsed as a structured syllabus, any
/// other file is read as raw text.
pub fn parse_syllabus(path: &Path) -> Result<SyllabusInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read syllabus: {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        let syllabus = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse syllabus JSON: {}", path.display()))?;
        Ok(SyllabusInput::Structured(syllabus))
    } else {
        Ok(SyllabusInput::Raw(content))
    }
}

/// A warning from question set validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// Zero-based question index (if applicable).
    pub question_index: Option<usize>,
    /// Warning message.
    pub message: String,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.question_index {
            Some(index) => write!(f, "question {}: {}", index + 1, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Validate a question set for common issues.
pub fn validate_question_set(
    questions: &[Question],
    config: Option<&GenerationConfig>,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut seen_text: HashMap<String, usize> = HashMap::new();

    for (index, question) in questions.iter().enumerate() {
        let mut warn = |message: String| {
            warnings.push(ValidationWarning {
                question_index: Some(index),
                message,
            })
        };

        let normalized = question.text.trim().to_lowercase();
        if normalized.is_empty() {
            warn("question text is empty".into());
        } else if let Some(first) = seen_text.get(&normalized) {
            warn(format!("duplicate question text (same as question {})", first + 1));
        } else {
            seen_text.insert(normalized, index);
        }

        if question.marks == 0 {
            warn("question carries zero marks".into());
        }

        if question.question_type == QuestionType::Mcq && question.options.is_empty() {
            warn("mcq question has no options".into());
        }
    }

    if let Some(expected) = config.and_then(|c| c.total_marks) {
        let actual: u64 = questions.iter().map(|q| u64::from(q.marks)).sum();
        if actual != u64::from(expected) {
            warnings.push(ValidationWarning {
                question_index: None,
                message: format!("total marks {actual} differ from configured total {expected}"),
            });
        }
    }

    warnings
}
