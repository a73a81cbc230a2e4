//! Core data model types for nepqgen.
//!
//! Questions arrive from generators we do not control (an LLM or the
//! deterministic fallback), so deserialization is lenient: malformed or
//! missing fields collapse to documented defaults instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Bloom-style cognitive level targeted by a question.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveLevel {
    Remember,
    #[default]
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl CognitiveLevel {
    /// All six levels in rubric order.
    pub const ALL: [CognitiveLevel; 6] = [
        CognitiveLevel::Remember,
        CognitiveLevel::Understand,
        CognitiveLevel::Apply,
        CognitiveLevel::Analyze,
        CognitiveLevel::Evaluate,
        CognitiveLevel::Create,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CognitiveLevel::Remember => "remember",
            CognitiveLevel::Understand => "understand",
            CognitiveLevel::Apply => "apply",
            CognitiveLevel::Analyze => "analyze",
            CognitiveLevel::Evaluate => "evaluate",
            CognitiveLevel::Create => "create",
        }
    }

    /// Capitalized name used in issue messages ("Understand").
    pub fn title(&self) -> &'static str {
        match self {
            CognitiveLevel::Remember => "Remember",
            CognitiveLevel::Understand => "Understand",
            CognitiveLevel::Apply => "Apply",
            CognitiveLevel::Analyze => "Analyze",
            CognitiveLevel::Evaluate => "Evaluate",
            CognitiveLevel::Create => "Create",
        }
    }
}

impl fmt::Display for CognitiveLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CognitiveLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remember" => Ok(CognitiveLevel::Remember),
            "understand" => Ok(CognitiveLevel::Understand),
            "apply" => Ok(CognitiveLevel::Apply),
            "analyze" | "analyse" => Ok(CognitiveLevel::Analyze),
            "evaluate" => Ok(CognitiveLevel::Evaluate),
            "create" => Ok(CognitiveLevel::Create),
            other => Err(format!("unknown cognitive level: {other}")),
        }
    }
}

/// Question format tag.
///
/// The set is open: generators may emit tags we have no variant for, and
/// those are kept verbatim in [`QuestionType::Other`] so they still count as
/// their own category. Build values with `QuestionType::from`, which maps
/// every known tag to its variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    Mcq,
    Short,
    Medium,
    Long,
    Application,
    CaseStudy,
    ProblemSolving,
    Other(OtherTag),
}

/// A question type tag with no dedicated [`QuestionType`] variant.
///
/// Only constructed by `QuestionType::from`, so it never holds a known tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OtherTag(String);

impl OtherTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl QuestionType {
    /// Tag used when a question carries no type at all.
    pub fn unknown() -> Self {
        QuestionType::Other(OtherTag("unknown".to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Short => "short",
            QuestionType::Medium => "medium",
            QuestionType::Long => "long",
            QuestionType::Application => "application",
            QuestionType::CaseStudy => "case_study",
            QuestionType::ProblemSolving => "problem_solving",
            QuestionType::Other(tag) => tag.as_str(),
        }
    }
}

impl From<String> for QuestionType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "mcq" => QuestionType::Mcq,
            "short" => QuestionType::Short,
            "medium" => QuestionType::Medium,
            "long" => QuestionType::Long,
            "application" => QuestionType::Application,
            "case_study" => QuestionType::CaseStudy,
            "problem_solving" => QuestionType::ProblemSolving,
            _ => QuestionType::Other(OtherTag(tag)),
        }
    }
}

impl From<&str> for QuestionType {
    fn from(tag: &str) -> Self {
        QuestionType::from(tag.to_string())
    }
}

impl From<QuestionType> for String {
    fn from(t: QuestionType) -> Self {
        match t {
            QuestionType::Other(OtherTag(tag)) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single exam question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawQuestion")]
pub struct Question {
    /// Question text shown to the candidate.
    pub text: String,
    /// Format tag (mcq, short, case_study, ...).
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Marks awarded for a complete answer.
    pub marks: u32,
    /// Targeted cognitive level.
    pub cognitive_level: CognitiveLevel,
    /// Syllabus topic the question belongs to.
    pub topic: String,
    /// Difficulty on a 1-10 scale, when the generator reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    /// Model answer or solution approach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub marking_scheme: Vec<String>,
    /// Answer options (MCQ only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Question {
    /// A question with default marks, level and topic.
    pub fn new(text: impl Into<String>, question_type: impl Into<QuestionType>) -> Self {
        Self {
            text: text.into(),
            question_type: question_type.into(),
            marks: 0,
            cognitive_level: CognitiveLevel::default(),
            topic: default_topic(),
            difficulty: None,
            answer: None,
            marking_scheme: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn with_marks(mut self, marks: u32) -> Self {
        self.marks = marks;
        self
    }

    pub fn with_level(mut self, level: CognitiveLevel) -> Self {
        self.cognitive_level = level;
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }
}

fn default_topic() -> String {
    "Unknown".to_string()
}

/// Untyped wire shape of a question; every field is optional and coerced.
#[derive(Debug, Default, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    text: Option<Value>,
    #[serde(default, rename = "type")]
    question_type: Option<Value>,
    #[serde(default)]
    marks: Option<Value>,
    #[serde(default)]
    cognitive_level: Option<Value>,
    #[serde(default)]
    topic: Option<Value>,
    #[serde(default)]
    difficulty: Option<Value>,
    #[serde(default)]
    answer: Option<Value>,
    #[serde(default)]
    marking_scheme: Option<Value>,
    #[serde(default)]
    options: Option<Value>,
}

impl From<RawQuestion> for Question {
    fn from(raw: RawQuestion) -> Self {
        Self {
            text: coerce_string(raw.text).unwrap_or_default(),
            question_type: coerce_string(raw.question_type)
                .map(QuestionType::from)
                .unwrap_or_else(QuestionType::unknown),
            marks: coerce_u32(raw.marks).unwrap_or(0),
            cognitive_level: coerce_string(raw.cognitive_level)
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            topic: coerce_string(raw.topic).unwrap_or_else(default_topic),
            difficulty: coerce_u32(raw.difficulty).and_then(|d| u8::try_from(d).ok()),
            answer: coerce_string(raw.answer),
            marking_scheme: coerce_string_list(raw.marking_scheme),
            options: coerce_string_list(raw.options),
        }
    }
}

fn coerce_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_u32(value: Option<Value>) -> Option<u32> {
    let as_float = match value? {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return u32::try_from(u).ok();
            }
            n.as_f64()?
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(u) = s.parse::<u32>() {
                return Some(u);
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    if as_float.is_finite() && as_float >= 0.0 && as_float <= u32::MAX as f64 {
        Some(as_float as u32)
    } else {
        None
    }
}

fn coerce_string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| coerce_string(Some(v)))
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    }
}

/// One block of a paper: `count` questions of one type, each worth `marks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSetSpec {
    #[serde(rename = "type", default = "default_set_type")]
    pub question_type: QuestionType,
    #[serde(default = "default_set_marks")]
    pub marks: u32,
    #[serde(default = "default_set_count")]
    pub count: u32,
    /// Topics this block should draw from (informational).
    #[serde(default)]
    pub topics: Vec<String>,
}

fn default_set_type() -> QuestionType {
    QuestionType::Short
}

fn default_set_marks() -> u32 {
    5
}

fn default_set_count() -> u32 {
    1
}

impl Default for QuestionSetSpec {
    fn default() -> Self {
        Self {
            question_type: QuestionType::Short,
            marks: 5,
            count: 4,
            topics: Vec::new(),
        }
    }
}

/// Paper-level generation settings.
///
/// The rubric evaluator accepts this but does not use it in its scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subject: String,
    /// Intended paper total; checked against the generated marks.
    #[serde(default)]
    pub total_marks: Option<u32>,
    /// Difficulty on a 1-10 scale.
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default)]
    pub question_sets: Vec<QuestionSetSpec>,
    #[serde(default)]
    pub priority_topics: Vec<String>,
    #[serde(default)]
    pub instructions: String,
}

fn default_difficulty() -> u8 {
    5
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            subject: String::new(),
            total_marks: None,
            difficulty: default_difficulty(),
            question_sets: Vec::new(),
            priority_topics: Vec::new(),
            instructions: String::new(),
        }
    }
}

impl GenerationConfig {
    /// Configured question sets, or a single block of four 5-mark short
    /// questions when none are configured.
    pub fn effective_question_sets(&self) -> Vec<QuestionSetSpec> {
        if self.question_sets.is_empty() {
            vec![QuestionSetSpec::default()]
        } else {
            self.question_sets.clone()
        }
    }
}

/// A syllabus topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default = "default_importance")]
    pub importance: String,
    #[serde(default, deserialize_with = "lenient_level")]
    pub cognitive_level: CognitiveLevel,
}

/// Accepts any value for a cognitive level, falling back to `understand`.
fn lenient_level<'de, D>(deserializer: D) -> Result<CognitiveLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_string(value)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

fn default_importance() -> String {
    "medium".to_string()
}

/// Structured view of a syllabus document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Syllabus {
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub question_patterns: Vec<QuestionSetSpec>,
    #[serde(default)]
    pub difficulty_areas: Vec<String>,
    #[serde(default)]
    pub key_concepts: Vec<String>,
}

fn default_subject() -> String {
    "Unknown Subject".to_string()
}

impl Syllabus {
    /// Names of all topics, in syllabus order.
    pub fn topic_names(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.name.clone()).collect()
    }
}
