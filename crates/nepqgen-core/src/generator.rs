//! Question generation orchestrator.
//!
//! Each question set of a paper is requested from the model concurrently
//! (bounded by `parallelism`), normalized, padded with fallback questions and
//! reassembled in set order. Generation never fails outright: a set whose
//! request cannot be completed is filled entirely from [`crate::fallback`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::error::ProviderError;
use crate::fallback::{fallback_question, infer_cognitive_level};
use crate::model::{GenerationConfig, Question, QuestionSetSpec, QuestionType, Syllabus};
use crate::traits::{
    extract_json_from_markdown, GenerateRequest, GenerateResponse, LlmProvider, TokenUsage,
};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);
const FALLBACK_TOPIC: &str = "General Topic";

/// Settings for the question generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Maximum concurrent set requests.
    pub parallelism: usize,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Retries on transient provider errors.
    pub max_retries: u32,
    /// Initial delay between retries; doubled after each attempt.
    pub retry_delay: Duration,
    /// Prompt for one question set. Without it every set uses fallbacks.
    pub question_prompt_template: Option<String>,
    /// Prompt for structuring raw syllabus text.
    pub syllabus_prompt_template: Option<String>,
    pub system_prompt: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            parallelism: 4,
            temperature: 0.7,
            max_tokens: 4096,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            question_prompt_template: None,
            syllabus_prompt_template: None,
            system_prompt: None,
        }
    }
}

/// Where the questions of a set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    Ai,
    Fallback,
}

impl std::fmt::Display for QuestionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionSource::Ai => f.write_str("ai"),
            QuestionSource::Fallback => f.write_str("fallback"),
        }
    }
}

/// How one question set was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOutcome {
    /// Position of the set in the paper.
    pub index: usize,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub requested: u32,
    /// Questions taken from the model reply.
    pub from_model: usize,
    /// Questions filled in by the fallback.
    pub from_fallback: usize,
    pub source: QuestionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub token_usage: TokenUsage,
    #[serde(default)]
    pub latency_ms: u64,
}

/// Result of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestions {
    /// Questions in set order.
    pub questions: Vec<Question>,
    pub outcomes: Vec<SetOutcome>,
    pub token_usage: TokenUsage,
    pub duration_ms: u64,
}

impl GeneratedQuestions {
    /// Number of sets that fell back entirely.
    pub fn fallback_sets(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.source == QuestionSource::Fallback)
            .count()
    }
}

/// A syllabus plus how it was obtained.
#[derive(Debug, Clone)]
pub struct StructuredSyllabus {
    pub syllabus: Syllabus,
    pub source: QuestionSource,
    /// Raw model reply, when the model was asked.
    pub raw_response: Option<String>,
    pub error: Option<String>,
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_set_start(&self, index: usize, set: &QuestionSetSpec);
    fn on_set_complete(&self, outcome: &SetOutcome);
    fn on_generation_complete(&self, total_questions: usize, fallback_sets: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_set_start(&self, _: usize, _: &QuestionSetSpec) {}
    fn on_set_complete(&self, _: &SetOutcome) {}
    fn on_generation_complete(&self, _: usize, _: usize, _: Duration) {}
}

/// Generates papers from a syllabus using an optional model provider.
pub struct QuestionGenerator {
    provider: Option<Arc<dyn LlmProvider>>,
    config: GeneratorConfig,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: GeneratorConfig) -> Self {
        Self {
            provider: Some(provider),
            config,
        }
    }

    /// A generator that only ever uses the deterministic fallback.
    pub fn offline(config: GeneratorConfig) -> Self {
        Self {
            provider: None,
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate every question set of `config` against `syllabus`.
    pub async fn generate(
        &self,
        syllabus: &Syllabus,
        config: &GenerationConfig,
        progress: &dyn ProgressReporter,
    ) -> GeneratedQuestions {
        let start = Instant::now();
        let sets = config.effective_question_sets();
        let semaphore = Semaphore::new(self.config.parallelism.max(1));

        tracing::info!(
            subject = %syllabus.subject,
            sets = sets.len(),
            "starting question generation"
        );

        let mut futures = FuturesUnordered::new();
        for (index, set) in sets.iter().enumerate() {
            let semaphore = &semaphore;
            futures.push(async move {
                let _permit = semaphore.acquire().await.ok();
                progress.on_set_start(index, set);
                self.generate_set(index, set, syllabus, config).await
            });
        }

        let mut completed = Vec::with_capacity(sets.len());
        while let Some((questions, outcome)) = futures.next().await {
            progress.on_set_complete(&outcome);
            completed.push((questions, outcome));
        }
        completed.sort_by_key(|(_, outcome)| outcome.index);

        let mut questions = Vec::new();
        let mut outcomes = Vec::with_capacity(completed.len());
        let mut token_usage = TokenUsage::default();
        for (set_questions, outcome) in completed {
            token_usage.add(&outcome.token_usage);
            questions.extend(set_questions);
            outcomes.push(outcome);
        }

        let elapsed = start.elapsed();
        let result = GeneratedQuestions {
            questions,
            outcomes,
            token_usage,
            duration_ms: elapsed.as_millis() as u64,
        };
        progress.on_generation_complete(result.questions.len(), result.fallback_sets(), elapsed);
        tracing::info!(
            questions = result.questions.len(),
            fallback_sets = result.fallback_sets(),
            "question generation finished"
        );
        result
    }

    async fn generate_set(
        &self,
        index: usize,
        set: &QuestionSetSpec,
        syllabus: &Syllabus,
        config: &GenerationConfig,
    ) -> (Vec<Question>, SetOutcome) {
        let count = set.count as usize;
        let difficulty = config.difficulty;
        let mut outcome = SetOutcome {
            index,
            question_type: set.question_type.clone(),
            requested: set.count,
            from_model: 0,
            from_fallback: 0,
            source: QuestionSource::Fallback,
            error: None,
            token_usage: TokenUsage::default(),
            latency_ms: 0,
        };

        let mut asked = false;
        let mut questions = match self.request_set(set, syllabus, config).await {
            Ok(Some((questions, usage, latency_ms))) => {
                asked = true;
                outcome.token_usage = usage;
                outcome.latency_ms = latency_ms;
                questions
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("set {} ({}) falling back: {e:#}", index + 1, set.question_type);
                outcome.error = Some(format!("{e:#}"));
                Vec::new()
            }
        };

        questions.truncate(count);
        outcome.from_model = questions.len();
        if outcome.from_model > 0 {
            outcome.source = QuestionSource::Ai;
        } else if asked {
            outcome.error = Some("model reply contained no usable questions".to_string());
        }

        while questions.len() < count {
            questions.push(fallback_question(syllabus, difficulty, &set.question_type));
        }
        outcome.from_fallback = count - outcome.from_model;

        tracing::info!(
            "set {} complete: {} questions ({} from model, {} fallback)",
            index + 1,
            questions.len(),
            outcome.from_model,
            outcome.from_fallback
        );
        (questions, outcome)
    }

    /// Ask the model for one set. `Ok(None)` means the model was not asked.
    async fn request_set(
        &self,
        set: &QuestionSetSpec,
        syllabus: &Syllabus,
        config: &GenerationConfig,
    ) -> Result<Option<(Vec<Question>, TokenUsage, u64)>> {
        let (Some(provider), Some(template)) =
            (&self.provider, &self.config.question_prompt_template)
        else {
            return Ok(None);
        };
        if set.count == 0 {
            return Ok(None);
        }

        let prompt = render_question_prompt(template, syllabus, set, config);
        let request = self.request(prompt);
        let response = self.call_with_retry(provider.as_ref(), &request).await?;
        tracing::debug!(chars = response.content.len(), "model reply received");

        let entries = parse_entries(&response.content)?;
        let questions = entries
            .into_iter()
            .filter_map(|entry| normalize_entry(entry, set, config.difficulty))
            .collect();
        Ok(Some((questions, response.token_usage, response.latency_ms)))
    }

    /// Turn raw syllabus text into a [`Syllabus`].
    pub async fn structure_syllabus(&self, raw_text: &str) -> StructuredSyllabus {
        let (Some(provider), Some(template)) =
            (&self.provider, &self.config.syllabus_prompt_template)
        else {
            return StructuredSyllabus {
                syllabus: Syllabus::fallback_from_text(raw_text),
                source: QuestionSource::Fallback,
                raw_response: None,
                error: None,
            };
        };

        let prompt = render_template(template, &[("syllabus_text", raw_text.to_string())]);
        let request = self.request(prompt);

        let mut raw_response = None;
        let attempt = async {
            let response = self.call_with_retry(provider.as_ref(), &request).await?;
            raw_response = Some(response.content.clone());
            let json = extract_json_from_markdown(&response.content);
            serde_json::from_str::<Syllabus>(&json).context("model reply is not a valid syllabus")
        };

        let result = attempt.await;
        match result {
            Ok(syllabus) => {
                tracing::info!(
                    subject = %syllabus.subject,
                    topics = syllabus.topics.len(),
                    "syllabus structured by model"
                );
                StructuredSyllabus {
                    syllabus,
                    source: QuestionSource::Ai,
                    raw_response,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("syllabus analysis failed, using fallback structure: {e:#}");
                StructuredSyllabus {
                    syllabus: Syllabus::fallback_from_text(raw_text),
                    source: QuestionSource::Fallback,
                    raw_response,
                    error: Some(format!("{e:#}")),
                }
            }
        }
    }

    fn request(&self, prompt: String) -> GenerateRequest {
        GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            system_prompt: self.config.system_prompt.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            json_output: true,
        }
    }

    /// Call the provider, retrying transient failures with exponential backoff.
    async fn call_with_retry(
        &self,
        provider: &dyn LlmProvider,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse> {
        let mut last_error = None;
        let mut retry_delay = self.config.retry_delay;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
            }
            match provider.generate(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if let Some(provider_error) = e.downcast_ref::<ProviderError>() {
                        if provider_error.is_permanent() {
                            return Err(e);
                        }
                        if let Some(ms) = provider_error.retry_after_ms() {
                            retry_delay = Duration::from_millis(ms).min(MAX_RETRY_DELAY);
                        }
                    }
                    tracing::warn!(
                        "{} request failed (attempt {}/{}): {e:#}",
                        provider.name(),
                        attempt + 1,
                        self.config.max_retries + 1
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("no request attempted")))
    }
}

/// Replace `{name}` placeholders in `template`.
pub fn render_template(template: &str, values: &[(&str, String)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in values {
        rendered = rendered.replace(&format!("{{{name}}}"), value);
    }
    rendered
}

fn render_question_prompt(
    template: &str,
    syllabus: &Syllabus,
    set: &QuestionSetSpec,
    config: &GenerationConfig,
) -> String {
    let topic_names = syllabus.topic_names();
    let focus_topics = if config.priority_topics.is_empty() {
        topic_names.iter().take(5).cloned().collect::<Vec<_>>()
    } else {
        config.priority_topics.clone()
    };
    let level = infer_cognitive_level(&set.question_type, set.marks, config.difficulty);

    render_template(
        template,
        &[
            ("subject", syllabus.subject.clone()),
            ("topics", topic_names.join(", ")),
            ("key_concepts", syllabus.key_concepts.join(", ")),
            ("learning_objectives", syllabus.learning_objectives.join(", ")),
            ("focus_topics", focus_topics.join(", ")),
            ("question_type", set.question_type.to_string()),
            ("count", set.count.to_string()),
            ("marks", set.marks.to_string()),
            ("difficulty", config.difficulty.to_string()),
            ("instructions", config.instructions.clone()),
            ("cognitive_level", level.to_string()),
        ],
    )
}

/// Decode a model reply into a list of JSON entries.
fn parse_entries(content: &str) -> Result<Vec<Value>> {
    let json = extract_json_from_markdown(content);
    let value: Value =
        serde_json::from_str(&json).context("model reply is not valid JSON")?;
    Ok(match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => Vec::new(),
    })
}

/// Fit one model entry to the set it was requested for.
fn normalize_entry(entry: Value, set: &QuestionSetSpec, difficulty: u8) -> Option<Question> {
    let Value::Object(map) = &entry else {
        return None;
    };
    let present = |key: &str| map.get(key).is_some_and(|v| !v.is_null());
    let has_level = present("cognitive_level");
    let has_topic = present("topic");

    let parsed: Question = serde_json::from_value(entry).ok()?;
    if parsed.text.trim().is_empty() {
        return None;
    }

    let marks = set.marks;
    let is_mcq = set.question_type == QuestionType::Mcq;
    Some(Question {
        text: parsed.text,
        question_type: set.question_type.clone(),
        marks,
        cognitive_level: if has_level {
            parsed.cognitive_level
        } else {
            infer_cognitive_level(&set.question_type, marks, difficulty)
        },
        topic: if has_topic {
            parsed.topic
        } else {
            FALLBACK_TOPIC.to_string()
        },
        difficulty: Some(difficulty),
        answer: Some(
            parsed
                .answer
                .unwrap_or_else(|| "Expected answer".to_string()),
        ),
        marking_scheme: if parsed.marking_scheme.is_empty() {
            vec![format!("Complete answer: {marks} marks")]
        } else {
            parsed.marking_scheme
        },
        options: if is_mcq { parsed.options } else { Vec::new() },
    })
}
