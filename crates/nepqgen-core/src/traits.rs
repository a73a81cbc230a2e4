//! Core trait definitions for generative model providers.
//!
//! The async [`LlmProvider`] trait is implemented by the
//! `nepqgen-providers` crate. Providers only move text; everything that
//! interprets the reply (JSON extraction, question normalization, fallback)
//! lives in [`crate::generator`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for generative model backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send a prompt and return the model's text reply.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List models known to this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request sent to a generative model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-1.5-flash").
    pub model: String,
    /// The rendered prompt.
    pub prompt: String,
    /// Optional system instruction supplied by the operator.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Ask the backend for a JSON reply when it supports that mode.
    #[serde(default)]
    pub json_output: bool,
}

/// Reply from a generative model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw reply text.
    pub content: String,
    /// Model that actually produced the reply.
    pub model: String,
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    /// Estimated cost in USD.
    pub estimated_cost_usd: f64,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
        self.estimated_cost_usd += other.estimated_cost_usd;
    }
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
    /// Cost per 1K input tokens in USD.
    pub cost_per_1k_input: f64,
    /// Cost per 1K output tokens in USD.
    pub cost_per_1k_output: f64,
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Pull the JSON payload out of a model reply.
///
/// Handles:
/// - a ```json``` fenced block (first one wins)
/// - a generic ``` block, if no json-tagged block exists
/// - an unclosed fence from a truncated reply
/// - bare text, trimmed to the outermost `[`/`{` ... `]`/`}` span
pub fn extract_json_from_markdown(response: &str) -> String {
    let mut json_blocks = Vec::new();
    let mut generic_blocks = Vec::new();
    let mut in_block = false;
    let mut is_json_block = false;
    let mut is_generic_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            is_generic_block = lang.is_empty();
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                json_blocks.push(current_block.clone());
            } else if is_generic_block {
                generic_blocks.push(current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    if in_block && !current_block.is_empty() {
        if is_json_block {
            json_blocks.push(current_block);
        } else if is_generic_block {
            generic_blocks.push(current_block);
        }
    }

    if let Some(block) = json_blocks.into_iter().next() {
        return block;
    }
    if let Some(block) = generic_blocks.into_iter().next() {
        return block;
    }

    outermost_json_span(response).to_string()
}

fn outermost_json_span(text: &str) -> &str {
    let start = text.find(['[', '{']);
    let end = text.rfind([']', '}']);
    match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_fence() {
        let input = "Here you go:\n\n```json\n[{\"text\": \"Q1\"}]\n```\n\nGood luck!";
        assert_eq!(extract_json_from_markdown(input), "[{\"text\": \"Q1\"}]");
    }

    #[test]
    fn extract_prefers_json_over_generic() {
        let input = "```\nnot this\n```\n\n```json\n{\"subject\": \"Physics\"}\n```\n";
        assert_eq!(extract_json_from_markdown(input), "{\"subject\": \"Physics\"}");
    }

    #[test]
    fn extract_generic_fence() {
        let input = "```\n[1, 2]\n```";
        assert_eq!(extract_json_from_markdown(input), "[1, 2]");
    }

    #[test]
    fn extract_truncated_fence() {
        let input = "```json\n[{\"text\": \"Q1\"}";
        assert_eq!(extract_json_from_markdown(input), "[{\"text\": \"Q1\"}");
    }

    #[test]
    fn extract_bare_json_with_chatter() {
        let input = "Sure! Here are the questions: [{\"text\": \"Q1\"}] Hope this helps.";
        assert_eq!(extract_json_from_markdown(input), "[{\"text\": \"Q1\"}]");
    }

    #[test]
    fn extract_plain_text_returned_trimmed() {
        assert_eq!(extract_json_from_markdown("  no json here  "), "no json here");
    }

    #[test]
    fn token_usage_accumulates() {
        let mut total = TokenUsage::default();
        total.add(&TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
            estimated_cost_usd: 0.5,
        });
        total.add(&TokenUsage {
            prompt_tokens: 1,
            completion_tokens: 1,
            total_tokens: 2,
            estimated_cost_usd: 0.25,
        });
        assert_eq!(total.total_tokens, 17);
        assert_eq!(total.estimated_cost_usd, 0.75);
    }
}
