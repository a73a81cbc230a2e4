//! Google Gemini API provider implementation.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use nepqgen_core::error::ProviderError;
use nepqgen_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_RETRY_AFTER_MS: u64 = 5000;

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });

        Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: GeminiUsage,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModelEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModelEntry {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    input_token_limit: u32,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

/// Seconds from a `google.rpc.RetryInfo` detail (e.g. `"retryDelay": "30s"`).
fn retry_delay_from_details(details: &[serde_json::Value]) -> Option<u64> {
    details.iter().find_map(|detail| {
        let delay = detail.get("retryDelay")?.as_str()?;
        let seconds: f64 = delay.strip_suffix('s')?.parse().ok()?;
        Some((seconds * 1000.0) as u64)
    })
}

/// USD per 1M tokens (input, output) for known models.
fn pricing(model: &str) -> (f64, f64) {
    if model.contains("pro") {
        (1.25, 5.0)
    } else if model.contains("flash-8b") {
        (0.0375, 0.15)
    } else {
        (0.075, 0.30)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction: request.system_prompt.as_ref().map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: text.clone() }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                response_mime_type: request
                    .json_output
                    .then(|| "application/json".to_string()),
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, request.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let header_retry = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000);
            let body = response.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<GeminiError>(&body).ok();

            if status == 429 {
                let retry_after_ms = header_retry
                    .or_else(|| {
                        parsed
                            .as_ref()
                            .and_then(|e| retry_delay_from_details(&e.error.details))
                    })
                    .unwrap_or(DEFAULT_RETRY_AFTER_MS);
                return Err(ProviderError::RateLimited { retry_after_ms }.into());
            }
            if status == 401 || status == 403 || body.contains("API_KEY_INVALID") {
                let message = parsed.map(|e| e.error.message).unwrap_or(body);
                return Err(ProviderError::AuthenticationFailed(message).into());
            }
            if status == 404 {
                return Err(ProviderError::ModelNotFound(request.model.clone()).into());
            }
            let message = parsed.map(|e| e.error.message).unwrap_or(body);
            return Err(ProviderError::ApiError { status, message }.into());
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse response: {e}")))?;

        let latency_ms = start.elapsed().as_millis() as u64;

        if api_response.candidates.is_empty() {
            let reason = api_response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(ProviderError::Blocked)
                .unwrap_or_else(|| ProviderError::InvalidResponse("no candidates returned".into()));
            return Err(reason.into());
        }

        let candidate = &api_response.candidates[0];
        let content: String = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        if content.trim().is_empty() {
            return Err(match candidate.finish_reason.as_deref() {
                Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
                    ProviderError::Blocked(reason.to_string())
                }
                _ => ProviderError::InvalidResponse("candidate contained no text".into()),
            }
            .into());
        }

        let usage = &api_response.usage_metadata;
        let (input_price, output_price) = pricing(&request.model);
        let estimated_cost = (usage.prompt_token_count as f64 * input_price
            + usage.candidates_token_count as f64 * output_price)
            / 1_000_000.0;

        tracing::debug!(chars = content.len(), latency_ms, "gemini reply");

        Ok(GenerateResponse {
            content,
            model: api_response
                .model_version
                .unwrap_or_else(|| request.model.clone()),
            token_usage: TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.prompt_token_count + usage.candidates_token_count,
                estimated_cost_usd: estimated_cost,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "gemini-1.5-flash".into(),
                name: "Gemini 1.5 Flash".into(),
                provider: "gemini".into(),
                max_context: 1_048_576,
                cost_per_1k_input: 0.000075,
                cost_per_1k_output: 0.0003,
            },
            ModelInfo {
                id: "gemini-1.5-flash-8b".into(),
                name: "Gemini 1.5 Flash-8B".into(),
                provider: "gemini".into(),
                max_context: 1_048_576,
                cost_per_1k_input: 0.0000375,
                cost_per_1k_output: 0.00015,
            },
            ModelInfo {
                id: "gemini-1.5-pro".into(),
                name: "Gemini 1.5 Pro".into(),
                provider: "gemini".into(),
                max_context: 2_097_152,
                cost_per_1k_input: 0.00125,
                cost_per_1k_output: 0.005,
            },
        ]
    }
}

impl GeminiProvider {
    /// Fetch the models this key can call `generateContent` on.
    pub async fn list_models_async(&self) -> anyhow::Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(format!("{}/v1beta/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body).into());
        }
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError { status, message }.into());
        }

        let list: GeminiModelList = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("failed to parse model list: {e}"))
        })?;

        Ok(list
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods.is_empty()
                    || m.supported_generation_methods
                        .iter()
                        .any(|method| method == "generateContent")
            })
            .map(|m| {
                let id = m
                    .name
                    .strip_prefix("models/")
                    .unwrap_or(&m.name)
                    .to_string();
                let (input_price, output_price) = pricing(&id);
                ModelInfo {
                    name: m.display_name.unwrap_or_else(|| id.clone()),
                    id,
                    provider: "gemini".into(),
                    max_context: m.input_token_limit,
                    cost_per_1k_input: input_price / 1000.0,
                    cost_per_1k_output: output_price / 1000.0,
                }
            })
            .collect())
    }
}
