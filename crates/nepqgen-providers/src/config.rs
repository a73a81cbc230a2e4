//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use nepqgen_core::generator::GeneratorConfig;
use nepqgen_core::traits::{LlmProvider, ModelInfo};

use crate::gemini::GeminiProvider;
use crate::ollama::OllamaProvider;

/// Configuration for a single model provider.
///
/// Debug output masks API keys.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level nepqgen configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NepqgenConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    /// Max retries on transient provider errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Initial delay between retries in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Max concurrent question-set requests.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Prompt template for one question set: a file path or inline text.
    #[serde(default)]
    pub question_prompt_template: Option<String>,
    /// Prompt template for structuring syllabus text: a file path or inline text.
    #[serde(default)]
    pub syllabus_prompt_template: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Rubric TOML overriding the built-in NEP 2020 rubric.
    #[serde(default)]
    pub rubric: Option<PathBuf>,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./nepqgen-output")
}

impl Default for NepqgenConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
            question_prompt_template: None,
            syllabus_prompt_template: None,
            system_prompt: None,
            rubric: None,
        }
    }
}

impl NepqgenConfig {
    /// Build generator settings for `model`, reading prompt files where the
    /// configured value names an existing file.
    pub fn generator_config(&self, model: &str) -> Result<GeneratorConfig> {
        Ok(GeneratorConfig {
            model: model.to_string(),
            parallelism: self.parallelism.max(1),
            temperature: self.default_temperature,
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            question_prompt_template: resolve_prompt(self.question_prompt_template.as_deref())?,
            syllabus_prompt_template: resolve_prompt(self.syllabus_prompt_template.as_deref())?,
            system_prompt: resolve_prompt(self.system_prompt.as_deref())?,
            ..Default::default()
        })
    }
}

fn resolve_prompt(value: Option<&str>) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let path = Path::new(value);
    if path.is_file() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read prompt template: {}", path.display()))?;
        Ok(Some(text))
    } else {
        Ok(Some(value.to_string()))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!(
            "{}{}{}",
            &result[..start],
            value,
            &result[start + end + 1..]
        );
    }
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `nepqgen.toml` in the current directory
/// 2. `~/.config/nepqgen/config.toml`
///
/// `NEPQGEN_GEMINI_KEY` (or `GEMINI_API_KEY`) overrides the Gemini key.
pub fn load_config() -> Result<NepqgenConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<NepqgenConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("nepqgen.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => NepqgenConfig::default(),
    };

    let env_key = std::env::var("NEPQGEN_GEMINI_KEY")
        .or_else(|_| std::env::var("GEMINI_API_KEY"))
        .ok()
        .filter(|k| !k.is_empty());
    if let Some(key) = env_key {
        apply_gemini_key(&mut config, key);
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

/// Parse a configuration document.
pub fn parse_config(content: &str) -> Result<NepqgenConfig> {
    Ok(toml::from_str::<NepqgenConfig>(content)?)
}

fn apply_gemini_key(config: &mut NepqgenConfig, key: String) {
    let entry = config
        .providers
        .entry("gemini".into())
        .or_insert(ProviderConfig::Gemini {
            api_key: String::new(),
            base_url: None,
        });
    if let ProviderConfig::Gemini { api_key, .. } = entry {
        *api_key = key;
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("nepqgen"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            if api_key.trim().is_empty() {
                anyhow::bail!(
                    "provider '{name}' has no API key; set NEPQGEN_GEMINI_KEY or api_key in nepqgen.toml"
                );
            }
            Ok(Box::new(GeminiProvider::new(api_key, base_url.clone())))
        }
        ProviderConfig::Ollama { base_url } => Ok(Box::new(OllamaProvider::new(base_url))),
    }
}

/// Ask a provider which models it serves.
///
/// Gemini falls back to its built-in catalogue when the listing endpoint
/// cannot be reached; Ollama has no static catalogue and reports the error.
pub async fn discover_models(name: &str, config: &ProviderConfig) -> Result<Vec<ModelInfo>> {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            let provider = GeminiProvider::new(api_key, base_url.clone());
            if api_key.trim().is_empty() {
                return Ok(provider.available_models());
            }
            match provider.list_models_async().await {
                Ok(models) if !models.is_empty() => Ok(models),
                Ok(_) => Ok(provider.available_models()),
                Err(e) => {
                    tracing::warn!("model listing for '{name}' failed, using built-in list: {e:#}");
                    Ok(provider.available_models())
                }
            }
        }
        ProviderConfig::Ollama { base_url } => OllamaProvider::new(base_url)
            .list_models_async()
            .await
            .with_context(|| format!("failed to list models for provider '{name}'")),
    }
}
