//! nepqgen-providers: generative model integrations.
//!
//! Implements the `LlmProvider` trait for Gemini and Ollama, plus the
//! configuration file loader and provider factory used by the CLI.

pub mod config;
pub mod gemini;
pub mod mock;
pub mod ollama;

pub use config::{create_provider, discover_models, load_config, NepqgenConfig, ProviderConfig};
pub use nepqgen_core::error::ProviderError;
