//! Text-generation backends.
//!
//! Every provider is reached through the [`TextGenerator`] trait, so the
//! drafting service never knows which HTTP API sits behind a model name.
//!
//! - `registry` - model-name prefix to adapter lookup
//! - `openai_compat` - OpenAI-style chat completions (OpenAI, xAI, DeepSeek, Qwen)
//! - `gemini` - Google Gemini, the default backend, plus its model listing

pub mod gemini;
pub mod openai_compat;
pub mod registry;

pub use gemini::GeminiClient;
pub use openai_compat::OpenAiCompatibleClient;
pub use registry::{normalize_model_id, ProviderEntry, ProviderRegistry};

use async_trait::async_trait;
use thiserror::Error;

/// A single-turn completion request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    /// Persona/system instruction. Absent for raw connection tests.
    pub system: Option<String>,
    pub prompt: String,
    pub api_key: String,
}

/// Errors reported by a backend adapter.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned HTTP {status}: {message}")]
    Upstream {
        provider: String,
        status: u16,
        message: String,
        /// Raw response body as reported by the provider.
        body: String,
    },
    #[error("{provider} returned an unreadable response: {message}")]
    Decode { provider: String, message: String },
    #[error("{provider} returned no text")]
    EmptyResponse { provider: String },
}

impl ProviderError {
    /// Provider-reported detail for diagnostics, when there is any.
    pub fn detail(&self) -> Option<String> {
        match self {
            ProviderError::Transport { source, .. } => Some(format!("{source:?}")),
            ProviderError::Upstream { body, .. } if !body.is_empty() => Some(body.clone()),
            ProviderError::Upstream { .. } => None,
            ProviderError::Decode { message, .. } => Some(message.clone()),
            ProviderError::EmptyResponse { .. } => None,
        }
    }

    /// Upstream body parsed as JSON, for pass-through to API callers.
    pub fn upstream_payload(&self) -> Option<serde_json::Value> {
        match self {
            ProviderError::Upstream { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}

/// Backend capability: system + user text in, generated text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError>;
}

/// Backend capability: list model identifiers usable for text generation.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(&self, api_key: &str) -> Result<Vec<String>, ProviderError>;
}

/// Static facts about a backend. The endpoint lives in the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub name: String,
    /// Environment variable holding the server-side key.
    pub credential_env: String,
}

impl ProviderDescriptor {
    pub fn new(name: impl Into<String>, credential_env: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credential_env: credential_env.into(),
        }
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Both OpenAI-style and Google-style APIs nest it under `error.message`.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no error message".to_string()
            } else {
                trimmed.chars().take(300).collect()
            }
        })
}
