//! Model-name prefix to backend adapter lookup.

use std::sync::Arc;

use super::gemini::GeminiClient;
use super::openai_compat::OpenAiCompatibleClient;
use super::{ProviderDescriptor, TextGenerator};
use crate::config::{
    DASHSCOPE_KEY_VAR, DEEPSEEK_KEY_VAR, GOOGLE_KEY_VAR, OPENAI_KEY_VAR, XAI_KEY_VAR,
};

/// Strips the legacy `models/` prefix Gemini identifiers sometimes carry.
pub fn normalize_model_id(model: &str) -> String {
    let trimmed = model.trim();
    trimmed
        .strip_prefix("models/")
        .unwrap_or(trimmed)
        .to_string()
}

#[derive(Clone)]
pub struct ProviderEntry {
    pub descriptor: ProviderDescriptor,
    pub adapter: Arc<dyn TextGenerator>,
}

/// Ordered prefix table with a designated default backend.
#[derive(Clone)]
pub struct ProviderRegistry {
    routes: Vec<(String, ProviderEntry)>,
    default: ProviderEntry,
}

impl ProviderRegistry {
    /// Creates a registry that sends every model to `default`.
    pub fn new(descriptor: ProviderDescriptor, adapter: Arc<dyn TextGenerator>) -> Self {
        Self {
            routes: Vec::new(),
            default: ProviderEntry {
                descriptor,
                adapter,
            },
        }
    }

    /// Routes models whose normalized name starts with `prefix`. First registration wins.
    pub fn register(
        mut self,
        prefix: impl Into<String>,
        descriptor: ProviderDescriptor,
        adapter: Arc<dyn TextGenerator>,
    ) -> Self {
        self.routes.push((
            prefix.into().to_ascii_lowercase(),
            ProviderEntry {
                descriptor,
                adapter,
            },
        ));
        self
    }

    /// The backends the service talks to in production.
    pub fn standard(http: reqwest::Client) -> Self {
        let compat = |name: &str, base_url: &str, key_var: &str| {
            (
                ProviderDescriptor::new(name, key_var),
                Arc::new(OpenAiCompatibleClient::new(name, base_url, http.clone()))
                    as Arc<dyn TextGenerator>,
            )
        };

        let (openai, openai_adapter) =
            compat("openai", "https://api.openai.com/v1", OPENAI_KEY_VAR);
        let (xai, xai_adapter) = compat("xai", "https://api.x.ai/v1", XAI_KEY_VAR);
        let (deepseek, deepseek_adapter) =
            compat("deepseek", "https://api.deepseek.com", DEEPSEEK_KEY_VAR);
        let (qwen, qwen_adapter) = compat(
            "dashscope",
            "https://dashscope.aliyuncs.com/compatible-mode/v1",
            DASHSCOPE_KEY_VAR,
        );

        Self::new(
            ProviderDescriptor::new("gemini", GOOGLE_KEY_VAR),
            Arc::new(GeminiClient::new(http.clone())),
        )
        .register("gpt", openai, openai_adapter)
        .register("grok", xai, xai_adapter)
        .register("deepseek", deepseek, deepseek_adapter)
        .register("qwen", qwen, qwen_adapter)
    }

    /// Picks the backend for a model identifier (normalized or not).
    pub fn resolve(&self, model: &str) -> &ProviderEntry {
        let model = normalize_model_id(model).to_ascii_lowercase();
        self.routes
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix.as_str()))
            .map(|(_, entry)| entry)
            .unwrap_or(&self.default)
    }

    pub fn default_entry(&self) -> &ProviderEntry {
        &self.default
    }
}
