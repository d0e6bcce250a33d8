#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use attest_letter_server::config::{AppConfig, CredentialSet, GOOGLE_KEY_VAR, OPENAI_KEY_VAR};
use attest_letter_server::drafting::DraftingService;
use attest_letter_server::providers::{
    GenerationRequest, ModelCatalog, ProviderDescriptor, ProviderError, ProviderRegistry,
    TextGenerator,
};
use attest_letter_server::AppState;

/// In-memory backend that replies with a fixed text or a fixed upstream error.
pub struct MockGenerator {
    provider: String,
    reply: Result<String, (u16, String)>,
    delay: Duration,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    pub fn replying(provider: &str, text: &str) -> Arc<Self> {
        Arc::new(Self {
            provider: provider.to_string(),
            reply: Ok(text.to_string()),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(provider: &str, status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            provider: provider.to_string(),
            reply: Err((status, body.to_string())),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Echoes the prompt back after `delay`, to tell concurrent calls apart.
    pub fn echoing(provider: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            provider: provider.to_string(),
            reply: Ok(String::new()),
            delay,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError> {
        let prompt = request.prompt.clone();
        self.calls.lock().unwrap().push(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Ok(text) if text.is_empty() => Ok(format!("echo: {prompt}")),
            Ok(text) => Ok(text.clone()),
            Err((status, body)) => Err(ProviderError::Upstream {
                provider: self.provider.clone(),
                status: *status,
                message: format!("HTTP {status}"),
                body: body.clone(),
            }),
        }
    }
}

pub struct MockCatalog {
    pub result: Result<Vec<String>, (u16, String)>,
}

#[async_trait::async_trait]
impl ModelCatalog for MockCatalog {
    async fn list_models(&self, _api_key: &str) -> Result<Vec<String>, ProviderError> {
        match &self.result {
            Ok(models) => Ok(models.clone()),
            Err((status, body)) => Err(ProviderError::Upstream {
                provider: "gemini".into(),
                status: *status,
                message: format!("HTTP {status}"),
                body: body.clone(),
            }),
        }
    }
}

pub fn catalog(models: &[&str]) -> Arc<MockCatalog> {
    Arc::new(MockCatalog {
        result: Ok(models.iter().map(|m| m.to_string()).collect()),
    })
}

/// Gemini as default, `gpt` routed to OpenAI. No fallback delay.
pub fn test_service(
    gemini: Arc<MockGenerator>,
    openai: Arc<MockGenerator>,
    catalog: Arc<MockCatalog>,
) -> DraftingService {
    let registry = ProviderRegistry::new(
        ProviderDescriptor::new("gemini", GOOGLE_KEY_VAR),
        gemini,
    )
    .register(
        "gpt",
        ProviderDescriptor::new("openai", OPENAI_KEY_VAR),
        openai,
    );

    DraftingService::new(registry, catalog).with_fallback_delay(Duration::ZERO)
}

pub fn test_state(service: DraftingService, credentials: CredentialSet) -> AppState {
    let config = AppConfig {
        credentials,
        fallback_delay: Duration::ZERO,
        ..AppConfig::default()
    };
    AppState::with_service(config, service)
}
