//! Drafting orchestration.
//!
//! Holds no per-request state: the credential set is passed into every call
//! and each call makes at most one outbound request, bounded by a timeout.

use std::sync::Arc;
use std::time::Duration;

use super::fallback::fallback_letter;
use super::models::{
    LetterDraft, LetterRequest, ListModelsResponse, TestConnectionRequest, TestConnectionResponse,
    DEFAULT_TEST_MESSAGE,
};
use super::prompt::{system_prompt, user_prompt};
use super::validation::Validator;
use super::DraftingError;
use crate::config::{AppConfig, CredentialSet, GOOGLE_KEY_VAR};
use crate::providers::{
    normalize_model_id, GeminiClient, GenerationRequest, ModelCatalog, ProviderEntry,
    ProviderRegistry,
};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(1500);

#[derive(Clone)]
pub struct DraftingService {
    registry: Arc<ProviderRegistry>,
    catalog: Arc<dyn ModelCatalog>,
    catalog_credential_env: String,
    call_timeout: Duration,
    fallback_delay: Duration,
}

impl DraftingService {
    pub fn new(registry: ProviderRegistry, catalog: Arc<dyn ModelCatalog>) -> Self {
        Self {
            registry: Arc::new(registry),
            catalog,
            catalog_credential_env: GOOGLE_KEY_VAR.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            fallback_delay: DEFAULT_FALLBACK_DELAY,
        }
    }

    /// Production wiring: standard registry, Gemini model listing.
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        Self::new(
            ProviderRegistry::standard(http.clone()),
            Arc::new(GeminiClient::new(http)),
        )
        .with_call_timeout(config.request_timeout)
        .with_fallback_delay(config.fallback_delay)
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// Drafts letter text for `request`.
    ///
    /// Returns the canned letter instead of failing when no key resolves for
    /// the selected backend. The request is only borrowed, so the caller keeps
    /// its data for a retry after a failure.
    pub async fn draft(
        &self,
        request: &LetterRequest,
        credentials: &CredentialSet,
    ) -> Result<LetterDraft, DraftingError> {
        request.validate()?;

        let model = normalize_model_id(request.model_name.as_deref().unwrap_or_default());
        let entry = self.registry.resolve(&model);

        let Some(api_key) = credentials.resolve(
            request.api_key.as_deref(),
            &entry.descriptor.credential_env,
        ) else {
            log::warn!(
                "No API key for {} ({} unset); returning simulated letter",
                entry.descriptor.name,
                entry.descriptor.credential_env
            );
            tokio::time::sleep(self.fallback_delay).await;
            return Ok(LetterDraft {
                text: fallback_letter(request),
                simulated: true,
            });
        };

        log::info!(
            "Drafting letter with {} (model {}, tone {})",
            entry.descriptor.name,
            model,
            request.tone.as_str()
        );

        let text = self
            .call(
                entry,
                GenerationRequest {
                    model,
                    system: Some(system_prompt(request.tone)),
                    prompt: user_prompt(request),
                    api_key,
                },
            )
            .await?;

        Ok(LetterDraft {
            text,
            simulated: false,
        })
    }

    /// Sends a raw message to the selected backend and returns its reply.
    pub async fn try_connection(
        &self,
        request: &TestConnectionRequest,
        credentials: &CredentialSet,
    ) -> Result<String, DraftingError> {
        request.validate()?;

        let model = normalize_model_id(request.model_name.as_deref().unwrap_or_default());
        let entry = self.registry.resolve(&model);
        let api_key = credentials
            .resolve(request.api_key.as_deref(), &entry.descriptor.credential_env)
            .ok_or_else(|| DraftingError::CredentialMissing {
                provider: entry.descriptor.name.clone(),
            })?;

        let prompt = request
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_TEST_MESSAGE)
            .to_string();

        log::info!("Testing connection to {} (model {})", entry.descriptor.name, model);

        self.call(
            entry,
            GenerationRequest {
                model,
                system: None,
                prompt,
                api_key,
            },
        )
        .await
    }

    /// Connection test that always yields a response record.
    ///
    /// Failures come back as `success: false` together with the error that
    /// caused them, so the caller can pick a status from its kind.
    pub async fn test_connection(
        &self,
        request: &TestConnectionRequest,
        credentials: &CredentialSet,
    ) -> (TestConnectionResponse, Option<DraftingError>) {
        let model = normalize_model_id(request.model_name.as_deref().unwrap_or_default());
        match self.try_connection(request, credentials).await {
            Ok(reply) => (TestConnectionResponse::ok(model, reply), None),
            Err(err) => {
                log::warn!("Connection test for '{}' failed: {}", model, err);
                let response = TestConnectionResponse::failed(model, err.to_string(), err.detail());
                (response, Some(err))
            }
        }
    }

    /// Lists text-generation models of the default backend.
    pub async fn list_models(
        &self,
        api_key: Option<&str>,
        credentials: &CredentialSet,
    ) -> Result<ListModelsResponse, DraftingError> {
        let provider = &self.registry.default_entry().descriptor.name;
        let api_key = credentials
            .resolve(api_key, &self.catalog_credential_env)
            .ok_or_else(|| DraftingError::CredentialMissing {
                provider: provider.clone(),
            })?;

        let listing = self.catalog.list_models(&api_key);
        let models = match tokio::time::timeout(self.call_timeout, listing).await {
            Ok(Ok(models)) => models,
            Ok(Err(err)) => {
                log::error!("Model listing from {} failed: {}", provider, err);
                return Err(DraftingError::from_provider(provider, err));
            }
            Err(_) => {
                return Err(DraftingError::timed_out(
                    provider,
                    self.call_timeout.as_secs(),
                ))
            }
        };

        log::info!("{} lists {} generation model(s)", provider, models.len());
        Ok(ListModelsResponse::from(models))
    }

    async fn call(
        &self,
        entry: &ProviderEntry,
        request: GenerationRequest,
    ) -> Result<String, DraftingError> {
        let provider = entry.descriptor.name.as_str();

        let generation = entry.adapter.generate(request);
        let text = match tokio::time::timeout(self.call_timeout, generation).await {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                log::error!("{} call failed: {}", provider, err);
                return Err(DraftingError::from_provider(provider, err));
            }
            Err(_) => {
                log::error!("{} call exceeded {:?}", provider, self.call_timeout);
                return Err(DraftingError::timed_out(provider, self.call_timeout.as_secs()));
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(DraftingError::BackendFailure {
                provider: provider.to_string(),
                message: "backend returned no usable text".to_string(),
                detail: None,
                upstream: None,
            });
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafting::models::Tone;
    use crate::drafting::prompt::SECTION_MARKERS;
    use crate::providers::{ProviderDescriptor, ProviderError, TextGenerator};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the last request and replies with a fixed result.
    struct Scripted {
        reply: Result<String, (u16, String)>,
        seen: Mutex<Option<GenerationRequest>>,
    }

    impl Scripted {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(None),
            })
        }

        fn status(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err((status, body.to_string())),
                seen: Mutex::new(None),
            })
        }

        fn last(&self) -> Option<GenerationRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError> {
            *self.seen.lock().unwrap() = Some(request);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err((status, body)) => Err(ProviderError::Upstream {
                    provider: "fake".into(),
                    status: *status,
                    message: crate::providers::error_message(body),
                    body: body.clone(),
                }),
            }
        }
    }

    struct NoCatalog;

    #[async_trait]
    impl ModelCatalog for NoCatalog {
        async fn list_models(&self, _api_key: &str) -> Result<Vec<String>, ProviderError> {
            Ok(vec!["gemini-2.5-pro".to_string()])
        }
    }

    fn service(default: Arc<Scripted>, openai: Arc<Scripted>) -> DraftingService {
        let registry = ProviderRegistry::new(
            ProviderDescriptor::new("gemini", GOOGLE_KEY_VAR),
            default,
        )
        .register(
            "gpt",
            ProviderDescriptor::new("openai", "OPENAI_API_KEY"),
            openai,
        );
        DraftingService::new(registry, Arc::new(NoCatalog)).with_fallback_delay(Duration::ZERO)
    }

    fn letter(model: &str) -> LetterRequest {
        LetterRequest {
            sender_name: "王小明".into(),
            receiver_name: "李大華".into(),
            case_details: "欠我三個月房租".into(),
            model_name: Some(model.into()),
            ..LetterRequest::default()
        }
    }

    #[tokio::test]
    async fn test_draft_without_credentials_falls_back() {
        let gemini = Scripted::ok("unused");
        let svc = service(gemini.clone(), Scripted::ok("unused"));

        let draft = svc
            .draft(&letter("models/gemini-2.5-pro"), &CredentialSet::new())
            .await
            .unwrap();

        assert!(draft.simulated);
        for marker in SECTION_MARKERS {
            assert!(draft.text.contains(marker));
        }
        assert!(gemini.last().is_none());
    }

    #[tokio::test]
    async fn test_draft_dispatches_by_prefix_with_server_key() {
        let openai = Scripted::ok("  查台端...  ");
        let svc = service(Scripted::ok("unused"), openai.clone());
        let credentials = CredentialSet::new().with("OPENAI_API_KEY", "sk-server");

        let draft = svc.draft(&letter("gpt-4o"), &credentials).await.unwrap();

        assert_eq!(draft.text, "查台端...");
        assert!(!draft.simulated);
        let sent = openai.last().unwrap();
        assert_eq!(sent.api_key, "sk-server");
        assert_eq!(sent.model, "gpt-4o");
        assert!(sent.system.unwrap().contains("台端"));
        assert!(sent.prompt.contains("欠我三個月房租"));
    }

    #[tokio::test]
    async fn test_draft_strips_models_prefix_and_prefers_caller_key() {
        let gemini = Scripted::ok("letter");
        let svc = service(gemini.clone(), Scripted::ok("unused"));
        let credentials = CredentialSet::new().with(GOOGLE_KEY_VAR, "server");
        let mut request = letter("models/gemini-2.5-flash");
        request.api_key = Some("caller".into());

        svc.draft(&request, &credentials).await.unwrap();

        let sent = gemini.last().unwrap();
        assert_eq!(sent.model, "gemini-2.5-flash");
        assert_eq!(sent.api_key, "caller");
    }

    #[tokio::test]
    async fn test_draft_missing_model_fails_fast() {
        let gemini = Scripted::ok("unused");
        let svc = service(gemini.clone(), Scripted::ok("unused"));
        let mut request = letter("");
        request.model_name = None;

        let err = svc.draft(&request, &CredentialSet::new()).await.unwrap_err();

        assert!(matches!(err, DraftingError::MalformedRequest(_)));
        assert!(gemini.last().is_none());
    }

    #[tokio::test]
    async fn test_draft_backend_error_surfaces_detail() {
        let gemini = Scripted::status(403, r#"{"error":{"message":"permission denied"}}"#);
        let svc = service(gemini, Scripted::ok("unused"));
        let credentials = CredentialSet::new().with(GOOGLE_KEY_VAR, "key");

        let err = svc.draft(&letter("gemini-2.5-pro"), &credentials).await.unwrap_err();

        assert_eq!(err.kind(), "BackendFailure");
        assert!(err.to_string().contains("permission denied"));
        assert!(err.detail().unwrap().contains("permission denied"));
    }

    #[tokio::test]
    async fn test_draft_blank_reply_is_failure() {
        let svc = service(Scripted::ok("   \n "), Scripted::ok("unused"));
        let credentials = CredentialSet::new().with(GOOGLE_KEY_VAR, "key");

        let err = svc.draft(&letter("gemini-2.5-pro"), &credentials).await.unwrap_err();
        assert!(err.to_string().contains("no usable text"));
    }

    struct Stalled;

    #[async_trait]
    impl TextGenerator for Stalled {
        async fn generate(&self, _request: GenerationRequest) -> Result<String, ProviderError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    #[tokio::test]
    async fn test_draft_times_out() {
        let registry = ProviderRegistry::new(
            ProviderDescriptor::new("gemini", GOOGLE_KEY_VAR),
            Arc::new(Stalled),
        );
        let svc = DraftingService::new(registry, Arc::new(NoCatalog))
            .with_call_timeout(Duration::from_millis(20));
        let credentials = CredentialSet::new().with(GOOGLE_KEY_VAR, "key");

        let err = svc.draft(&letter("gemini-2.5-pro"), &credentials).await.unwrap_err();

        assert_eq!(err.kind(), "BackendFailure");
        assert!(err.to_string().contains("no response within"));
    }

    #[tokio::test]
    async fn test_unknown_tone_matches_professional() {
        let gemini = Scripted::ok("letter");
        let svc = service(gemini.clone(), Scripted::ok("unused"));
        let credentials = CredentialSet::new().with(GOOGLE_KEY_VAR, "key");

        let mut request = letter("gemini-2.5-pro");
        request.tone = Tone::from("livid");
        svc.draft(&request, &credentials).await.unwrap();

        assert_eq!(
            gemini.last().unwrap().system.unwrap(),
            system_prompt(Tone::Professional)
        );
    }

    #[tokio::test]
    async fn test_connection_sends_raw_message() {
        let openai = Scripted::ok("pong");
        let svc = service(Scripted::ok("unused"), openai.clone());
        let request = TestConnectionRequest {
            model_name: Some("gpt-4o-mini".into()),
            api_key: Some("sk-caller".into()),
            message: None,
        };

        let (response, failure) = svc.test_connection(&request, &CredentialSet::new()).await;

        assert!(failure.is_none());
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("pong"));
        assert_eq!(response.model, "gpt-4o-mini");
        let sent = openai.last().unwrap();
        assert!(sent.system.is_none());
        assert_eq!(sent.prompt, DEFAULT_TEST_MESSAGE);
    }

    #[tokio::test]
    async fn test_connection_invalid_key_reports_failure() {
        let gemini = Scripted::status(
            400,
            r#"{"error":{"code":400,"message":"API key not valid"}}"#,
        );
        let svc = service(gemini, Scripted::ok("unused"));
        let request = TestConnectionRequest {
            model_name: Some("models/gemini-2.5-pro".into()),
            api_key: Some("bogus".into()),
            message: Some("hi".into()),
        };

        let (response, failure) = svc.test_connection(&request, &CredentialSet::new()).await;

        assert_eq!(failure.map(|e| e.kind()), Some("BackendFailure"));
        assert!(!response.success);
        assert_eq!(response.model, "gemini-2.5-pro");
        assert!(response.error.unwrap().contains("API key not valid"));
        assert!(!response.details.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connection_without_key_is_explicit_error() {
        let svc = service(Scripted::ok("unused"), Scripted::ok("unused"));
        let request = TestConnectionRequest {
            model_name: Some("gpt-4o".into()),
            ..TestConnectionRequest::default()
        };

        let err = svc
            .try_connection(&request, &CredentialSet::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DraftingError::CredentialMissing { ref provider } if provider == "openai"
        ));

        let (response, failure) = svc.test_connection(&request, &CredentialSet::new()).await;
        assert_eq!(failure.map(|e| e.kind()), Some("CredentialMissing"));
        assert!(!response.success);
        assert_eq!(response.model, "gpt-4o");
        assert!(response.details.is_none());
    }

    #[tokio::test]
    async fn test_list_models_requires_key() {
        let svc = service(Scripted::ok("unused"), Scripted::ok("unused"));
        let err = svc.list_models(None, &CredentialSet::new()).await.unwrap_err();
        assert_eq!(err.kind(), "CredentialMissing");

        let listed = svc
            .list_models(Some("AIza-caller"), &CredentialSet::new())
            .await
            .unwrap();
        assert_eq!(listed.count, 1);
    }
}
