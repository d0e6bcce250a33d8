//! Adapter for OpenAI-compatible `chat/completions` endpoints.
//!
//! OpenAI, xAI, DeepSeek and Alibaba DashScope all accept the same request
//! shape; only the base URL and the key differ.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{error_message, GenerationRequest, ProviderError, TextGenerator};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiCompatibleClient {
    provider: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAiCompatibleClient {
    pub fn new(
        provider: impl Into<String>,
        base_url: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            provider: provider.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn build_messages(request: &GenerationRequest) -> Vec<ChatMessage<'_>> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system.as_deref() {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.prompt,
    });
    messages
}

/// Extracts the first choice's text from a completion body.
fn parse_completion(provider: &str, body: &str) -> Result<String, ProviderError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode {
            provider: provider.to_string(),
            message: e.to_string(),
        })?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ProviderError::EmptyResponse {
            provider: provider.to_string(),
        })
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError> {
        let payload = ChatRequest {
            model: &request.model,
            messages: build_messages(&request),
        };

        log::debug!("POST {} (model {})", self.endpoint(), request.model);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&request.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: self.provider.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: self.provider.clone(),
                source,
            })?;

        if !status.is_success() {
            return Err(ProviderError::Upstream {
                provider: self.provider.clone(),
                status: status.as_u16(),
                message: error_message(&body),
                body,
            });
        }

        parse_completion(&self.provider, &body)
    }
}
