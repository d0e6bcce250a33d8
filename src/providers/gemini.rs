//! Google Gemini adapter (`generateContent`) and model listing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{error_message, GenerationRequest, ModelCatalog, ProviderError, TextGenerator};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const PROVIDER: &str = "gemini";
const GENERATE_METHOD: &str = "generateContent";

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

pub struct GeminiClient {
    base_url: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(GEMINI_BASE_URL, http)
    }

    pub fn with_base_url(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, GENERATE_METHOD)
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<String, ProviderError> {
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() || has_error_field(&body) {
            return Err(ProviderError::Upstream {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                message: error_message(&body),
                body,
            });
        }
        Ok(body)
    }
}

fn transport(source: reqwest::Error) -> ProviderError {
    ProviderError::Transport {
        provider: PROVIDER.to_string(),
        source,
    }
}

fn decode(err: serde_json::Error) -> ProviderError {
    ProviderError::Decode {
        provider: PROVIDER.to_string(),
        message: err.to_string(),
    }
}

fn has_error_field(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .map(|value| value.get("error").is_some())
        .unwrap_or(false)
}

fn build_request(request: &GenerationRequest) -> GenerateRequest<'_> {
    GenerateRequest {
        system_instruction: request.system.as_deref().map(|system| Content {
            role: None,
            parts: vec![Part { text: system }],
        }),
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
    }
}

/// Joins the text parts of the first candidate.
fn parse_generation(body: &str) -> Result<String, ProviderError> {
    let response: GenerateResponse = serde_json::from_str(body).map_err(decode)?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse {
            provider: PROVIDER.to_string(),
        });
    }
    Ok(text)
}

/// Models that support `generateContent`, without the `models/` prefix.
fn parse_model_list(body: &str) -> Result<Vec<String>, ProviderError> {
    let list: ModelList = serde_json::from_str(body).map_err(decode)?;
    Ok(list
        .models
        .into_iter()
        .filter(|model| {
            model
                .supported_generation_methods
                .iter()
                .any(|method| method == GENERATE_METHOD)
        })
        .map(|model| {
            model
                .name
                .strip_prefix("models/")
                .unwrap_or(model.name.as_str())
                .to_string()
        })
        .collect())
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError> {
        let url = self.generate_url(&request.model);
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &request.api_key)
            .json(&build_request(&request))
            .send()
            .await
            .map_err(transport)?;

        let body = self.read_body(response).await?;
        parse_generation(&body)
    }
}

#[async_trait]
impl ModelCatalog for GeminiClient {
    async fn list_models(&self, api_key: &str) -> Result<Vec<String>, ProviderError> {
        let response = self
            .http
            .get(self.models_url())
            .header("x-goog-api-key", api_key)
            .query(&[("pageSize", "1000")])
            .send()
            .await
            .map_err(transport)?;

        let body = self.read_body(response).await?;
        parse_model_list(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url() {
        let client = GeminiClient::new(reqwest::Client::new());
        assert_eq!(
            client.generate_url("gemini-2.5-pro"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn test_request_shape() {
        let req = GenerationRequest {
            model: "gemini-2.5-flash".into(),
            system: Some("persona".into()),
            prompt: "case".into(),
            api_key: "AIza-test".into(),
        };
        let json = serde_json::to_value(build_request(&req)).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "persona");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "case");
    }

    #[test]
    fn test_request_without_system() {
        let req = GenerationRequest {
            model: "gemini-2.5-flash".into(),
            system: None,
            prompt: "ping".into(),
            api_key: "k".into(),
        };
        let json = serde_json::to_value(build_request(&req)).unwrap();
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_generation_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"查台端"},{"text":"積欠租金"}]}}]}"#;
        assert_eq!(parse_generation(body).unwrap(), "查台端積欠租金");
    }

    #[test]
    fn test_parse_generation_blocked_prompt() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(matches!(
            parse_generation(body),
            Err(ProviderError::EmptyResponse { .. })
        ));
    }

    #[test]
    fn test_parse_model_list_filters_and_strips() {
        let body = r#"{"models":[
            {"name":"models/gemini-2.5-pro","supportedGenerationMethods":["generateContent","countTokens"]},
            {"name":"models/text-embedding-004","supportedGenerationMethods":["embedContent"]},
            {"name":"models/gemini-2.5-flash","supportedGenerationMethods":["generateContent"]}
        ]}"#;
        assert_eq!(
            parse_model_list(body).unwrap(),
            vec!["gemini-2.5-pro", "gemini-2.5-flash"]
        );
    }

    #[test]
    fn test_error_field_detected() {
        assert!(has_error_field(r#"{"error":{"message":"nope"}}"#));
        assert!(!has_error_field(r#"{"models":[]}"#));
    }
}
