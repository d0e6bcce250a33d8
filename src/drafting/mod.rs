//! Letter drafting - turns an informal case description into formal letter text.
//!
//! - `models` - request/response records and the UI session record
//! - `prompt` - persona, section structure and tone modifiers
//! - `fallback` - canned letter used when no key is configured
//! - `validation` - request checks run before any backend call
//! - `service` - orchestration over the provider registry
//! - `handlers` - HTTP endpoints

pub mod fallback;
pub mod handlers;
pub mod models;
pub mod prompt;
pub mod service;
pub mod validation;

pub use models::{
    LetterDraft, LetterRequest, LetterSession, ListModelsRequest, ListModelsResponse,
    TestConnectionRequest, TestConnectionResponse, Tone,
};
pub use service::DraftingService;
pub use validation::{ValidationError, ValidationErrors, Validator};

use serde_json::Value;
use thiserror::Error;

use crate::providers::ProviderError;

/// Errors surfaced by the drafting service.
#[derive(Debug, Error)]
pub enum DraftingError {
    #[error("invalid request: {0}")]
    MalformedRequest(#[from] ValidationErrors),
    #[error("no API key configured for {provider}")]
    CredentialMissing { provider: String },
    #[error("{provider} generation failed: {message}")]
    BackendFailure {
        provider: String,
        message: String,
        /// Provider-reported diagnostic, if any.
        detail: Option<String>,
        /// Upstream error body, when it was JSON.
        upstream: Option<Value>,
    },
}

impl DraftingError {
    pub(crate) fn from_provider(provider: &str, err: ProviderError) -> Self {
        DraftingError::BackendFailure {
            provider: provider.to_string(),
            message: err.to_string(),
            detail: err.detail(),
            upstream: err.upstream_payload(),
        }
    }

    pub(crate) fn timed_out(provider: &str, seconds: u64) -> Self {
        DraftingError::BackendFailure {
            provider: provider.to_string(),
            message: format!("no response within {seconds}s"),
            detail: None,
            upstream: None,
        }
    }

    pub fn detail(&self) -> Option<String> {
        match self {
            DraftingError::BackendFailure { detail, .. } => detail.clone(),
            _ => None,
        }
    }

    /// Short machine-readable kind, used as `ErrorResponse::error`.
    pub fn kind(&self) -> &'static str {
        match self {
            DraftingError::MalformedRequest(_) => "MalformedRequest",
            DraftingError::CredentialMissing { .. } => "CredentialMissing",
            DraftingError::BackendFailure { .. } => "BackendFailure",
        }
    }
}
