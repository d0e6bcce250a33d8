use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::layout::Party;

pub const DEFAULT_MODEL: &str = "models/gemini-2.5-pro";
pub const DEFAULT_TEST_MESSAGE: &str = "Hello, this is a connection test.";

/// Requested intensity of the letter's wording.
///
/// Unknown values deserialize to [`Tone::Professional`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Tone {
    #[default]
    Professional,
    Aggressive,
    Soft,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Aggressive => "aggressive",
            Tone::Soft => "soft",
        }
    }
}

impl From<&str> for Tone {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "aggressive" | "bold" => Tone::Aggressive,
            "soft" | "mild" => Tone::Soft,
            _ => Tone::Professional,
        }
    }
}

impl From<String> for Tone {
    fn from(value: String) -> Self {
        Tone::from(value.as_str())
    }
}

/// Everything needed to draft one letter. Field names follow the web form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LetterRequest {
    #[serde(default)]
    #[schema(example = "王小明")]
    pub sender_name: String,
    #[serde(default)]
    pub sender_address: String,
    #[serde(default)]
    #[schema(example = "李大華")]
    pub receiver_name: String,
    #[serde(default)]
    pub receiver_address: String,
    /// Informal description of the grievance.
    #[serde(default)]
    #[schema(example = "他欠我三個月房租一直不付")]
    pub case_details: String,
    #[serde(default)]
    pub tone: Tone,
    /// Model identifier; its prefix selects the backend.
    #[serde(default)]
    #[schema(example = "models/gemini-2.5-pro")]
    pub model_name: Option<String>,
    /// Caller-supplied key; overrides the server-side key.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub additional_instructions: Option<String>,
}

impl LetterRequest {
    pub fn sender(&self) -> Party {
        Party::new(&self.sender_name, &self.sender_address)
    }

    pub fn receiver(&self) -> Party {
        Party::new(&self.receiver_name, &self.receiver_address)
    }
}

/// Letter body text, generated or edited by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LetterDraft {
    pub text: String,
    /// True when the canned letter was returned because no key was configured.
    #[serde(default)]
    pub simulated: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionRequest {
    #[serde(default)]
    #[schema(example = "gpt-4o-mini")]
    pub model_name: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Sent verbatim; defaults to a fixed greeting.
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestConnectionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Normalized model identifier that was exercised.
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl TestConnectionResponse {
    pub fn ok(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            model: model.into(),
            details: None,
        }
    }

    pub fn failed(
        model: impl Into<String>,
        error: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            model: model.into(),
            details,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListModelsResponse {
    pub count: usize,
    pub models: Vec<String>,
}

impl From<Vec<String>> for ListModelsResponse {
    fn from(models: Vec<String>) -> Self {
        Self {
            count: models.len(),
            models,
        }
    }
}

/// Wizard state kept by the UI between steps.
///
/// The service never stores it; the UI passes it by value and converts it
/// into a [`LetterRequest`] when the user asks for a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LetterSession {
    pub step: u8,
    pub sender: Party,
    pub receiver: Party,
    pub case_details: String,
    pub generated_letter: String,
    pub tone: Tone,
    pub selected_model: String,
    pub api_key: String,
    pub additional_instructions: String,
    /// The user typed the letter body directly instead of drafting it.
    pub is_raw_content: bool,
}

impl Default for LetterSession {
    fn default() -> Self {
        Self {
            step: 1,
            sender: Party::default(),
            receiver: Party::default(),
            case_details: String::new(),
            generated_letter: String::new(),
            tone: Tone::Professional,
            selected_model: DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            additional_instructions: String::new(),
            is_raw_content: false,
        }
    }
}

impl LetterSession {
    pub fn to_request(&self) -> LetterRequest {
        LetterRequest {
            sender_name: self.sender.name.clone(),
            sender_address: self.sender.address.clone(),
            receiver_name: self.receiver.name.clone(),
            receiver_address: self.receiver.address.clone(),
            case_details: self.case_details.clone(),
            tone: self.tone,
            model_name: non_empty(&self.selected_model),
            api_key: non_empty(&self.api_key),
            additional_instructions: non_empty(&self.additional_instructions),
        }
    }

    /// Text to lay out on the form. In raw mode this is what the user typed.
    pub fn letter_text(&self) -> &str {
        &self.generated_letter
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
