//! Request validation run before any backend call.
//!
//! Collects every problem at once so the UI can show them together.

use std::fmt;

use super::models::{LetterRequest, TestConnectionRequest};
use crate::providers::normalize_model_id;

/// Trait for validating request objects.
pub trait Validator {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Request field that failed, in wire (camelCase) naming.
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn missing_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} is required", label))
    }

    pub fn invalid_model(field: &str, value: &str) -> Self {
        Self::new(field, format!("'{}' is not a valid model identifier", value))
            .with_suggestion("Use a name such as gemini-2.5-pro, gpt-4o or deepseek-chat")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Model identifiers must be present and a single token.
pub fn validate_model_name(value: Option<&str>, field: &str, errors: &mut ValidationErrors) {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        errors.add(ValidationError::missing_field(field, "Model name"));
        return;
    };

    let normalized = normalize_model_id(raw);
    if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
        errors.add(ValidationError::invalid_model(field, raw));
    }
}

impl Validator for LetterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_model_name(self.model_name.as_deref(), "modelName", &mut errors);
        errors.into_result()
    }
}

impl Validator for TestConnectionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_model_name(self.model_name.as_deref(), "modelName", &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_rejected() {
        let request = LetterRequest::default();
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "modelName");
        assert!(errors.to_string().contains("Model name is required"));
    }

    #[test]
    fn test_bare_prefix_rejected() {
        let mut errors = ValidationErrors::new();
        validate_model_name(Some("models/"), "modelName", &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("not a valid model identifier"));
    }

    #[test]
    fn test_model_with_spaces_rejected() {
        let mut errors = ValidationErrors::new();
        validate_model_name(Some("gpt 4o"), "modelName", &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_valid_model_accepted() {
        let request = TestConnectionRequest {
            model_name: Some("models/gemini-2.5-flash".into()),
            ..TestConnectionRequest::default()
        };
        assert!(request.validate().is_ok());
    }
}
