//! Error types for stock analysis operations

use stockcast_llm::LLMError;
use thiserror::Error;

/// Message shown for every failed generation request
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate data from AI model.";

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// The submitted ticker was empty or whitespace
    #[error("Please enter a stock ticker.")]
    EmptyTicker,

    /// The AI service did not produce usable data
    #[error("Failed to generate data from AI model.")]
    GenerationFailed(#[source] GenerationError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Underlying cause of a [`StockError::GenerationFailed`]
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Provider call failed
    #[error(transparent)]
    Llm(#[from] LLMError),

    /// Response text was not the expected JSON document
    #[error("invalid JSON in model response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Provider returned no text
    #[error("model returned an empty response")]
    EmptyResponse,

    /// Parsed data failed validation
    #[error("implausible model data: {0}")]
    Invalid(String),

    /// Prompt template failed to render
    #[error("prompt rendering failed: {0}")]
    Prompt(String),
}

impl From<minijinja::Error> for GenerationError {
    fn from(err: minijinja::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

impl From<GenerationError> for StockError {
    fn from(err: GenerationError) -> Self {
        Self::GenerationFailed(err)
    }
}

impl From<LLMError> for StockError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::ConfigurationError(msg) => Self::ConfigError(msg),
            other => Self::GenerationFailed(GenerationError::Llm(other)),
        }
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        assert_eq!(
            StockError::EmptyTicker.to_string(),
            "Please enter a stock ticker."
        );

        let err = StockError::from(GenerationError::EmptyResponse);
        assert_eq!(err.to_string(), GENERATION_FAILED_MESSAGE);
    }

    #[test]
    fn test_generation_failure_keeps_cause() {
        let err: StockError = GenerationError::Invalid("negative close".to_string()).into();
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("implausible model data: negative close"));
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: StockError = LLMError::ConfigurationError("missing key".to_string()).into();
        assert!(matches!(err, StockError::ConfigError(msg) if msg == "missing key"));

        let err: StockError = LLMError::AuthenticationFailed.into();
        assert!(matches!(
            err,
            StockError::GenerationFailed(GenerationError::Llm(LLMError::AuthenticationFailed))
        ));
    }
}
