//! Configuration for stock analysis operations

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use stockcast_llm::LLMProvider;
use stockcast_llm::providers::{GeminiConfig, GeminiProvider, OpenAIConfig, OpenAIProvider};
use stockcast_utils::env_var;
use tracing::{info, warn};

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default model for OpenAI-compatible endpoints
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default number of trading days requested
pub const DEFAULT_HISTORY_DAYS: usize = 90;

/// Upper bound for `history_days`
pub const MAX_HISTORY_DAYS: usize = 365;

/// LLM backend used to fabricate stock data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini `generateContent` (default)
    #[default]
    Gemini,
    /// Any OpenAI-compatible `/chat/completions` endpoint
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// Environment variables holding the API key, in lookup order
    pub fn api_key_vars(self) -> &'static [&'static str] {
        match self {
            Self::Gemini => &["GEMINI_API_KEY", "API_KEY"],
            Self::OpenAi => &["OPENAI_API_KEY"],
        }
    }

    /// Model used when none is configured
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_MODEL,
            Self::OpenAi => DEFAULT_OPENAI_MODEL,
        }
    }

    /// Generated token limit used when none is configured
    pub fn default_max_output_tokens(self) -> usize {
        match self {
            Self::Gemini => 32_768,
            // chat completion models cap output at 16k
            Self::OpenAi => 16_384,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => f.write_str("gemini"),
            Self::OpenAi => f.write_str("openai"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" | "openai-compatible" | "lmstudio" => Ok(Self::OpenAi),
            other => Err(StockError::ConfigError(format!(
                "unknown provider '{other}' (expected 'gemini' or 'openai')"
            ))),
        }
    }
}

/// Configuration for stock analysis operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// LLM backend
    pub provider: ProviderKind,

    /// Model identifier passed to the provider
    pub model: String,

    /// API key (not serialised)
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Override for the provider's base URL
    pub api_base: Option<String>,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Sampling temperature (provider default when unset)
    pub temperature: Option<f32>,

    /// Upper bound on generated tokens per request
    pub max_output_tokens: usize,

    /// Number of trading days of history to request
    pub history_days: usize,

    /// Reject implausible numbers in model responses
    pub validate_responses: bool,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: ProviderKind::Gemini.default_model().to_string(),
            api_key: None,
            api_base: None,
            request_timeout: Duration::from_secs(120),
            temperature: None,
            max_output_tokens: ProviderKind::Gemini.default_max_output_tokens(),
            history_days: DEFAULT_HISTORY_DAYS,
            validate_responses: true,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(StockError::ConfigError("model must not be empty".to_string()));
        }

        if !(1..=MAX_HISTORY_DAYS).contains(&self.history_days) {
            return Err(StockError::ConfigError(format!(
                "history_days must be between 1 and {MAX_HISTORY_DAYS}, got {}",
                self.history_days
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(t) = self.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(StockError::ConfigError(format!(
                "temperature must be between 0.0 and 2.0, got {t}"
            )));
        }

        if self.provider == ProviderKind::Gemini && self.api_key.is_none() {
            return Err(StockError::ConfigError(
                "Gemini API key required (set GEMINI_API_KEY or API_KEY)".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the LLM provider described by this configuration
    pub fn create_provider(&self) -> Result<Arc<dyn LLMProvider>> {
        let timeout_secs = self.request_timeout.as_secs().max(1);
        let provider: Arc<dyn LLMProvider> = match self.provider {
            ProviderKind::Gemini => {
                let key = self.api_key.clone().ok_or_else(|| {
                    StockError::ConfigError("Gemini API key required".to_string())
                })?;
                let mut config = GeminiConfig::new(key).with_timeout(timeout_secs);
                if let Some(base) = &self.api_base {
                    config = config.with_api_base(base);
                }
                Arc::new(GeminiProvider::with_config(config)?)
            }
            ProviderKind::OpenAi => {
                // Local OpenAI-compatible servers accept any key
                let mut config = OpenAIConfig::new(self.api_key.clone().unwrap_or_default())
                    .with_timeout(timeout_secs);
                if let Some(base) = &self.api_base {
                    config = config.with_api_base(base);
                }
                Arc::new(OpenAIProvider::with_config(config)?)
            }
        };

        info!(
            provider = %self.provider,
            model = %self.model,
            timeout_secs,
            "LLM provider ready"
        );
        Ok(provider)
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    provider: Option<ProviderKind>,
    model: Option<String>,
    api_key: Option<String>,
    api_base: Option<String>,
    request_timeout: Option<Duration>,
    temperature: Option<f32>,
    max_output_tokens: Option<usize>,
    history_days: Option<usize>,
    validate_responses: Option<bool>,
}

impl StockConfigBuilder {
    /// Set the LLM backend
    pub fn provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the provider base URL
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the generated token limit
    pub fn max_output_tokens(mut self, tokens: usize) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Set the number of trading days requested
    pub fn history_days(mut self, days: usize) -> Self {
        self.history_days = Some(days);
        self
    }

    /// Enable or disable response validation
    pub fn validate_responses(mut self, enabled: bool) -> Self {
        self.validate_responses = Some(enabled);
        self
    }

    /// Fill unset fields from `STOCKCAST_*` variables and the provider's key variable
    ///
    /// Values already set on the builder win over the environment.
    /// Unparseable numbers are logged and ignored.
    pub fn with_env(self) -> Self {
        self.with_lookup(env_var)
    }

    /// Same as [`with_env`](Self::with_env) over an arbitrary variable source
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.provider.is_none() {
            self.provider = parse_logged(&lookup, "STOCKCAST_PROVIDER");
        }
        if self.model.is_none() {
            self.model = lookup("STOCKCAST_MODEL");
        }
        if self.api_base.is_none() {
            self.api_base = lookup("STOCKCAST_API_BASE");
        }
        if self.request_timeout.is_none() {
            self.request_timeout =
                parse_logged::<u64>(&lookup, "STOCKCAST_TIMEOUT_SECS").map(Duration::from_secs);
        }
        if self.history_days.is_none() {
            self.history_days = parse_logged(&lookup, "STOCKCAST_HISTORY_DAYS");
        }
        if self.api_key.is_none() {
            let provider = self.provider.unwrap_or_default();
            self.api_key = provider.api_key_vars().iter().find_map(|key| lookup(*key));
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();
        let provider = self.provider.unwrap_or(defaults.provider);

        let config = StockConfig {
            provider,
            model: self
                .model
                .unwrap_or_else(|| provider.default_model().to_string()),
            api_key: self.api_key,
            api_base: self.api_base,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            temperature: self.temperature.or(defaults.temperature),
            max_output_tokens: self
                .max_output_tokens
                .unwrap_or_else(|| provider.default_max_output_tokens()),
            history_days: self.history_days.unwrap_or(defaults.history_days),
            validate_responses: self
                .validate_responses
                .unwrap_or(defaults.validate_responses),
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_logged<T>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key)?.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}: {}", key, e);
            None
        }
    }
}
