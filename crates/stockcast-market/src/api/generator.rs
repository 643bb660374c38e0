//! LLM-backed stock data generator

use super::StockDataSource;
use super::schema::{ADVANCED_SCHEMA_NAME, BASIC_SCHEMA_NAME, advanced_stock_analysis, basic_stock_data};
use crate::config::StockConfig;
use crate::error::{GenerationError, Result, StockError};
use crate::model::{AdvancedStockAnalysis, BasicStockData};
use crate::prompts::{self, ADVANCED_PROMPT, BASIC_PROMPT, PromptVars};
use crate::validate;
use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::{Arc, LazyLock};
use stockcast_llm::{CompletionRequest, LLMProvider, Message, Schema, StopReason};
use tracing::{debug, error, instrument, warn};

static CODE_FENCE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$")
        .inspect_err(|e| error!(error = %e, "Invalid code fence pattern"))
        .ok()
});

/// Strip surrounding whitespace and an optional Markdown code fence
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    CODE_FENCE
        .as_ref()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str())
}

/// Generates stock data by prompting an LLM with a response schema
pub struct AiStockGenerator {
    provider: Arc<dyn LLMProvider>,
    config: Arc<StockConfig>,
}

impl AiStockGenerator {
    /// Create a generator over an already constructed provider
    pub fn new(provider: Arc<dyn LLMProvider>, config: Arc<StockConfig>) -> Self {
        Self { provider, config }
    }

    /// Build the provider from `config` and wrap it
    pub fn from_config(config: Arc<StockConfig>) -> Result<Self> {
        let provider = config.create_provider()?;
        Ok(Self::new(provider, config))
    }

    /// Configuration in use
    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    async fn generate<T: DeserializeOwned>(
        &self,
        prompt: String,
        schema_name: &str,
        schema: Schema,
    ) -> std::result::Result<T, GenerationError> {
        let request = CompletionRequest::builder(&self.config.model)
            .add_message(Message::user(prompt))
            .json_schema(schema_name, schema)
            .max_tokens(self.config.max_output_tokens)
            .maybe_temperature(self.config.temperature)
            .build();

        let response = self.provider.complete(request).await?;
        debug!(
            provider = self.provider.name(),
            output_tokens = response.usage.output_tokens,
            "Model responded"
        );
        if response.stop_reason == StopReason::MaxTokens {
            warn!("Response hit the output token limit and may be truncated");
        }

        let json = extract_json(response.text());
        if json.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(serde_json::from_str(json)?)
    }

    fn vars(&self, ticker: &str) -> PromptVars {
        PromptVars::new(ticker, self.config.history_days)
    }
}

fn collapse(stage: &str, err: GenerationError) -> StockError {
    error!(stage, error = %err, "Error fetching or parsing data from AI model");
    StockError::GenerationFailed(err)
}

#[async_trait]
impl StockDataSource for AiStockGenerator {
    #[instrument(skip(self))]
    async fn fetch_basic(&self, ticker: &str) -> Result<BasicStockData> {
        let result: std::result::Result<_, GenerationError> = async {
            let prompt = prompts::render(BASIC_PROMPT, &self.vars(ticker))?;
            let data: BasicStockData = self
                .generate(prompt, BASIC_SCHEMA_NAME, basic_stock_data())
                .await?;
            if self.config.validate_responses {
                validate::basic(data, self.config.history_days)
            } else {
                Ok(data)
            }
        }
        .await;
        result.map_err(|e| collapse("basic", e))
    }

    #[instrument(skip(self))]
    async fn fetch_advanced(&self, ticker: &str) -> Result<AdvancedStockAnalysis> {
        let result: std::result::Result<_, GenerationError> = async {
            let prompt = prompts::render(ADVANCED_PROMPT, &self.vars(ticker))?;
            let data: AdvancedStockAnalysis = self
                .generate(prompt, ADVANCED_SCHEMA_NAME, advanced_stock_analysis())
                .await?;
            if self.config.validate_responses {
                validate::advanced(data, self.config.history_days)
            } else {
                Ok(data)
            }
        }
        .await;
        result.map_err(|e| collapse("advanced", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use stockcast_llm::{CompletionResponse, LLMError, ResponseFormat, TokenUsage};

    /// Replays canned completions and records requests
    struct ScriptedProvider {
        replies: Mutex<VecDeque<stockcast_llm::Result<String>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<stockcast_llm::Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> stockcast_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            let text = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")?;
            Ok(CompletionResponse {
                message: Message::assistant(text),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn config() -> Arc<StockConfig> {
        Arc::new(StockConfig {
            api_key: Some("test".to_string()),
            ..Default::default()
        })
    }

    fn basic_json() -> String {
        json!({
            "company_info": { "name": "Tata Consultancy Services", "ticker": "TCS", "exchange": "NSE" },
            "current_price_info": { "price": 3542.1, "change": 12.5, "change_percent": 0.35, "direction": "up" },
            "historical_data": [
                { "date": "2024-05-03", "open": 3530.0, "high": 3550.0, "low": 3520.0, "close": 3542.1, "volume": 1234567 },
                { "date": "2024-05-02", "open": 3510.0, "high": 3535.0, "low": 3500.0, "close": 3529.6, "volume": 998877 }
            ]
        })
        .to_string()
    }

    fn advanced_json() -> String {
        json!({
            "key_metrics": {
                "market_cap": "12.81LCr", "pe_ratio": null, "div_yield": "1.4%",
                "52_wk_high": 4255.0, "52_wk_low": 3311.0, "previous_close": 3529.6
            },
            "about": "IT services.",
            "related_stocks": [
                { "name": "Infosys", "ticker": "INFY", "price": 1450.2, "change_percent": -0.8, "direction": "down" }
            ],
            "prediction": {
                "predicted_close": 3560.0, "analysis": "Time2Vec and attention.",
                "rmse": 12.3, "mae": 9.8, "r2_score": 0.93
            },
            "historical_predictions": [ { "date": "2024-05-03", "predicted_close": 3538.0 } ]
        })
        .to_string()
    }

    #[test]
    fn test_extract_json() {
        assert!(CODE_FENCE.is_some());
        assert_eq!(extract_json("  {\"a\":1}\n"), "{\"a\":1}");
        assert_eq!(extract_json("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json("```\n[1,2]\n```"), "[1,2]");
        assert_eq!(extract_json("   "), "");
    }

    #[tokio::test]
    async fn test_fetch_basic_request_shape() {
        let provider = ScriptedProvider::new(vec![Ok(basic_json())]);
        let generator = AiStockGenerator::new(provider.clone(), config());

        let data = generator.fetch_basic("TCS").await.unwrap();
        assert_eq!(data.company_info.ticker, "TCS");
        assert_eq!(data.historical_data.len(), 2);
        assert_eq!(data.historical_data[0].volume, 1_234_567);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.model, "gemini-2.5-flash");
        assert!(request.messages[0].text().contains("\"TCS\""));
        match &request.response_format {
            ResponseFormat::JsonSchema { name, schema } => {
                assert_eq!(name, BASIC_SCHEMA_NAME);
                assert!(schema.get("historical_data").is_some());
            }
            other => panic!("unexpected format: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_advanced_with_fence() {
        let fenced = format!("```json\n{}\n```", advanced_json());
        let provider = ScriptedProvider::new(vec![Ok(fenced)]);
        let generator = AiStockGenerator::new(provider, config());

        let data = generator.fetch_advanced("TCS").await.unwrap();
        assert!(data.key_metrics.pe_ratio.is_none());
        assert_eq!(data.key_metrics.div_yield.as_deref(), Some("1.4%"));
        assert_eq!(data.related_stocks.len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_collapsed() {
        let provider = ScriptedProvider::new(vec![Err(LLMError::RateLimitExceeded("busy".to_string()))]);
        let generator = AiStockGenerator::new(provider, config());

        let err = generator.fetch_basic("TCS").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate data from AI model.");
        assert!(matches!(
            err,
            StockError::GenerationFailed(GenerationError::Llm(LLMError::RateLimitExceeded(_)))
        ));
    }

    #[tokio::test]
    async fn test_malformed_json_is_collapsed() {
        let provider = ScriptedProvider::new(vec![Ok("{\"company_info\": ".to_string()), Ok(String::new())]);
        let generator = AiStockGenerator::new(provider, config());

        let err = generator.fetch_basic("TCS").await.unwrap_err();
        assert!(matches!(err, StockError::GenerationFailed(GenerationError::Parse(_))));

        let err = generator.fetch_advanced("TCS").await.unwrap_err();
        assert!(matches!(err, StockError::GenerationFailed(GenerationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_validation_toggle() {
        let mut doc: serde_json::Value = serde_json::from_str(&basic_json()).unwrap();
        doc["current_price_info"]["price"] = json!(-3542.1);
        let negative = doc.to_string();

        let provider = ScriptedProvider::new(vec![Ok(negative.clone())]);
        let generator = AiStockGenerator::new(provider, config());
        let err = generator.fetch_basic("TCS").await.unwrap_err();
        assert!(matches!(err, StockError::GenerationFailed(GenerationError::Invalid(_))));

        let lenient = Arc::new(StockConfig {
            validate_responses: false,
            ..(*config()).clone()
        });
        let provider = ScriptedProvider::new(vec![Ok(negative)]);
        let generator = AiStockGenerator::new(provider, lenient);
        let data = generator.fetch_basic("TCS").await.unwrap();
        assert!(data.current_price_info.price < 0.0);
    }
}
