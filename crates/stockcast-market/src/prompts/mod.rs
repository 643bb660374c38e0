//! Prompt templates for the two generation requests
//!
//! Templates are MiniJinja sources registered under stable names:
//! - `stock.basic`: company identity, latest quote and price history
//! - `stock.advanced`: metrics, narrative, peers and predictions
//!
//! Both are rendered with [`PromptVars`].

use chrono::{NaiveDate, Utc};
use minijinja::Environment;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::error;

/// Template name of the basic-data prompt
pub const BASIC_PROMPT: &str = "stock.basic";

/// Template name of the advanced-analysis prompt
pub const ADVANCED_PROMPT: &str = "stock.advanced";

const BASIC_TEMPLATE: &str = r#"
Generate essential stock information for the Indian stock ticker "{{ ticker }}".
The JSON object must strictly adhere to the provided schema.
All currency values must be in Indian Rupees (INR).
Today's date is {{ today }}.

Provide the following:
1.  "company_info": Details about the company (name, ticker, exchange).
2.  "current_price_info": The most recent (today's) simulated price information, as of {{ today }}.
3.  "historical_data": An array of the last {{ history_days }} trading days of stock data, with the most recent date being {{ today }} or the last trading day before it. Every "date" must be formatted YYYY-MM-DD. The data must be ordered from newest to oldest.
"#;

const ADVANCED_TEMPLATE: &str = r#"
You are an expert financial AI. Your task is to generate an advanced stock analysis for the Indian stock ticker "{{ ticker }}".
Your analysis and prediction should be based on a simulated high-performance model inspired by the 'Transformer and Time2Vec' architecture from academic research (e.g., DOI: 10.1109/ICAIIC64266.2025.10920805).
Today's date is {{ today }}.

The JSON object must strictly adhere to the provided schema.
All currency values must be in Indian Rupees (INR).

Provide the following:
1. "key_metrics": Important financial metrics. Market cap should be a string like "11.07LCr". 'pe_ratio' or 'div_yield' can be null.
2. "about": A concise, one-paragraph description of the company's business.
3. "related_stocks": An array of 4-5 related Indian companies or competitors.
4. "prediction": An AI-driven prediction for the next day's closing price (i.e., for the day after {{ today }}).
   - The 'analysis' text should be concise but sound professional, briefly mentioning how concepts like 'temporal encoding with Time2Vec' and 'multi-head attention' help capture market dynamics to justify the prediction.
   - The performance metrics must be very strong to reflect this advanced model. Generate a simulated R² score between 0.92 and 0.95, with correspondingly low RMSE and MAE values.
5. "historical_predictions": An array of predicted closing prices for each of the last {{ history_days }} trading days, with the most recent date being {{ today }} or the last trading day before it. Each object must have a 'date' (YYYY-MM-DD) and a 'predicted_close'. The predictions should closely track the actual prices but with some variance to simulate a realistic, high-performance model.
"#;

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    for (name, source) in [
        (BASIC_PROMPT, BASIC_TEMPLATE),
        (ADVANCED_PROMPT, ADVANCED_TEMPLATE),
    ] {
        if let Err(e) = env.add_template(name, source) {
            error!(template = name, error = %e, "Failed to register prompt template");
        }
    }
    env
});

/// Values interpolated into the prompts
#[derive(Debug, Clone, Serialize)]
pub struct PromptVars {
    /// Normalised ticker symbol
    pub ticker: String,
    /// Anchor date, rendered YYYY-MM-DD
    pub today: String,
    /// Number of trading days requested
    pub history_days: usize,
}

impl PromptVars {
    /// Variables anchored to today's UTC date
    pub fn new(ticker: impl Into<String>, history_days: usize) -> Self {
        Self::on(ticker, Utc::now().date_naive(), history_days)
    }

    /// Variables anchored to a fixed date
    pub fn on(ticker: impl Into<String>, today: NaiveDate, history_days: usize) -> Self {
        Self {
            ticker: ticker.into(),
            today: today.format("%Y-%m-%d").to_string(),
            history_days,
        }
    }
}

/// Render a named prompt template
pub fn render(name: &str, vars: &PromptVars) -> Result<String, minijinja::Error> {
    TEMPLATES.get_template(name)?.render(vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> PromptVars {
        PromptVars::on("TCS", NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(), 90)
    }

    #[test]
    fn test_basic_prompt() {
        let prompt = render(BASIC_PROMPT, &vars()).unwrap();
        assert!(prompt.contains("Indian stock ticker \"TCS\""));
        assert!(prompt.contains("Indian Rupees (INR)"));
        assert!(prompt.contains("Today's date is 2024-05-03."));
        assert!(prompt.contains("last 90 trading days"));
        assert!(prompt.contains("newest to oldest"));
    }

    #[test]
    fn test_advanced_prompt() {
        let prompt = render(ADVANCED_PROMPT, &vars()).unwrap();
        assert!(prompt.contains("expert financial AI"));
        assert!(prompt.contains("Time2Vec"));
        assert!(prompt.contains("multi-head attention"));
        assert!(prompt.contains("between 0.92 and 0.95"));
        assert!(prompt.contains("4-5 related Indian companies"));
        assert!(prompt.contains("\"11.07LCr\""));
        assert!(prompt.contains("the day after 2024-05-03"));
    }

    #[test]
    fn test_history_days_is_interpolated() {
        let vars = PromptVars::on("INFY", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 30);
        let prompt = render(ADVANCED_PROMPT, &vars).unwrap();
        assert!(prompt.contains("each of the last 30 trading days"));
    }

    #[test]
    fn test_templates_registered() {
        for name in [BASIC_PROMPT, ADVANCED_PROMPT] {
            assert!(TEMPLATES.get_template(name).is_ok(), "{name} not registered");
        }
    }

    #[test]
    fn test_unknown_template() {
        assert!(render("stock.missing", &vars()).is_err());
    }
}
