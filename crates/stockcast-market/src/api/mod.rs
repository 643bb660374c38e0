//! AI request layer
//!
//! [`StockDataSource`] is the seam between the analysis session and whatever
//! produces stock data. [`AiStockGenerator`] implements it by asking an
//! [`stockcast_llm::LLMProvider`] for schema-shaped JSON.

mod generator;
pub mod schema;

pub use generator::{AiStockGenerator, extract_json};

use crate::error::Result;
use crate::model::{AdvancedStockAnalysis, BasicStockData};
use async_trait::async_trait;

/// Source of basic and advanced stock data for a ticker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockDataSource: Send + Sync {
    /// Company identity, latest quote and daily history
    async fn fetch_basic(&self, ticker: &str) -> Result<BasicStockData>;

    /// Metrics, narrative, peers and predictions
    async fn fetch_advanced(&self, ticker: &str) -> Result<AdvancedStockAnalysis>;
}
