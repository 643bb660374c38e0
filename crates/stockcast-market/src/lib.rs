//! AI-generated stock dashboard
//!
//! This crate turns a ticker symbol into a two-phase stock analysis produced
//! entirely by an LLM, and renders it for the terminal. It includes:
//!
//! - Prompt templates and JSON response schemas for the two requests
//! - A generator that calls any [`stockcast_llm::LLMProvider`] and parses the
//!   structured reply
//! - Validation of the generated numbers
//! - A session that runs basic then advanced generation and publishes each
//!   state through a `watch` channel
//! - Chart series derivation and a `comfy-table` dashboard
//!
//! # Architecture
//!
//! ```text
//! StockConfig ──► LLMProvider ──► AiStockGenerator (StockDataSource)
//!                                        │
//!                                 AnalysisSession ──► watch<AnalysisState> ──► Dashboard
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use stockcast_market::{AiStockGenerator, AnalysisSession, Dashboard, StockConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(StockConfig::builder().with_env().build()?);
//!     let generator = AiStockGenerator::from_config(config)?;
//!     let session = AnalysisSession::new(Arc::new(generator));
//!
//!     session.submit("tcs").await?;
//!     println!("{}", Dashboard::default().render(&session.snapshot()));
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod interface;
pub mod model;
pub mod prompts;
pub mod validate;

// Re-export main types for convenience
pub use api::{AiStockGenerator, StockDataSource};
pub use config::{ProviderKind, StockConfig, StockConfigBuilder};
pub use engine::{AnalysisSession, AnalysisState, Phase, SubmitOutcome};
pub use error::{GenerationError, Result, StockError};
pub use interface::{Dashboard, DashboardOptions};
pub use model::{AdvancedStockAnalysis, BasicStockData, StockAnalysis};
