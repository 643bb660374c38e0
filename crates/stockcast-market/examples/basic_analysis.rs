//! Basic stock analysis example
//!
//! Runs one two-phase analysis and prints the dashboard after each phase.
//!
//! To run this example:
//! ```bash
//! # Gemini
//! export GEMINI_API_KEY=your_key_here
//!
//! # or a local OpenAI-compatible server (LM Studio, Ollama, ...)
//! export STOCKCAST_PROVIDER=openai
//! export STOCKCAST_API_BASE=http://localhost:1234/v1
//! export STOCKCAST_MODEL=qwen2.5-7b-instruct
//!
//! cargo run -p stockcast-market --example basic_analysis RELIANCE
//! ```

use std::env;
use std::sync::Arc;
use stockcast_market::{AiStockGenerator, AnalysisSession, Dashboard, StockConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockcast_utils::load_dotenv();
    stockcast_utils::init_tracing();

    let ticker = env::args().nth(1).unwrap_or_else(|| "TCS".to_string());

    let config = Arc::new(StockConfig::builder().with_env().build()?);
    println!("Configuration:");
    println!("  - Provider: {}", config.provider);
    println!("  - Model: {}", config.model);
    println!("  - History days: {}\n", config.history_days);

    let generator = AiStockGenerator::from_config(config)?;
    let session = AnalysisSession::new(Arc::new(generator));
    let dashboard = Dashboard::default();

    // Show the basic panels as soon as they are published
    let mut updates = session.subscribe();
    let watcher = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let state = updates.borrow_and_update().clone();
                if state.is_analyzing()
                    && let Some(analysis) = &state.analysis
                {
                    println!("{}", dashboard.render_basic(analysis));
                }
            }
        })
    };

    let outcome = session.submit(&ticker).await;
    watcher.abort();

    let state = session.snapshot();
    println!("{}", dashboard.render(&state));
    println!("Outcome: {outcome:?}");

    Ok(())
}
