//! stockcast - AI-generated Indian stock analysis in the terminal
//!
//! # Usage
//!
//! ```bash
//! # Gemini (default)
//! export GEMINI_API_KEY="..."
//! stockcast TCS
//!
//! # Any OpenAI-compatible endpoint
//! stockcast --provider openai --api-base http://localhost:1234/v1 --model qwen2.5-7b-instruct
//! ```

mod progress;

use anyhow::Context;
use clap::Parser;
use progress::ProgressPrinter;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use stockcast_market::engine::normalize_ticker;
use stockcast_market::{
    AiStockGenerator, AnalysisSession, Dashboard, DashboardOptions, ProviderKind, StockConfig,
    StockError,
};
use stockcast_utils::logging::DEFAULT_FILTER;
use stockcast_utils::{LogFormat, init_tracing_with, load_dotenv};
use tracing::info;

const DEFAULT_TICKER: &str = "TCS";

#[derive(Parser, Debug)]
#[command(name = "stockcast", version)]
#[command(about = "AI-generated Indian stock analysis and next-close prediction", long_about = None)]
struct Args {
    /// Ticker to analyze; starts an interactive prompt when omitted
    ticker: Option<String>,

    /// LLM backend: gemini or openai
    #[arg(long)]
    provider: Option<String>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Provider base URL
    #[arg(long)]
    api_base: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Trading days of history to request
    #[arg(long)]
    history_days: Option<usize>,

    /// Accept generated numbers without checking them
    #[arg(long)]
    no_validate: bool,

    /// Print the final state as JSON instead of the dashboard
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Disable colours
    #[arg(long)]
    no_color: bool,

    #[arg(long, default_value_t = 72)]
    chart_width: usize,

    #[arg(long, default_value_t = 14)]
    chart_height: usize,
}

impl Args {
    /// Command-line values first, then the environment, then defaults
    fn config(&self) -> anyhow::Result<StockConfig> {
        let mut builder = StockConfig::builder();
        if let Some(provider) = &self.provider {
            builder = builder.provider(provider.parse::<ProviderKind>()?);
        }
        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        if let Some(api_base) = &self.api_base {
            builder = builder.api_base(api_base);
        }
        if let Some(secs) = self.timeout {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(days) = self.history_days {
            builder = builder.history_days(days);
        }
        if self.no_validate {
            builder = builder.validate_responses(false);
        }

        Ok(builder.with_env().build()?)
    }

    fn dashboard(&self, history_days: usize) -> Dashboard {
        Dashboard::new(DashboardOptions {
            color: !self.no_color && io::stdout().is_terminal(),
            chart_width: self.chart_width,
            chart_height: self.chart_height,
            history_days,
            ..DashboardOptions::default()
        })
    }
}

fn print_help() {
    println!("Enter an NSE/BSE ticker (e.g. TCS, RELIANCE, INFY).");
    println!("Press Enter to reuse the ticker shown in brackets.");
    println!("Commands: /help, /exit\n");
}

/// Run one submission, printing progress as it is published
///
/// Returns `false` when the submission was rejected or failed; the message
/// has already been printed.
async fn analyze(
    session: &AnalysisSession,
    dashboard: &Dashboard,
    input: &str,
    json: bool,
) -> anyhow::Result<bool> {
    let mut updates = session.subscribe();
    updates.mark_unchanged();
    let mut printer = (!json).then(|| ProgressPrinter::new(dashboard, io::stdout()));

    let submit = session.submit(input);
    tokio::pin!(submit);

    let outcome = loop {
        tokio::select! {
            outcome = &mut submit => break outcome,
            Ok(()) = updates.changed() => {
                let state = updates.borrow_and_update().clone();
                if let Some(printer) = printer.as_mut() {
                    printer.observe(&state)?;
                }
            }
        }
    };

    let state = session.snapshot();
    match printer.as_mut() {
        Some(printer) => printer.observe(&state)?,
        None => println!("{}", serde_json::to_string_pretty(&state)?),
    }

    match outcome {
        Ok(_) => Ok(true),
        Err(StockError::EmptyTicker | StockError::GenerationFailed(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

async fn repl(session: &AnalysisSession, dashboard: &Dashboard, json: bool) -> anyhow::Result<()> {
    print_help();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut last_ticker = DEFAULT_TICKER.to_string();

    loop {
        print!("Ticker [{last_ticker}]: ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let ticker = match input.trim() {
            "/exit" | "/quit" => break,
            "/help" => {
                print_help();
                continue;
            }
            "" => last_ticker.clone(),
            other => other.to_string(),
        };

        analyze(session, dashboard, &ticker, json).await?;
        println!();
        last_ticker = normalize_ticker(&ticker);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    load_dotenv();
    let args = Args::parse();

    let format = if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing_with(format, DEFAULT_FILTER);

    let config = Arc::new(args.config().context("Invalid configuration")?);
    info!(
        provider = %config.provider,
        model = %config.model,
        history_days = config.history_days,
        "Starting stockcast"
    );

    let generator =
        AiStockGenerator::from_config(config.clone()).context("Failed to create AI provider")?;
    let session = AnalysisSession::new(Arc::new(generator));
    let dashboard = args.dashboard(config.history_days);

    if !args.json {
        print!("{}", dashboard.header());
    }

    match &args.ticker {
        Some(ticker) => {
            let succeeded = analyze(&session, &dashboard, ticker, args.json).await?;
            Ok(if succeeded {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        None => {
            repl(&session, &dashboard, args.json).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
