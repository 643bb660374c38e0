//! Two-phase analysis orchestration
//!
//! A submission fetches basic data first, publishes it, then fetches the
//! advanced analysis and merges it in. Every transition replaces the
//! [`AnalysisState`] held in a `watch` channel so renderers can follow along.
//!
//! Each submission gets a generation number. A flow whose generation is no
//! longer current never writes state and never issues its advanced request.

use super::state::{AnalysisState, FETCH_FAILED_MESSAGE, Phase};
use crate::api::StockDataSource;
use crate::error::{Result, StockError};
use crate::model::StockAnalysis;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// How a submission ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Both phases completed and were published
    Completed,
    /// A newer submission took over; nothing further was published
    Superseded,
}

/// Trim and upper-case a ticker
pub fn normalize_ticker(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Drives submissions and publishes their progress
pub struct AnalysisSession {
    source: Arc<dyn StockDataSource>,
    state: watch::Sender<AnalysisState>,
    generation: AtomicU64,
}

impl AnalysisSession {
    pub fn new(source: Arc<dyn StockDataSource>) -> Self {
        let (state, _) = watch::channel(AnalysisState::default());
        Self {
            source,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Receiver notified after every state transition
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    /// Analyze a ticker
    ///
    /// Returns `Err(StockError::EmptyTicker)` without any request for blank
    /// input, and the source's error after publishing the failure banner.
    pub async fn submit(&self, input: &str) -> Result<SubmitOutcome> {
        let ticker = normalize_ticker(input);
        if ticker.is_empty() {
            self.state.send_modify(|state| {
                state.error = Some(StockError::EmptyTicker.to_string());
            });
            return Err(StockError::EmptyTicker);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let request_id = Uuid::new_v4();
        let span = info_span!("analysis", %request_id, %ticker, generation);

        self.run(generation, ticker).instrument(span).await
    }

    async fn run(&self, generation: u64, ticker: String) -> Result<SubmitOutcome> {
        self.state.send_replace(AnalysisState {
            generation,
            ticker: Some(ticker.clone()),
            phase: Phase::Loading,
            analysis: None,
            error: None,
        });
        info!("Fetching basic stock data");

        let basic = match self.source.fetch_basic(&ticker).await {
            Ok(basic) => basic,
            Err(err) => return self.fail(generation, err),
        };

        let mut analysis = StockAnalysis::from_basic(basic);
        analysis.sort_history_desc();
        let published = self.publish(generation, |state| {
            state.analysis = Some(analysis);
            state.phase = Phase::Analyzing;
        });
        if !published {
            info!("Superseded before advanced analysis");
            return Ok(SubmitOutcome::Superseded);
        }
        info!("Basic data ready, fetching advanced analysis");

        let advanced = match self.source.fetch_advanced(&ticker).await {
            Ok(advanced) => advanced,
            Err(err) => return self.fail(generation, err),
        };

        let published = self.publish(generation, |state| {
            state.analysis = state.analysis.take().map(|a| a.with_advanced(advanced));
            state.phase = Phase::Done;
        });
        if !published {
            info!("Superseded, dropping advanced analysis");
            return Ok(SubmitOutcome::Superseded);
        }

        info!("Analysis complete");
        Ok(SubmitOutcome::Completed)
    }

    /// Apply `update` only while `generation` is current
    fn publish(&self, generation: u64, update: impl FnOnce(&mut AnalysisState)) -> bool {
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            update(state);
            true
        })
    }

    fn fail(&self, generation: u64, err: StockError) -> Result<SubmitOutcome> {
        warn!(error = %err, "Error fetching stock analysis");
        let published = self.publish(generation, |state| {
            state.phase = Phase::Failed;
            state.error = Some(FETCH_FAILED_MESSAGE.to_string());
        });
        if published {
            Err(err)
        } else {
            Ok(SubmitOutcome::Superseded)
        }
    }
}
