//! Observable analysis state

use crate::model::StockAnalysis;
use serde::Serialize;

/// Banner shown when either request fails
pub const FETCH_FAILED_MESSAGE: &str =
    "Failed to fetch stock analysis. The AI might be busy. Please try again.";

/// Progress of the current submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Waiting for the basic request
    Loading,
    /// Basic data shown, waiting for the advanced request
    Analyzing,
    /// Both requests succeeded
    Done,
    /// A request failed; see `error`
    Failed,
}

/// Snapshot published after every transition
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisState {
    /// Submission counter value that produced this state
    pub generation: u64,
    /// Normalised ticker of the current submission
    pub ticker: Option<String>,
    pub phase: Phase,
    pub analysis: Option<StockAnalysis>,
    /// Validation message or failure banner
    pub error: Option<String>,
}

impl AnalysisState {
    /// Waiting for the first request
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Waiting for the second request
    pub fn is_analyzing(&self) -> bool {
        self.phase == Phase::Analyzing
    }

    /// Either request in flight
    pub fn is_busy(&self) -> bool {
        self.is_loading() || self.is_analyzing()
    }

    /// Nothing to show yet and nothing wrong
    pub fn is_ready(&self) -> bool {
        self.analysis.is_none() && !self.is_loading() && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_follow_phase() {
        let mut state = AnalysisState::default();
        assert!(state.is_ready());
        assert!(!state.is_busy());

        state.phase = Phase::Loading;
        assert!(state.is_loading());
        assert!(!state.is_ready());

        state.phase = Phase::Analyzing;
        assert!(state.is_analyzing());
        assert!(state.is_busy());

        state.phase = Phase::Failed;
        state.error = Some(FETCH_FAILED_MESSAGE.to_string());
        assert!(!state.is_busy());
        assert!(!state.is_ready());
    }
}
