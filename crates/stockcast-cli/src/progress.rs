//! Streaming output of a submission
//!
//! Prints each part of the dashboard once, as soon as the state that carries
//! it has been published. Consecutive states may be coalesced by the watch
//! channel, so every check looks at the whole state rather than the phase
//! that was just entered.

use std::io::{self, Write};
use stockcast_market::engine::Phase;
use stockcast_market::interface::dashboard::{FOOTER, LOADING_NOTICE};
use stockcast_market::{AnalysisState, Dashboard};

pub const ANALYZING_NOTICE: &str = "Generating advanced analysis...";

pub struct ProgressPrinter<'a, W: Write> {
    dashboard: &'a Dashboard,
    out: W,
    last_error: Option<String>,
    loading_shown: bool,
    basic_shown: bool,
    advanced_shown: bool,
    finished: bool,
}

impl<'a, W: Write> ProgressPrinter<'a, W> {
    pub fn new(dashboard: &'a Dashboard, out: W) -> Self {
        Self {
            dashboard,
            out,
            last_error: None,
            loading_shown: false,
            basic_shown: false,
            advanced_shown: false,
            finished: false,
        }
    }

    pub fn observe(&mut self, state: &AnalysisState) -> io::Result<()> {
        if state.is_loading() && !self.loading_shown {
            writeln!(self.out, "{LOADING_NOTICE}\n")?;
            self.loading_shown = true;
        }

        if let Some(analysis) = &state.analysis {
            if !self.basic_shown {
                write!(self.out, "{}", self.dashboard.render_basic(analysis))?;
                if state.is_analyzing() {
                    writeln!(self.out, "{ANALYZING_NOTICE}\n")?;
                }
                self.basic_shown = true;
            }
            if analysis.has_advanced() && !self.advanced_shown {
                write!(self.out, "{}", self.dashboard.render_advanced(analysis, false))?;
                self.advanced_shown = true;
            }
        }

        if state.error.is_some() && state.error != self.last_error {
            if let Some(error) = &state.error {
                write!(self.out, "{}", self.dashboard.error_banner(error))?;
            }
            self.last_error.clone_from(&state.error);
        }

        if matches!(state.phase, Phase::Done | Phase::Failed) && !self.finished {
            writeln!(self.out, "{FOOTER}")?;
            self.finished = true;
        }

        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
