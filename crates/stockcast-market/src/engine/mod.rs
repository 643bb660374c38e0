//! Analysis engine
//!
//! Orchestrates the two generation requests and derives chart data from
//! the result.

pub mod series;
pub mod session;
pub mod state;

pub use series::{ComparisonPoint, comparison_series, price_domain, price_series};
pub use session::{AnalysisSession, SubmitOutcome, normalize_ticker};
pub use state::{AnalysisState, FETCH_FAILED_MESSAGE, Phase};
