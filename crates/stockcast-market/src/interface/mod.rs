//! Terminal presentation
//!
//! Pure formatting helpers, character-cell charts and the panel layout that
//! turns an analysis state into text.

pub mod chart;
pub mod dashboard;
pub mod format;

pub use chart::{render_comparison_chart, render_price_chart};
pub use dashboard::{Dashboard, DashboardOptions};
