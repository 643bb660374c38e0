//! Terminal dashboard
//!
//! Renders an [`AnalysisState`] as a stack of panels. Tables go through
//! `comfy-table`; colours are only emitted when enabled.

use super::chart::{render_comparison_chart, render_price_chart};
use super::format::{
    change_label, currency, direction_between, direction_marker, fixed2, group_indian, metric,
    number_or_na, percent, table_date, text_or_na,
};
use crate::config::DEFAULT_HISTORY_DAYS;
use crate::engine::{AnalysisState, comparison_series, price_series};
use crate::model::{Direction, StockAnalysis};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

pub const TITLE: &str = "AI Stock Predictor";
pub const LOADING_NOTICE: &str = "Fetching initial stock data...";
pub const FOOTER: &str = "AI Stock Predictor. For educational purposes only.";

/// Placeholder for a panel whose data is still being generated
pub const SKELETON: &str = "░░░░░░░░░░░░░░░░░░░░ Analyzing...";

const INTRO: &str = "Enter an Indian stock ticker (e.g., TCS, RELIANCE, INFY) to generate a full \
                     analysis and predict the next closing price.";

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    /// Emit ANSI colours and attributes
    pub color: bool,
    pub chart_width: usize,
    pub chart_height: usize,
    /// Width that text panels wrap to
    pub panel_width: u16,
    /// Shown in the dataset title
    pub history_days: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            color: false,
            chart_width: 60,
            chart_height: 12,
            panel_width: 100,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    options: DashboardOptions,
}

fn direction_color(direction: Direction) -> Color {
    match direction {
        Direction::Up => Color::Green,
        Direction::Down => Color::Red,
        Direction::Neutral => Color::Grey,
    }
}

fn panel(title: &str, table: &Table) -> String {
    format!("{title}\n{table}\n\n")
}

impl Dashboard {
    pub fn new(options: DashboardOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    /// Full page for the given state
    pub fn render(&self, state: &AnalysisState) -> String {
        let mut out = self.header();

        if let Some(error) = &state.error {
            out.push_str(&self.error_banner(error));
        }
        if state.is_loading() {
            out.push_str(&self.notice(LOADING_NOTICE, Color::Cyan));
        }
        if state.is_ready() {
            out.push_str(&self.notice(
                "Ready to Analyze\nEnter a stock ticker above to begin.",
                Color::Grey,
            ));
        }
        if let Some(analysis) = &state.analysis {
            out.push_str(&self.render_basic(analysis));
            out.push_str(&self.render_advanced(analysis, state.is_analyzing()));
        }

        out.push_str(FOOTER);
        out.push('\n');
        out
    }

    /// Panels available after the first request
    pub fn render_basic(&self, analysis: &StockAnalysis) -> String {
        let mut out = self.stock_info(analysis);
        out.push_str(&self.price_chart(analysis));
        out.push_str(&self.dataset(analysis));
        out
    }

    /// Panels filled by the second request
    ///
    /// While `analyzing`, missing panels render as skeletons; otherwise they
    /// are left out.
    pub fn render_advanced(&self, analysis: &StockAnalysis, analyzing: bool) -> String {
        let mut out = String::new();

        let comparison = comparison_series(analysis);
        if analysis.historical_predictions.is_some() && !comparison.is_empty() {
            let chart = render_comparison_chart(
                &comparison,
                self.options.chart_width,
                self.options.chart_height,
            );
            out.push_str(&self.text_panel("Model Performance: Actual vs. Predicted", &chart));
        } else if analyzing && analysis.historical_predictions.is_none() {
            out.push_str(&self.skeleton());
        }

        match &analysis.key_metrics {
            Some(_) => out.push_str(&self.key_metrics(analysis)),
            None if analyzing => out.push_str(&self.skeleton()),
            None => {}
        }
        match &analysis.prediction {
            Some(_) => out.push_str(&self.prediction_card(analysis)),
            None if analyzing => out.push_str(&self.skeleton()),
            None => {}
        }
        match &analysis.related_stocks {
            Some(_) => out.push_str(&self.related_stocks(analysis)),
            None if analyzing => out.push_str(&self.skeleton()),
            None => {}
        }
        match &analysis.about {
            Some(about) => out.push_str(&self.wrapped_panel(
                &format!("About {}", analysis.company_info.name),
                about,
            )),
            None if analyzing => out.push_str(&self.skeleton()),
            None => {}
        }

        out
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .apply_modifier(UTF8_ROUND_CORNERS);
        if self.options.color {
            table.enforce_styling();
        } else {
            table.force_no_tty();
        }
        table
    }

    fn wrapping_table(&self) -> Table {
        let mut table = self.table();
        table
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_width(self.options.panel_width);
        table
    }

    /// Title panel with usage hint
    pub fn header(&self) -> String {
        let mut table = self.wrapping_table();
        table.add_row(vec![
            Cell::new(TITLE)
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![INTRO]);
        format!("{table}\n\n")
    }

    pub fn error_banner(&self, message: &str) -> String {
        self.notice(message, Color::Red)
    }

    fn notice(&self, message: &str, color: Color) -> String {
        let mut table = self.table();
        table.add_row(vec![Cell::new(message).fg(color)]);
        format!("{table}\n\n")
    }

    fn skeleton(&self) -> String {
        let mut table = self.table();
        table.add_row(vec![Cell::new(SKELETON).fg(Color::DarkGrey)]);
        format!("{table}\n\n")
    }

    fn text_panel(&self, title: &str, body: &str) -> String {
        let mut table = self.table();
        table.add_row(vec![body.trim_end()]);
        panel(title, &table)
    }

    fn wrapped_panel(&self, title: &str, body: &str) -> String {
        let mut table = self.wrapping_table();
        table.add_row(vec![body]);
        panel(title, &table)
    }

    fn stock_info(&self, analysis: &StockAnalysis) -> String {
        let company = &analysis.company_info;
        let price = &analysis.current_price_info;

        let mut table = self.table();
        table.set_header(vec![Cell::new(&company.name).add_attribute(Attribute::Bold)]);
        table.add_row(vec![format!("{}: {}", company.exchange, company.ticker)]);
        table.add_row(vec![Cell::new(currency(price.price)).add_attribute(Attribute::Bold)]);
        table.add_row(vec![
            Cell::new(change_label(price.direction, price.change, price.change_percent))
                .fg(direction_color(price.direction)),
        ]);
        format!("{table}\n\n")
    }

    fn price_chart(&self, analysis: &StockAnalysis) -> String {
        let title = "Price History & Prediction";
        let series = price_series(analysis);
        if series.is_empty() {
            let mut table = self.table();
            table.add_row(vec![Cell::new(SKELETON).fg(Color::DarkGrey)]);
            return panel(title, &table);
        }
        let chart = render_price_chart(&series, self.options.chart_width, self.options.chart_height);
        self.text_panel(title, &chart)
    }

    fn dataset(&self, analysis: &StockAnalysis) -> String {
        let mut table = self.table();
        table.set_header(vec![
            "Date",
            "Open (₹)",
            "High (₹)",
            "Low (₹)",
            "Close (₹)",
            "Volume",
        ]);
        for row in &analysis.historical_data {
            table.add_row(vec![
                Cell::new(table_date(row.date)),
                Cell::new(fixed2(row.open)),
                Cell::new(fixed2(row.high)),
                Cell::new(fixed2(row.low)),
                Cell::new(fixed2(row.close)).add_attribute(Attribute::Bold),
                Cell::new(group_indian(row.volume)),
            ]);
        }
        for index in 1..6 {
            if let Some(column) = table.column_mut(index) {
                column.set_cell_alignment(CellAlignment::Right);
            }
        }

        panel(
            &format!("Historical Dataset (Last {} Days)", self.options.history_days),
            &table,
        )
    }

    fn key_metrics(&self, analysis: &StockAnalysis) -> String {
        let Some(metrics) = &analysis.key_metrics else {
            return String::new();
        };

        let market_cap = Some(metrics.market_cap.as_str()).filter(|s| !s.is_empty());
        let mut table = self.table();
        table
            .add_row(vec!["Market Cap".to_string(), text_or_na(market_cap)])
            .add_row(vec!["P/E Ratio".to_string(), number_or_na(metrics.pe_ratio)])
            .add_row(vec![
                "Div Yield".to_string(),
                text_or_na(metrics.div_yield.as_deref()),
            ])
            .add_row(vec!["Previous Close".to_string(), currency(metrics.previous_close)])
            .add_row(vec!["52-wk High".to_string(), currency(metrics.week52_high)])
            .add_row(vec!["52-wk Low".to_string(), currency(metrics.week52_low)]);
        panel("Key Metrics", &table)
    }

    fn prediction_card(&self, analysis: &StockAnalysis) -> String {
        let Some(prediction) = &analysis.prediction else {
            return String::new();
        };

        let last_close = analysis.current_price_info.price;
        let change = prediction.predicted_close - last_close;
        let change_percent = if last_close > 0.0 {
            change / last_close * 100.0
        } else {
            0.0
        };
        let direction = direction_between(last_close, prediction.predicted_close);

        let mut table = self.wrapping_table();
        table
            .add_row(vec![
                Cell::new("Predicted Next Close"),
                Cell::new(currency(prediction.predicted_close)).add_attribute(Attribute::Bold),
            ])
            .add_row(vec![
                Cell::new("Change"),
                Cell::new(change_label(direction, change, change_percent))
                    .fg(direction_color(direction)),
            ])
            .add_row(vec![Cell::new("Model Analysis"), Cell::new(&prediction.analysis)])
            .add_row(vec![
                Cell::new("Simulated Model Performance").add_attribute(Attribute::Bold),
                Cell::new(""),
            ])
            .add_row(vec![Cell::new("RMSE"), Cell::new(metric(prediction.rmse))])
            .add_row(vec![Cell::new("MAE"), Cell::new(metric(prediction.mae))])
            .add_row(vec![Cell::new("R² Score"), Cell::new(metric(prediction.r2_score))]);

        panel(
            &format!("AI Prediction for {}", analysis.company_info.ticker),
            &table,
        )
    }

    fn related_stocks(&self, analysis: &StockAnalysis) -> String {
        let Some(stocks) = &analysis.related_stocks else {
            return String::new();
        };

        let mut table = self.table();
        table.set_header(vec!["Ticker", "Name", "Price", "Change"]);
        for stock in stocks {
            let marker = direction_marker(stock.direction);
            let change = if marker.is_empty() {
                percent(stock.change_percent)
            } else {
                format!("{marker} {}", percent(stock.change_percent))
            };
            table.add_row(vec![
                Cell::new(&stock.ticker).add_attribute(Attribute::Bold),
                Cell::new(&stock.name),
                Cell::new(currency(stock.price)),
                Cell::new(change).fg(direction_color(stock.direction)),
            ]);
        }
        panel("Explore More", &table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FETCH_FAILED_MESSAGE, Phase};
    use crate::model::fixtures::{advanced, basic};

    fn state(phase: Phase, analysis: Option<StockAnalysis>, error: Option<&str>) -> AnalysisState {
        AnalysisState {
            generation: 1,
            ticker: Some("TCS".to_string()),
            phase,
            analysis,
            error: error.map(str::to_string),
        }
    }

    fn basic_analysis() -> StockAnalysis {
        let mut analysis = StockAnalysis::from_basic(basic("TCS"));
        analysis.sort_history_desc();
        analysis
    }

    #[test]
    fn test_idle_shows_ready_notice() {
        let page = Dashboard::default().render(&AnalysisState::default());
        assert!(page.contains(TITLE));
        assert!(page.contains("Ready to Analyze"));
        assert!(page.ends_with(&format!("{FOOTER}\n")));
        assert!(!page.contains(LOADING_NOTICE));
    }

    #[test]
    fn test_loading_notice() {
        let page = Dashboard::default().render(&state(Phase::Loading, None, None));
        assert!(page.contains(LOADING_NOTICE));
        assert!(!page.contains("Ready to Analyze"));
    }

    #[test]
    fn test_validation_message_replaces_ready_notice() {
        let page = Dashboard::default().render(&AnalysisState {
            error: Some("Please enter a stock ticker.".to_string()),
            ..AnalysisState::default()
        });
        assert!(page.contains("Please enter a stock ticker."));
        assert!(!page.contains("Ready to Analyze"));
    }

    #[test]
    fn test_analyzing_shows_basic_panels_and_skeletons() {
        let page =
            Dashboard::default().render(&state(Phase::Analyzing, Some(basic_analysis()), None));

        assert!(page.contains("Tata Consultancy Services"));
        assert!(page.contains("NSE: TCS"));
        assert!(page.contains("₹3542.10"));
        assert!(page.contains("▲ 12.50 (0.35%)"));
        assert!(page.contains("Price History & Prediction"));
        assert!(page.contains("Historical Dataset (Last 90 Days)"));
        assert!(page.contains("3542.10"));
        assert!(page.contains("12,34,567"));
        assert!(page.contains("2024-05-03"));

        assert_eq!(page.matches(SKELETON).count(), 5);
        assert!(!page.contains("Key Metrics"));
    }

    #[test]
    fn test_dataset_rows_newest_first() {
        let page = Dashboard::default().render_basic(&basic_analysis());
        let newest = page.find("2024-05-03").unwrap();
        let oldest = page.find("2024-05-01").unwrap();
        assert!(newest < oldest);
    }

    #[test]
    fn test_done_shows_advanced_panels() {
        let analysis = basic_analysis().with_advanced(advanced());
        let page = Dashboard::default().render(&state(Phase::Done, Some(analysis), None));

        assert!(page.contains("Model Performance: Actual vs. Predicted"));
        assert!(page.contains("Key Metrics"));
        assert!(page.contains("12.81LCr"));
        assert!(page.contains("29.4"));
        assert!(page.contains("N/A"));
        assert!(page.contains("₹4255.00"));
        assert!(page.contains("AI Prediction for TCS"));
        assert!(page.contains("₹3560.00"));
        assert!(page.contains("▲ 17.90 (0.51%)"));
        assert!(page.contains("12.3456"));
        assert!(page.contains("0.9345"));
        assert!(page.contains("R² Score"));
        assert!(page.contains("Explore More"));
        assert!(page.contains("INFY"));
        assert!(page.contains("▼ -0.80%"));
        assert!(page.contains("About Tata Consultancy Services"));
        assert!(page.contains("IT services and consulting."));
        assert!(!page.contains(SKELETON));
    }

    #[test]
    fn test_advanced_failure_keeps_basic_panels() {
        let page = Dashboard::default().render(&state(
            Phase::Failed,
            Some(basic_analysis()),
            Some(FETCH_FAILED_MESSAGE),
        ));

        assert!(page.contains(FETCH_FAILED_MESSAGE));
        assert!(page.contains("NSE: TCS"));
        assert!(!page.contains(SKELETON));
        assert!(!page.contains("Key Metrics"));
        assert!(!page.contains("Explore More"));
    }

    #[test]
    fn test_prediction_change_without_last_close() {
        let mut analysis = basic_analysis().with_advanced(advanced());
        analysis.current_price_info.price = 0.0;
        let page = Dashboard::default().render_advanced(&analysis, false);
        assert!(page.contains("▲ 3560.00 (0.00%)"));
    }

    #[test]
    fn test_plain_output_has_no_escape_codes() {
        let analysis = basic_analysis().with_advanced(advanced());
        let page = Dashboard::default().render(&state(Phase::Done, Some(analysis), None));
        assert!(!page.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_output() {
        let dashboard = Dashboard::new(DashboardOptions {
            color: true,
            ..DashboardOptions::default()
        });
        let page = dashboard.render(&state(Phase::Analyzing, Some(basic_analysis()), None));
        assert!(page.contains('\u{1b}'));
    }

    #[test]
    fn test_history_days_in_title() {
        let dashboard = Dashboard::new(DashboardOptions {
            history_days: 30,
            ..DashboardOptions::default()
        });
        let page = dashboard.render_basic(&basic_analysis());
        assert!(page.contains("Historical Dataset (Last 30 Days)"));
    }
}
