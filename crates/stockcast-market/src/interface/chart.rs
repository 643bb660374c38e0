//! Character-cell charts
//!
//! Fixed-size grids with deterministic output:
//! - close price: `•` line over a `░` area
//! - prediction: `·` dashed segment ending in `◆`
//! - comparison: `•` actual closes, `+` predicted closes
//!
//! Points are spaced evenly by index, like a category axis. The y-axis shows
//! whole-rupee labels and the x-axis the first and last short dates.

use super::format::{axis_currency, chart_date, currency, group_western};
use crate::engine::{ComparisonPoint, price_domain};
use crate::model::StockDataPoint;

const LINE: char = '•';
const FILL: char = '░';
const DASH: char = '·';
const MARKER: char = '◆';
const PREDICTED: char = '+';

/// Smallest grid drawn
pub const MIN_WIDTH: usize = 10;
pub const MIN_HEIGHT: usize = 5;

struct Canvas {
    grid: Vec<Vec<char>>,
    y_min: f64,
    y_max: f64,
}

impl Canvas {
    fn new(width: usize, height: usize, (y_min, y_max): (f64, f64)) -> Self {
        Self {
            grid: vec![vec![' '; width.max(MIN_WIDTH)]; height.max(MIN_HEIGHT)],
            y_min,
            y_max,
        }
    }

    fn width(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    fn height(&self) -> usize {
        self.grid.len()
    }

    fn col(&self, index: usize, count: usize) -> usize {
        if count < 2 {
            return 0;
        }
        let u = index as f64 / (count - 1) as f64;
        (u * (self.width() - 1) as f64).round() as usize
    }

    fn row(&self, value: f64) -> usize {
        let h = self.height() as f64 - 1.0;
        let u = ((value - self.y_min) / (self.y_max - self.y_min)).clamp(0.0, 1.0);
        // top row is y_max
        (h - u * h).round() as usize
    }

    fn value_at_row(&self, row: usize) -> f64 {
        let h = self.height() as f64 - 1.0;
        self.y_max - (row as f64 / h) * (self.y_max - self.y_min)
    }

    fn set(&mut self, (x, y): (usize, usize), ch: char) {
        if let Some(cell) = self.grid.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = ch;
        }
    }

    fn set_if_blank(&mut self, (x, y): (usize, usize), ch: char) {
        if let Some(cell) = self.grid.get_mut(y).and_then(|row| row.get_mut(x))
            && *cell == ' '
        {
            *cell = ch;
        }
    }

    /// Integer line drawing (Bresenham); only blank cells are written
    fn line(&mut self, from: (usize, usize), to: (usize, usize), ch: char, dashed: bool) {
        let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
        let (x1, y1) = (to.0 as isize, to.1 as isize);

        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut step = 0_usize;

        loop {
            if (!dashed || step % 2 == 0) && x0 >= 0 && y0 >= 0 {
                self.set_if_blank((x0 as usize, y0 as usize), ch);
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
            step += 1;
        }
    }

    fn polyline(&mut self, points: &[(usize, usize)], ch: char) {
        if let [single] = points {
            self.set_if_blank(*single, ch);
        }
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], ch, false);
        }
    }

    /// Shade every blank cell below the topmost `line` cell of each column
    fn fill_below(&mut self, line: char, fill: char) {
        for x in 0..self.width() {
            let Some(top) = (0..self.height()).find(|&y| self.grid[y][x] == line) else {
                continue;
            };
            for y in top + 1..self.height() {
                if self.grid[y][x] == ' ' {
                    self.grid[y][x] = fill;
                }
            }
        }
    }

    fn render(&self, first_label: &str, last_label: &str) -> String {
        let height = self.height();
        let width = self.width();
        let mid_row = (height - 1) / 2;

        let top = axis_currency(self.y_max);
        let mid = axis_currency(self.value_at_row(mid_row));
        let bottom = axis_currency(self.y_min);
        let label_w = [&top, &mid, &bottom]
            .iter()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for (y, row) in self.grid.iter().enumerate() {
            let label = if y == 0 {
                top.as_str()
            } else if y == mid_row {
                mid.as_str()
            } else if y == height - 1 {
                bottom.as_str()
            } else {
                ""
            };
            let cells: String = row.iter().collect();
            out.push_str(&format!("{label:>label_w$} │{cells}\n"));
        }
        out.push_str(&format!("{:label_w$} └{}\n", "", "─".repeat(width)));

        let gap = width.saturating_sub(first_label.chars().count() + last_label.chars().count());
        if first_label == last_label || gap == 0 {
            out.push_str(&format!("{:label_w$}  {first_label}\n", ""));
        } else {
            out.push_str(&format!(
                "{:label_w$}  {first_label}{}{last_label}\n",
                "",
                " ".repeat(gap)
            ));
        }
        out
    }
}

/// Area chart of closes with the prediction segment
///
/// `series` is expected oldest first, as produced by
/// [`crate::engine::price_series`].
pub fn render_price_chart(series: &[StockDataPoint], width: usize, height: usize) -> String {
    let (Some(domain), Some(first), Some(last)) = (
        price_domain(series.iter().map(|p| p.close)),
        series.first(),
        series.last(),
    ) else {
        return "No price data\n".to_string();
    };

    let mut canvas = Canvas::new(width, height, domain);
    let count = series.len();
    let points: Vec<(usize, usize)> = series
        .iter()
        .enumerate()
        .map(|(i, p)| (canvas.col(i, count), canvas.row(p.close)))
        .collect();

    let split = series.iter().position(|p| p.is_prediction).unwrap_or(count);
    canvas.polyline(&points[..split], LINE);
    canvas.fill_below(LINE, FILL);
    if split > 0 && split < count {
        canvas.line(points[split - 1], points[split], DASH, true);
        canvas.set(points[split], MARKER);
    }

    let mut out = format!("{LINE} Close Price");
    if split < count {
        out.push_str(&format!("   {MARKER} Prediction"));
    }
    out.push('\n');
    out.push_str(&canvas.render(&chart_date(first.date), &chart_date(last.date)));

    if let Some(close) = series[..split].last() {
        out.push_str(&format!(
            "Close Price {}: {} | Volume: {}\n",
            chart_date(close.date),
            currency(close.close),
            group_western(close.volume)
        ));
    }
    if let Some(predicted) = series.get(split) {
        out.push_str(&format!(
            "Predicted Close {}: {}\n",
            chart_date(predicted.date),
            currency(predicted.close)
        ));
    }
    out
}

/// Actual vs predicted closes
pub fn render_comparison_chart(series: &[ComparisonPoint], width: usize, height: usize) -> String {
    let values = series
        .iter()
        .flat_map(|p| [p.actual_close, p.predicted_close]);
    let (Some(domain), Some(first), Some(last)) =
        (price_domain(values), series.first(), series.last())
    else {
        return "No prediction data\n".to_string();
    };

    let mut canvas = Canvas::new(width, height, domain);
    let count = series.len();
    let actual: Vec<(usize, usize)> = series
        .iter()
        .enumerate()
        .map(|(i, p)| (canvas.col(i, count), canvas.row(p.actual_close)))
        .collect();
    let predicted: Vec<(usize, usize)> = series
        .iter()
        .enumerate()
        .map(|(i, p)| (canvas.col(i, count), canvas.row(p.predicted_close)))
        .collect();

    canvas.polyline(&actual, LINE);
    canvas.polyline(&predicted, PREDICTED);

    let mut out = format!("{LINE} Actual Close   {PREDICTED} Predicted Close\n");
    out.push_str(&canvas.render(&chart_date(first.date), &chart_date(last.date)));
    out.push_str(&format!(
        "{}: Actual Close {} | Predicted Close {}\n",
        chart_date(last.date),
        currency(last.actual_close),
        currency(last.predicted_close)
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{comparison_series, price_series};
    use crate::model::StockAnalysis;
    use crate::model::fixtures::{advanced, basic};

    fn analysis() -> StockAnalysis {
        StockAnalysis::from_basic(basic("TCS")).with_advanced(advanced())
    }

    #[test]
    fn test_canvas_mapping() {
        let canvas = Canvas::new(11, 5, (0.0, 100.0));
        assert_eq!(canvas.col(0, 3), 0);
        assert_eq!(canvas.col(1, 3), 5);
        assert_eq!(canvas.col(2, 3), 10);
        assert_eq!(canvas.col(0, 1), 0);
        assert_eq!(canvas.row(100.0), 0);
        assert_eq!(canvas.row(0.0), 4);
        assert_eq!(canvas.row(50.0), 2);
        assert_eq!(canvas.row(500.0), 0);
    }

    #[test]
    fn test_dashed_line_skips_cells() {
        let mut canvas = Canvas::new(10, 5, (0.0, 1.0));
        canvas.line((0, 0), (9, 0), DASH, true);
        let row: String = canvas.grid[0].iter().collect();
        assert_eq!(row, "· · · · · ");
    }

    #[test]
    fn test_price_chart_layout() {
        let series = price_series(&analysis());
        let chart = render_price_chart(&series, 20, 6);
        let lines: Vec<&str> = chart.lines().collect();

        // legend + grid + axis + dates + two captions
        assert_eq!(lines.len(), 1 + 6 + 1 + 1 + 2);
        assert_eq!(lines[0], "• Close Price   ◆ Prediction");
        assert!(lines[1].starts_with("₹3566 │"));
        assert!(lines[6].starts_with("₹3494 │"));
        assert!(lines[8].contains("May 1"));
        assert!(lines[8].trim_end().ends_with("May 4"));
        assert_eq!(lines[9], "Close Price May 3: ₹3542.10 | Volume: 1,234,567");
        assert_eq!(lines[10], "Predicted Close May 4: ₹3560.00");

        assert!(chart.contains(MARKER));
        assert!(chart.contains(DASH));
        assert!(chart.contains(FILL));
    }

    #[test]
    fn test_price_chart_without_prediction() {
        let mut analysis = StockAnalysis::from_basic(basic("TCS"));
        analysis.sort_history_desc();
        let chart = render_price_chart(&price_series(&analysis), 20, 6);
        assert!(chart.starts_with("• Close Price\n"));
        assert!(!chart.contains(MARKER));
        assert!(!chart.contains("Predicted Close"));
    }

    #[test]
    fn test_chart_is_deterministic() {
        let series = price_series(&analysis());
        assert_eq!(
            render_price_chart(&series, 40, 10),
            render_price_chart(&series, 40, 10)
        );
    }

    #[test]
    fn test_comparison_chart() {
        let series = comparison_series(&analysis());
        let chart = render_comparison_chart(&series, 20, 6);
        assert!(chart.starts_with("• Actual Close   + Predicted Close\n"));
        assert!(chart.contains(PREDICTED));
        assert!(chart.contains("May 2"));
        assert!(chart.ends_with("May 3: Actual Close ₹3542.10 | Predicted Close ₹3538.00\n"));
    }

    #[test]
    fn test_empty_series() {
        assert_eq!(render_price_chart(&[], 20, 6), "No price data\n");
        assert_eq!(render_comparison_chart(&[], 20, 6), "No prediction data\n");
    }

    #[test]
    fn test_minimum_size() {
        let series = price_series(&analysis());
        let chart = render_price_chart(&series, 1, 1);
        let grid_rows = chart.lines().filter(|l| l.contains('│')).count();
        assert_eq!(grid_rows, MIN_HEIGHT);
    }
}
