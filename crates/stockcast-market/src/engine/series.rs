//! Chart series derived from an analysis

use crate::model::{StockAnalysis, StockDataPoint};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

/// Padding used when every value is identical
const FLAT_PADDING: f64 = 5.0;

/// One day of the actual-vs-predicted comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub date: NaiveDate,
    pub actual_close: f64,
    pub predicted_close: f64,
}

/// History oldest first, plus a next-day prediction point when available
///
/// The prediction point carries only the close; open, high, low and volume
/// are zero.
pub fn price_series(analysis: &StockAnalysis) -> Vec<StockDataPoint> {
    let mut series = analysis.historical_data.clone();
    series.sort_by(|a, b| a.date.cmp(&b.date));

    let next_day = series
        .last()
        .and_then(|last| last.date.checked_add_days(Days::new(1)));

    if let (Some(prediction), Some(date)) = (&analysis.prediction, next_day) {
        series.push(StockDataPoint {
            date,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: prediction.predicted_close,
            volume: 0,
            is_prediction: true,
        });
    }

    series
}

/// Actual closes paired with same-day historical predictions, oldest first
///
/// Days without a prediction are left out. For duplicate prediction dates
/// the last entry wins.
pub fn comparison_series(analysis: &StockAnalysis) -> Vec<ComparisonPoint> {
    let Some(predictions) = &analysis.historical_predictions else {
        return Vec::new();
    };

    let by_date: HashMap<NaiveDate, f64> = predictions
        .iter()
        .map(|p| (p.date, p.predicted_close))
        .collect();

    let mut series: Vec<ComparisonPoint> = analysis
        .historical_data
        .iter()
        .filter_map(|point| {
            by_date.get(&point.date).map(|&predicted_close| ComparisonPoint {
                date: point.date,
                actual_close: point.close,
                predicted_close,
            })
        })
        .collect();
    series.sort_by(|a, b| a.date.cmp(&b.date));
    series
}

/// Y-axis range with 10% padding on each side (fixed padding for flat data)
pub fn price_domain(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let span = max - min;
    let pad = if span > 0.0 { span * 0.1 } else { FLAT_PADDING };
    Some((min - pad, max + pad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HistoricalPredictionPoint;
    use crate::model::fixtures::{advanced, bar, basic, date};

    #[test]
    fn test_price_series_ascending_without_prediction() {
        let mut analysis = StockAnalysis::from_basic(basic("TCS"));
        analysis.sort_history_desc();

        let series = price_series(&analysis);
        assert_eq!(series.len(), 3);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        assert!(series.iter().all(|p| !p.is_prediction));
    }

    #[test]
    fn test_price_series_appends_prediction() {
        let analysis = StockAnalysis::from_basic(basic("TCS")).with_advanced(advanced());
        let series = price_series(&analysis);

        assert_eq!(series.len(), analysis.historical_data.len() + 1);
        let last = series.last().unwrap();
        assert!(last.is_prediction);
        assert_eq!(last.date, date(2024, 5, 4));
        assert_eq!(last.close, 3560.0);
        assert_eq!(last.volume, 0);
        assert_eq!(last.open, 0.0);
    }

    #[test]
    fn test_prediction_needs_history() {
        let mut analysis = StockAnalysis::from_basic(basic("TCS")).with_advanced(advanced());
        analysis.historical_data.clear();
        assert!(price_series(&analysis).is_empty());
    }

    #[test]
    fn test_comparison_series_matches_dates() {
        let mut adv = advanced();
        adv.historical_predictions.push(HistoricalPredictionPoint {
            date: date(2024, 4, 1),
            predicted_close: 1.0,
        });
        let analysis = StockAnalysis::from_basic(basic("TCS")).with_advanced(adv);

        let series = comparison_series(&analysis);
        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2024, 5, 2), date(2024, 5, 3)]);
        assert_eq!(series[1].actual_close, 3542.10);
        assert_eq!(series[1].predicted_close, 3538.0);
    }

    #[test]
    fn test_comparison_duplicate_dates_last_wins() {
        let mut adv = advanced();
        adv.historical_predictions.push(HistoricalPredictionPoint {
            date: date(2024, 5, 3),
            predicted_close: 3600.0,
        });
        let analysis = StockAnalysis::from_basic(basic("TCS")).with_advanced(adv);

        let series = comparison_series(&analysis);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].predicted_close, 3600.0);
    }

    #[test]
    fn test_comparison_empty_without_predictions() {
        let analysis = StockAnalysis::from_basic(basic("TCS"));
        assert!(comparison_series(&analysis).is_empty());
    }

    #[test]
    fn test_price_domain() {
        assert_eq!(price_domain([100.0, 200.0]), Some((90.0, 210.0)));
        assert_eq!(price_domain([50.0, 50.0]), Some((45.0, 55.0)));
        assert_eq!(price_domain([f64::NAN, 10.0]), Some((5.0, 15.0)));
        assert_eq!(price_domain(std::iter::empty()), None);

        let closes = [bar(date(2024, 1, 1), 10.0), bar(date(2024, 1, 2), 20.0)];
        assert_eq!(price_domain(closes.iter().map(|p| p.close)), Some((9.0, 21.0)));
    }
}
