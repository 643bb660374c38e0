//! Stock data records exchanged with the model and rendered by the dashboard
//!
//! Field names match the JSON documents the model is asked to produce,
//! including the digit-leading `52_wk_high` / `52_wk_low` keys.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Price movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    #[default]
    Neutral,
}

impl Direction {
    /// All wire values, in schema order
    pub const VALUES: [&'static str; 3] = ["up", "down", "neutral"];
}

/// Company identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub ticker: String,
    pub exchange: String,
}

/// Latest quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPriceInfo {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub direction: Direction,
}

/// One daily OHLCV bar
///
/// `is_prediction` marks the synthetic next-day point appended for charting;
/// it never appears in model responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDataPoint {
    #[serde(with = "trading_date")]
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_prediction: bool,
}

/// Fundamental figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    /// Free text such as "11.07LCr"
    pub market_cap: String,
    pub pe_ratio: Option<f64>,
    pub div_yield: Option<String>,
    #[serde(rename = "52_wk_high")]
    pub week52_high: f64,
    #[serde(rename = "52_wk_low")]
    pub week52_low: f64,
    pub previous_close: f64,
}

/// Peer company quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedStock {
    pub name: String,
    pub ticker: String,
    pub price: f64,
    pub change_percent: f64,
    pub direction: Direction,
}

/// Next-day forecast with simulated accuracy figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_close: f64,
    /// Free-text rationale
    pub analysis: String,
    pub rmse: f64,
    pub mae: f64,
    pub r2_score: f64,
}

/// Past-date forecast used by the accuracy chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPredictionPoint {
    #[serde(with = "trading_date")]
    pub date: NaiveDate,
    pub predicted_close: f64,
}

/// Result of the first (fast) request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicStockData {
    pub company_info: CompanyInfo,
    pub current_price_info: CurrentPriceInfo,
    pub historical_data: Vec<StockDataPoint>,
}

/// Result of the second (slow) request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedStockAnalysis {
    pub key_metrics: KeyMetrics,
    pub about: String,
    pub related_stocks: Vec<RelatedStock>,
    pub prediction: PredictionResponse,
    pub historical_predictions: Vec<HistoricalPredictionPoint>,
}

/// Everything known about the current ticker
///
/// Basic fields are always present. Advanced fields stay `None` until the
/// second request succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub company_info: CompanyInfo,
    pub current_price_info: CurrentPriceInfo,
    pub historical_data: Vec<StockDataPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_metrics: Option<KeyMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_stocks: Option<Vec<RelatedStock>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_predictions: Option<Vec<HistoricalPredictionPoint>>,
}

impl StockAnalysis {
    /// Analysis holding only the basic fields
    pub fn from_basic(basic: BasicStockData) -> Self {
        Self {
            company_info: basic.company_info,
            current_price_info: basic.current_price_info,
            historical_data: basic.historical_data,
            key_metrics: None,
            about: None,
            related_stocks: None,
            prediction: None,
            historical_predictions: None,
        }
    }

    /// Merge the advanced fields in, leaving the basic fields untouched
    pub fn with_advanced(mut self, advanced: AdvancedStockAnalysis) -> Self {
        self.key_metrics = Some(advanced.key_metrics);
        self.about = Some(advanced.about);
        self.related_stocks = Some(advanced.related_stocks);
        self.prediction = Some(advanced.prediction);
        self.historical_predictions = Some(advanced.historical_predictions);
        self
    }

    /// Whether the advanced fields have arrived
    pub fn has_advanced(&self) -> bool {
        self.prediction.is_some()
    }

    /// Sort history newest first
    pub fn sort_history_desc(&mut self) {
        self.historical_data.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

/// Serde adapter for `YYYY-MM-DD` dates
///
/// Accepts a full timestamp as well and keeps its calendar day.
pub mod trading_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date '{raw}'")))
    }

    /// Parse `YYYY-MM-DD`, ignoring any time suffix
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, FORMAT).ok()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn bar(day: NaiveDate, close: f64) -> StockDataPoint {
        StockDataPoint {
            date: day,
            open: close - 5.0,
            high: close + 10.0,
            low: close - 10.0,
            close,
            volume: 1_234_567,
            is_prediction: false,
        }
    }

    pub fn basic(ticker: &str) -> BasicStockData {
        BasicStockData {
            company_info: CompanyInfo {
                name: "Tata Consultancy Services".to_string(),
                ticker: ticker.to_string(),
                exchange: "NSE".to_string(),
            },
            current_price_info: CurrentPriceInfo {
                price: 3542.10,
                change: 12.5,
                change_percent: 0.35,
                direction: Direction::Up,
            },
            historical_data: vec![
                bar(date(2024, 5, 1), 3500.0),
                bar(date(2024, 5, 3), 3542.10),
                bar(date(2024, 5, 2), 3520.0),
            ],
        }
    }

    pub fn advanced() -> AdvancedStockAnalysis {
        AdvancedStockAnalysis {
            key_metrics: KeyMetrics {
                market_cap: "12.81LCr".to_string(),
                pe_ratio: Some(29.4),
                div_yield: None,
                week52_high: 4255.0,
                week52_low: 3311.0,
                previous_close: 3529.6,
            },
            about: "IT services and consulting.".to_string(),
            related_stocks: vec![RelatedStock {
                name: "Infosys".to_string(),
                ticker: "INFY".to_string(),
                price: 1450.2,
                change_percent: -0.8,
                direction: Direction::Down,
            }],
            prediction: PredictionResponse {
                predicted_close: 3560.0,
                analysis: "Time2Vec encoding captures weekly seasonality.".to_string(),
                rmse: 12.3456,
                mae: 9.8765,
                r2_score: 0.9345,
            },
            historical_predictions: vec![
                HistoricalPredictionPoint {
                    date: date(2024, 5, 2),
                    predicted_close: 3515.0,
                },
                HistoricalPredictionPoint {
                    date: date(2024, 5, 3),
                    predicted_close: 3538.0,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_metrics_field_names() {
        let raw = json!({
            "market_cap": "11.07LCr",
            "pe_ratio": null,
            "div_yield": "1.2%",
            "52_wk_high": 4000.5,
            "52_wk_low": 3000.25,
            "previous_close": 3500.0
        });
        let metrics: KeyMetrics = serde_json::from_value(raw).unwrap();
        assert_eq!(metrics.week52_high, 4000.5);
        assert!(metrics.pe_ratio.is_none());

        let back = serde_json::to_value(&metrics).unwrap();
        assert_eq!(back["52_wk_low"], 3000.25);
    }

    #[test]
    fn test_date_parsing() {
        let raw = json!({
            "date": "2024-05-01T00:00:00.000Z",
            "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10
        });
        let point: StockDataPoint = serde_json::from_value(raw).unwrap();
        assert_eq!(point.date, date(2024, 5, 1));
        assert!(!point.is_prediction);

        let back = serde_json::to_value(&point).unwrap();
        assert_eq!(back["date"], "2024-05-01");
        assert!(back.get("is_prediction").is_none());

        assert!(trading_date::parse("May 1").is_none());
        assert!(trading_date::parse("").is_none());
    }

    #[test]
    fn test_direction_wire_values() {
        let d: Direction = serde_json::from_value(json!("down")).unwrap();
        assert_eq!(d, Direction::Down);
        assert!(serde_json::from_value::<Direction>(json!("sideways")).is_err());
    }

    #[test]
    fn test_progressive_merge() {
        let basic = basic("TCS");
        let analysis = StockAnalysis::from_basic(basic.clone());
        assert!(!analysis.has_advanced());
        assert!(analysis.key_metrics.is_none());

        let merged = analysis.with_advanced(advanced());
        assert!(merged.has_advanced());
        assert_eq!(merged.company_info, basic.company_info);
        assert_eq!(merged.historical_data, basic.historical_data);
        assert_eq!(merged.related_stocks.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_sort_history_desc() {
        let mut analysis = StockAnalysis::from_basic(basic("TCS"));
        analysis.sort_history_desc();
        let dates: Vec<_> = analysis.historical_data.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2024, 5, 3), date(2024, 5, 2), date(2024, 5, 1)]);
    }

    #[test]
    fn test_basic_analysis_json_omits_advanced() {
        let analysis = StockAnalysis::from_basic(basic("TCS"));
        let value = serde_json::to_value(&analysis).unwrap();
        assert!(value.get("prediction").is_none());
        assert_eq!(value["company_info"]["ticker"], "TCS");
    }
}
