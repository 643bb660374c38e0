//! Plausibility checks for model-generated data
//!
//! The model is free to return anything that fits the schema. These checks
//! reject values no dashboard can render sensibly (NaN, infinities, negative
//! prices) and cap the history at the requested length.

use crate::error::GenerationError;
use crate::model::{AdvancedStockAnalysis, BasicStockData, StockDataPoint};
use tracing::warn;

type Result<T> = std::result::Result<T, GenerationError>;

fn price(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GenerationError::Invalid(format!("{field} = {value}")))
    }
}

fn finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GenerationError::Invalid(format!("{field} = {value}")))
    }
}

fn bar(point: &StockDataPoint) -> Result<()> {
    let day = point.date;
    price(&format!("open on {day}"), point.open)?;
    price(&format!("high on {day}"), point.high)?;
    price(&format!("low on {day}"), point.low)?;
    price(&format!("close on {day}"), point.close)
}

/// Check a basic response and keep at most `history_days` bars (newest first)
pub fn basic(mut data: BasicStockData, history_days: usize) -> Result<BasicStockData> {
    if data.company_info.ticker.trim().is_empty() {
        return Err(GenerationError::Invalid("empty ticker in company_info".to_string()));
    }

    let quote = &data.current_price_info;
    price("current price", quote.price)?;
    finite("change", quote.change)?;
    finite("change_percent", quote.change_percent)?;

    for point in &data.historical_data {
        bar(point)?;
    }

    if data.historical_data.len() > history_days {
        warn!(
            returned = data.historical_data.len(),
            kept = history_days,
            "Truncating historical data"
        );
        data.historical_data.sort_by(|a, b| b.date.cmp(&a.date));
        data.historical_data.truncate(history_days);
    }

    Ok(data)
}

/// Check an advanced response and keep at most `history_days` historical predictions
pub fn advanced(mut data: AdvancedStockAnalysis, history_days: usize) -> Result<AdvancedStockAnalysis> {
    let metrics = &data.key_metrics;
    price("52_wk_high", metrics.week52_high)?;
    price("52_wk_low", metrics.week52_low)?;
    price("previous_close", metrics.previous_close)?;
    if let Some(pe) = metrics.pe_ratio {
        finite("pe_ratio", pe)?;
    }

    let prediction = &data.prediction;
    price("predicted_close", prediction.predicted_close)?;
    finite("rmse", prediction.rmse)?;
    finite("mae", prediction.mae)?;
    finite("r2_score", prediction.r2_score)?;

    for stock in &data.related_stocks {
        price(&format!("price of {}", stock.ticker), stock.price)?;
        finite(&format!("change_percent of {}", stock.ticker), stock.change_percent)?;
    }

    for point in &data.historical_predictions {
        price(&format!("predicted_close on {}", point.date), point.predicted_close)?;
    }

    if data.historical_predictions.len() > history_days {
        warn!(
            returned = data.historical_predictions.len(),
            kept = history_days,
            "Truncating historical predictions"
        );
        data.historical_predictions.sort_by(|a, b| b.date.cmp(&a.date));
        data.historical_predictions.truncate(history_days);
    }

    Ok(data)
}
