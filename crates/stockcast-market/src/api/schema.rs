//! Output schemas paired with the two prompts

use crate::model::Direction;
use stockcast_llm::Schema;

/// Schema name sent with the basic request
pub const BASIC_SCHEMA_NAME: &str = "basic_stock_data";

/// Schema name sent with the advanced request
pub const ADVANCED_SCHEMA_NAME: &str = "advanced_stock_analysis";

fn direction() -> Schema {
    Schema::string().enumeration(Direction::VALUES)
}

/// Shape of [`crate::model::BasicStockData`]
pub fn basic_stock_data() -> Schema {
    let company_info = Schema::object()
        .property("name", Schema::string())
        .property("ticker", Schema::string())
        .property("exchange", Schema::string())
        .required(["name", "ticker", "exchange"]);

    let current_price_info = Schema::object()
        .property("price", Schema::number())
        .property("change", Schema::number())
        .property("change_percent", Schema::number())
        .property("direction", direction())
        .required(["price", "change", "change_percent", "direction"]);

    let bar = Schema::object()
        .property("date", Schema::string().describe("YYYY-MM-DD"))
        .property("open", Schema::number())
        .property("high", Schema::number())
        .property("low", Schema::number())
        .property("close", Schema::number())
        .property("volume", Schema::integer())
        .required(["date", "open", "high", "low", "close", "volume"]);

    Schema::object()
        .property("company_info", company_info)
        .property("current_price_info", current_price_info)
        .property("historical_data", Schema::array(bar))
        .required(["company_info", "current_price_info", "historical_data"])
}

/// Shape of [`crate::model::AdvancedStockAnalysis`]
pub fn advanced_stock_analysis() -> Schema {
    let key_metrics = Schema::object()
        .property("market_cap", Schema::string())
        .property("pe_ratio", Schema::number().nullable())
        .property("div_yield", Schema::string().nullable())
        .property("52_wk_high", Schema::number())
        .property("52_wk_low", Schema::number())
        .property("previous_close", Schema::number())
        .required([
            "market_cap",
            "pe_ratio",
            "div_yield",
            "52_wk_high",
            "52_wk_low",
            "previous_close",
        ]);

    let related = Schema::object()
        .property("name", Schema::string())
        .property("ticker", Schema::string())
        .property("price", Schema::number())
        .property("change_percent", Schema::number())
        .property("direction", direction())
        .required(["name", "ticker", "price", "change_percent", "direction"]);

    let prediction = Schema::object()
        .property("predicted_close", Schema::number())
        .property("analysis", Schema::string())
        .property("rmse", Schema::number())
        .property("mae", Schema::number())
        .property("r2_score", Schema::number())
        .required(["predicted_close", "analysis", "rmse", "mae", "r2_score"]);

    let historical_prediction = Schema::object()
        .property("date", Schema::string().describe("YYYY-MM-DD"))
        .property("predicted_close", Schema::number())
        .required(["date", "predicted_close"]);

    Schema::object()
        .property("key_metrics", key_metrics)
        .property("about", Schema::string())
        .property("related_stocks", Schema::array(related))
        .property("prediction", prediction)
        .property("historical_predictions", Schema::array(historical_prediction))
        .required([
            "key_metrics",
            "about",
            "related_stocks",
            "prediction",
            "historical_predictions",
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcast_llm::SchemaType;

    #[test]
    fn test_basic_schema_shape() {
        let schema = basic_stock_data();
        assert_eq!(schema.required.len(), 3);

        let history = schema.get("historical_data").unwrap();
        assert_eq!(history.kind, SchemaType::Array);
        let bar = history.items.as_deref().unwrap();
        assert_eq!(bar.get("volume").map(|s| s.kind), Some(SchemaType::Integer));

        let direction = schema
            .get("current_price_info")
            .and_then(|s| s.get("direction"))
            .unwrap();
        assert_eq!(direction.enum_values, vec!["up", "down", "neutral"]);
    }

    #[test]
    fn test_advanced_schema_nullability() {
        let schema = advanced_stock_analysis();
        let metrics = schema.get("key_metrics").unwrap();
        assert!(metrics.get("pe_ratio").unwrap().nullable);
        assert!(metrics.get("div_yield").unwrap().nullable);
        assert!(!metrics.get("52_wk_high").unwrap().nullable);
        // Nullable fields are still required
        assert!(metrics.required.iter().any(|r| r == "pe_ratio"));

        let gemini = schema.to_gemini();
        assert_eq!(
            gemini["properties"]["key_metrics"]["properties"]["52_wk_low"]["type"],
            "NUMBER"
        );
    }
}
