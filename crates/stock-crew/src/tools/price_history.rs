//! Tool for generating a mock price history

use async_trait::async_trait;
use crew_core::Result as CrewResult;
use crew_llm::tools::schema;
use crew_tools::{Tool, parse_args};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::market_data::{DEFAULT_DAYS, MockMarket};

/// Tool returning the last close and recent closes of a random price walk
pub struct PriceHistoryTool {
    market: Arc<MockMarket>,
}

#[derive(Debug, Deserialize)]
struct PriceHistoryParams {
    ticker: String,
    #[serde(default = "default_days")]
    days: usize,
}

fn default_days() -> usize {
    DEFAULT_DAYS
}

impl PriceHistoryTool {
    /// Create a new price history tool
    pub fn new(market: Arc<MockMarket>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for PriceHistoryTool {
    async fn execute(&self, params: Value) -> CrewResult<Value> {
        let params: PriceHistoryParams = parse_args(params)?;
        let history = self.market.get_price_history(&params.ticker, params.days)?;
        serde_json::to_value(history)
            .map_err(|e| crew_core::Error::ProcessingFailed(e.to_string()))
    }

    fn name(&self) -> &str {
        super::PRICE_HISTORY
    }

    fn description(&self) -> &str {
        "Get mock historical prices for a ticker (returns last_close and series_tail)."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("Stock ticker, e.g., AAPL"),
                "days": schema::integer_with_default("Number of days of history to generate (at most 36500)", 365),
            }),
            &["ticker"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_price_history_tool() {
        let tool = PriceHistoryTool::new(Arc::new(MockMarket::seeded(1)));

        let result = tool.execute(json!({"ticker": "AAPL", "days": 90})).await.unwrap();
        assert_eq!(result["ticker"], "AAPL");
        assert_eq!(result["days"], 90);
        assert_eq!(result["series_tail"].as_array().unwrap().len(), 60);

        let result = tool.execute(json!({"ticker": "AAPL"})).await.unwrap();
        assert_eq!(result["days"], 365);
    }

    #[tokio::test]
    async fn test_invalid_days() {
        let tool = PriceHistoryTool::new(Arc::new(MockMarket::seeded(1)));

        let err = tool.execute(json!({"ticker": "AAPL", "days": 0})).await.unwrap_err();
        assert!(matches!(err, crew_core::Error::InvalidArguments(_)));
        assert!(tool.execute(json!({"ticker": "AAPL", "days": -3})).await.is_err());
        assert!(tool.execute(json!({"days": 10})).await.is_err());
        let err = tool
            .execute(json!({"ticker": "AAPL", "days": 10_000_000_000_u64}))
            .await
            .unwrap_err();
        assert!(matches!(err, crew_core::Error::InvalidArguments(_)));
    }
}
