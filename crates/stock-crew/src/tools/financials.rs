//! Tool for generating mock financial ratios

use async_trait::async_trait;
use crew_core::Result as CrewResult;
use crew_llm::tools::schema;
use crew_tools::{Tool, parse_args};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::market_data::MockMarket;

/// Tool returning growth, margin and leverage ratios
pub struct FinancialsTool {
    market: Arc<MockMarket>,
}

#[derive(Debug, Deserialize)]
struct FinancialsParams {
    ticker: String,
}

impl FinancialsTool {
    /// Create a new financials tool
    pub fn new(market: Arc<MockMarket>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for FinancialsTool {
    async fn execute(&self, params: Value) -> CrewResult<Value> {
        let params: FinancialsParams = parse_args(params)?;
        let financials = self.market.get_financials(&params.ticker);
        serde_json::to_value(financials)
            .map_err(|e| crew_core::Error::ProcessingFailed(e.to_string()))
    }

    fn name(&self) -> &str {
        super::FINANCIALS
    }

    fn description(&self) -> &str {
        "Get mock company financial metrics (growth, margins, leverage)."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "ticker": schema::string("Stock ticker, e.g., AAPL") }),
            &["ticker"],
        )
    }
}
