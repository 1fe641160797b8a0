//! Tool for generating mock news

use async_trait::async_trait;
use crew_core::Result as CrewResult;
use crew_llm::tools::schema;
use crew_tools::{Tool, parse_args};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::market_data::{DEFAULT_HEADLINES, MockMarket};

/// Tool returning placeholder headlines and a sentiment label
pub struct NewsTool {
    market: Arc<MockMarket>,
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    ticker: String,
    #[serde(default = "default_n")]
    n: usize,
}

fn default_n() -> usize {
    DEFAULT_HEADLINES
}

impl NewsTool {
    /// Create a new news tool
    pub fn new(market: Arc<MockMarket>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for NewsTool {
    async fn execute(&self, params: Value) -> CrewResult<Value> {
        let params: NewsParams = parse_args(params)?;
        let news = self.market.get_recent_news(&params.ticker, params.n);
        serde_json::to_value(news)
            .map_err(|e| crew_core::Error::ProcessingFailed(e.to_string()))
    }

    fn name(&self) -> &str {
        super::RECENT_NEWS
    }

    fn description(&self) -> &str {
        "Get mock recent news headlines and a sentiment label."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("Stock ticker, e.g., AAPL"),
                "n": schema::integer_with_default("Number of headlines to generate", 5),
            }),
            &["ticker"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_news_tool_defaults_to_five_headlines() {
        let tool = NewsTool::new(Arc::new(MockMarket::seeded(5)));
        let result = tool.execute(json!({"ticker": "TSLA"})).await.unwrap();

        let headlines = result["headlines"].as_array().unwrap();
        assert_eq!(headlines.len(), 5);
        assert_eq!(headlines[4], "TSLA: headline 5");
        assert!(result["asof"].as_str().unwrap().len() == 10);
    }

    #[tokio::test]
    async fn test_news_tool_zero_headlines() {
        let tool = NewsTool::new(Arc::new(MockMarket::seeded(5)));
        let result = tool.execute(json!({"ticker": "TSLA", "n": 0})).await.unwrap();
        assert_eq!(result["headlines"], json!([]));
    }
}
