//! Tool for computing a simple moving average

use async_trait::async_trait;
use crew_core::Result as CrewResult;
use crew_llm::tools::schema;
use crew_tools::{Tool, parse_args};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::market_data;

/// Tool computing the SMA of a `series_tail` returned by the price history tool
pub struct SmaTool;

#[derive(Debug, Deserialize)]
struct SmaParams {
    series_tail: Vec<f64>,
    /// Non-positive windows count as 1
    window: i64,
}

#[async_trait]
impl Tool for SmaTool {
    async fn execute(&self, params: Value) -> CrewResult<Value> {
        let params: SmaParams = parse_args(params)?;
        let window = usize::try_from(params.window.max(1)).unwrap_or(usize::MAX);
        let average = market_data::sma(&params.series_tail, window)?;
        Ok(json!(average))
    }

    fn name(&self) -> &str {
        super::COMPUTE_SMA
    }

    fn description(&self) -> &str {
        "Compute simple moving average from a numeric series_tail list."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "series_tail": schema::array(
                    "Price series tail from price history output",
                    schema::number("Closing price"),
                ),
                "window": schema::integer("SMA window size; values below 1 count as 1"),
            }),
            &["series_tail", "window"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sma_tool() {
        let result = SmaTool
            .execute(json!({"series_tail": [1.0, 2.0, 3.0, 4.0], "window": 2}))
            .await
            .unwrap();
        assert_eq!(result, json!(3.5));
    }

    #[tokio::test]
    async fn test_sma_tool_window_bounds() {
        let series = json!([1.0, 2.0]);
        let last = SmaTool
            .execute(json!({"series_tail": series.clone(), "window": -3}))
            .await
            .unwrap();
        assert_eq!(last, json!(2.0));

        let whole = SmaTool
            .execute(json!({"series_tail": series, "window": i64::MAX}))
            .await
            .unwrap();
        assert_eq!(whole, json!(1.5));
    }

    #[tokio::test]
    async fn test_sma_tool_errors() {
        assert!(SmaTool.execute(json!({"series_tail": [], "window": 2})).await.is_err());
        assert!(SmaTool.execute(json!({"series_tail": [1.0]})).await.is_err());
        assert!(SmaTool.execute(json!({"series_tail": ["a"], "window": 1})).await.is_err());
    }
}
