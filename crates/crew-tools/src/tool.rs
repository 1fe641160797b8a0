//! Tool trait definition

use async_trait::async_trait;
use crew_core::Result;
use crew_llm::ToolDefinition;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// Each tool must provide a name, description, and JSON schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with JSON arguments matching [`Tool::input_schema`]
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Tool name, unique within a registry
    ///
    /// Provider APIs restrict names to `[a-zA-Z0-9_-]`.
    fn name(&self) -> &str;

    /// Description that tells the LLM when to use this tool
    fn description(&self) -> &str;

    /// JSON schema of the tool's arguments
    fn input_schema(&self) -> Value;

    /// Definition sent to the LLM provider
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}

/// Decode tool arguments, mapping failures to [`crew_core::Error::InvalidArguments`]
pub fn parse_args<T: DeserializeOwned>(params: Value) -> Result<T> {
    serde_json::from_value(params).map_err(crew_core::Error::invalid_arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Args {
        ticker: String,
        #[serde(default = "default_n")]
        n: usize,
    }

    fn default_n() -> usize {
        5
    }

    #[test]
    fn test_parse_args_defaults() {
        let args: Args = parse_args(json!({"ticker": "AAPL"})).unwrap();
        assert_eq!(args.ticker, "AAPL");
        assert_eq!(args.n, 5);
    }

    #[test]
    fn test_parse_args_error() {
        let err = parse_args::<Args>(json!({"n": 3})).unwrap_err();
        assert!(matches!(err, crew_core::Error::InvalidArguments(_)));
        assert!(err.to_string().contains("ticker"));
    }
}
