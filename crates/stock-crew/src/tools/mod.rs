//! Mock market data tools for LLM agents

pub mod financials;
pub mod news;
pub mod price_history;
pub mod sma;

pub use financials::FinancialsTool;
pub use news::NewsTool;
pub use price_history::PriceHistoryTool;
pub use sma::SmaTool;

use crew_tools::{Tool, ToolRegistry};
use std::sync::Arc;

use crate::definitions::AgentDefinition;
use crate::error::{Result, StockCrewError};
use crate::market_data::MockMarket;

pub const PRICE_HISTORY: &str = "price_history";
pub const COMPUTE_SMA: &str = "compute_sma";
pub const FINANCIALS: &str = "financials";
pub const RECENT_NEWS: &str = "recent_news";

/// Tools an agent gets when its definition lists none
pub fn default_tool_names(agent_key: &str) -> &'static [&'static str] {
    match agent_key {
        "market_agent" => &[PRICE_HISTORY, COMPUTE_SMA],
        "fundamentals_agent" => &[FINANCIALS],
        "news_agent" => &[RECENT_NEWS],
        _ => &[],
    }
}

/// Tool names for an agent: its explicit `tools` list or the default assignment
pub fn tool_names_for(agent: &AgentDefinition) -> Vec<String> {
    match &agent.tools {
        Some(tools) => tools.clone(),
        None => default_tool_names(&agent.key)
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

/// One instance of every stock tool, shared by all agents of a crew
pub struct StockToolbox {
    tools: ToolRegistry,
}

impl StockToolbox {
    /// Create the tools over `market`
    pub fn new(market: Arc<MockMarket>) -> Self {
        let tools = ToolRegistry::with_tools([
            Arc::new(PriceHistoryTool::new(market.clone())) as Arc<dyn Tool>,
            Arc::new(SmaTool),
            Arc::new(FinancialsTool::new(market.clone())),
            Arc::new(NewsTool::new(market)),
        ]);
        Self { tools }
    }

    /// Tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Names of all tools
    pub fn names(&self) -> Vec<String> {
        self.tools.names()
    }

    /// Tools of `agent`, resolved by name
    pub fn tools_for(&self, agent: &AgentDefinition) -> Result<Vec<Arc<dyn Tool>>> {
        tool_names_for(agent)
            .into_iter()
            .map(|name| {
                self.get(&name).ok_or_else(|| StockCrewError::UnknownTool {
                    agent: agent.key.clone(),
                    tool: name,
                })
            })
            .collect()
    }
}
