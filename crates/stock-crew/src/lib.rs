//! Multi-agent stock analysis crew
//!
//! Four agents analyze one ticker in sequence: a market analyst reads the
//! price history and moving averages, a fundamentals analyst reads financial
//! ratios, a news analyst reads headlines, and a portfolio manager turns the
//! three reports into a BUY, HOLD or SELL recommendation.
//!
//! All market data is mock data from [`market_data`]. Agents and tasks are
//! declared in `agents.yaml` and `tasks.yaml` (see [`definitions`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_crew::{StockCrewSettings, run_crew};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = StockCrewSettings::from_env()?;
//!     let output = run_crew("AAPL", &settings).await?;
//!     println!("{output}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crew;
pub mod definitions;
pub mod error;
pub mod market_data;
pub mod tools;

pub use config::{LlmProviderKind, StockCrewSettings, StockCrewSettingsBuilder};
pub use crew::{
    CrewPlan, PlannedTask, build_crew, build_crew_with_provider, build_provider, plan, run_crew,
    run_crew_with_provider,
};
pub use definitions::{AgentDefinition, CrewDefinitions, TaskDefinition, load_yaml};
pub use error::{Result, StockCrewError};
pub use market_data::MockMarket;
pub use tools::StockToolbox;
