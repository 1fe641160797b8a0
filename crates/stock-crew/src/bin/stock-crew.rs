//! Stock crew CLI
//!
//! Runs the stock analysis crew for one ticker and prints the final
//! recommendation.
//!
//! # Usage
//!
//! ```bash
//! # Any OpenAI-compatible endpoint works, e.g. a local server
//! export OPENAI_API_BASE="http://localhost:1234/v1"
//! export CREW_MODEL="your-model-name"
//!
//! cargo run --bin stock-crew -- --ticker MSFT
//! cargo run --bin stock-crew -- --ticker MSFT --plan
//! ```

use anyhow::Context as _;
use clap::Parser;
use std::path::PathBuf;
use stock_crew::{LlmProviderKind, StockCrewSettings, plan, run_crew};

#[derive(Debug, Parser)]
#[command(name = "stock-crew", version, about = "Multi-agent stock analyzer over mock market data")]
struct Cli {
    /// Stock ticker symbol
    #[arg(long, env = "TICKER", default_value = "AAPL")]
    ticker: String,

    /// Directory holding agents.yaml and tasks.yaml
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// LLM provider (openai or anthropic)
    #[arg(long)]
    provider: Option<LlmProviderKind>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Seed for the mock market data
    #[arg(long)]
    seed: Option<u64>,

    /// Print the crew plan and exit without calling an LLM
    #[arg(long)]
    plan: bool,

    /// Print the full crew output as JSON
    #[arg(long, conflicts_with = "plan")]
    json: bool,
}

impl Cli {
    fn settings(&self) -> stock_crew::Result<StockCrewSettings> {
        let mut builder = StockCrewSettings::builder();
        if let Some(dir) = &self.config_dir {
            builder = builder.config_dir(dir);
        }
        if let Some(provider) = self.provider {
            builder = builder.provider(provider);
        }
        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        builder.with_env()?.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crew_utils::init_tracing_with_default("warn,stock_crew=info,crew_workflow=info,crew_runtime=info");

    let cli = Cli::parse();
    let settings = cli.settings().context("invalid settings")?;

    if cli.plan {
        let plan = plan(&cli.ticker, &settings)?;
        println!("{plan}");
        return Ok(());
    }

    let output = run_crew(&cli.ticker, &settings)
        .await
        .with_context(|| format!("crew run for {} failed", cli.ticker))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{output}");
    }
    Ok(())
}
