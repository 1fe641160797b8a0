//! Crew assembly from the YAML definitions

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use crew_core::Agent;
use crew_llm::LLMProvider;
use crew_llm::providers::{AnthropicProvider, OpenAIProvider};
use crew_runtime::{AgentRuntime, Persona, RoleAgent, RoleAgentOptions};
use crew_tools::{Tool, ToolRegistry};
use crew_workflow::{Crew, CrewOutput, Process, Task, delegation_tools};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{LlmProviderKind, StockCrewSettings};
use crate::definitions::{AgentDefinition, CrewDefinitions};
use crate::error::Result;
use crate::market_data::MockMarket;
use crate::tools::StockToolbox;

/// Create the LLM provider named in the settings from the environment
pub fn build_provider(settings: &StockCrewSettings) -> Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match settings.provider {
        LlmProviderKind::OpenAI => Arc::new(OpenAIProvider::from_env()?),
        LlmProviderKind::Anthropic => Arc::new(AnthropicProvider::from_env()?),
    };
    Ok(provider)
}

/// Build the crew for `ticker` with the provider from [`build_provider`]
pub fn build_crew(ticker: &str, settings: &StockCrewSettings) -> Result<Crew> {
    settings.validate()?;
    build_crew_with_provider(ticker, settings, build_provider(settings)?)
}

/// Build the crew for `ticker` on top of `provider`
///
/// Every agent in `agents.yaml` is built so that tool errors surface even for
/// agents without tasks, but only agents used by a task join the crew.
pub fn build_crew_with_provider(
    ticker: &str,
    settings: &StockCrewSettings,
    provider: Arc<dyn LLMProvider>,
) -> Result<Crew> {
    settings.validate()?;
    let definitions = CrewDefinitions::load(&settings.agents_path(), &settings.tasks_path())?;
    let toolbox = StockToolbox::new(Arc::new(MockMarket::new(settings.seed)));
    let runtime = AgentRuntime::builder()
        .provider(provider)
        .default_model(&settings.model)
        .default_max_iterations(settings.max_iterations)
        .default_max_tokens(settings.max_tokens)
        .default_temperature(settings.temperature)
        .build()?;

    let mut tools: HashMap<&str, Vec<Arc<dyn Tool>>> = HashMap::new();
    let mut plain: HashMap<&str, Arc<RoleAgent>> = HashMap::new();
    for definition in &definitions.agents {
        let agent_tools = toolbox.tools_for(definition)?;
        let agent = role_agent(&runtime, definition, agent_tools.clone(), false);
        tools.insert(definition.key.as_str(), agent_tools);
        plain.insert(definition.key.as_str(), Arc::new(agent));
    }

    let used = definitions.used_agents();
    let mut agents: HashMap<&str, Arc<dyn Agent>> = HashMap::new();
    for definition in &used {
        let key = definition.key.as_str();
        let (Some(agent), Some(own_tools)) = (plain.get(key), tools.get(key)) else {
            continue;
        };
        let agent: Arc<dyn Agent> = if definition.allow_delegation {
            let coworkers = used
                .iter()
                .filter(|other| other.key != definition.key)
                .filter_map(|other| plain.get(other.key.as_str()))
                .map(|coworker| coworker.clone() as Arc<dyn Agent>);
            let mut with_delegation = own_tools.clone();
            with_delegation.extend(delegation_tools(&definition.role, coworkers));
            Arc::new(role_agent(&runtime, definition, with_delegation, true))
        } else {
            agent.clone()
        };
        agents.insert(key, agent);
    }

    let mut tasks = Vec::with_capacity(definitions.tasks.len());
    for definition in &definitions.tasks {
        let Some(agent) = definition
            .agent
            .as_deref()
            .and_then(|key| agents.get(key))
        else {
            continue;
        };
        let mut task = Task::new(
            definition.key.clone(),
            definition.description_for(ticker),
            definition.expected_output_for(ticker),
            agent.clone(),
        );
        if let Some(context) = &definition.context {
            task = task.with_context(context.iter().cloned());
        }
        tasks.push(task);
    }

    info!(
        ticker,
        agents = used.len(),
        tasks = tasks.len(),
        model = %settings.model,
        "Crew assembled"
    );

    let crew = Crew::builder()
        .agents(
            used.iter()
                .filter_map(|definition| agents.get(definition.key.as_str()).cloned()),
        )
        .tasks(tasks)
        .process(Process::Sequential)
        .verbose(settings.verbose)
        .build()?;
    Ok(crew)
}

fn role_agent(
    runtime: &AgentRuntime,
    definition: &AgentDefinition,
    tools: Vec<Arc<dyn Tool>>,
    allow_delegation: bool,
) -> RoleAgent {
    debug!(agent = %definition.key, tools = tools.len(), allow_delegation, "Building agent");
    runtime.create_role_agent(
        Persona::new(&definition.role, &definition.goal, &definition.backstory),
        Arc::new(ToolRegistry::with_tools(tools)),
        RoleAgentOptions {
            max_iterations: definition.max_iter,
            verbose: definition.verbose,
            allow_delegation,
        },
    )
}

/// Kick off the crew for `ticker` with inputs `{ticker}`
pub async fn run_crew(ticker: &str, settings: &StockCrewSettings) -> Result<CrewOutput> {
    settings.validate()?;
    run_crew_with_provider(ticker, settings, build_provider(settings)?).await
}

/// Kick off the crew for `ticker` on top of `provider`
pub async fn run_crew_with_provider(
    ticker: &str,
    settings: &StockCrewSettings,
    provider: Arc<dyn LLMProvider>,
) -> Result<CrewOutput> {
    let crew = build_crew_with_provider(ticker, settings, provider)?;
    let inputs = BTreeMap::from([("ticker".to_string(), ticker.to_string())]);
    Ok(crew.kickoff(&inputs).await?)
}

/// One task of a [`CrewPlan`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTask {
    pub key: String,
    pub agent: String,
    pub role: String,
    pub tools: Vec<String>,
    /// Explicit context keys; `None` means all earlier tasks
    pub context: Option<Vec<String>>,
    pub description: String,
}

/// What a crew run would do, without calling an LLM
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewPlan {
    pub ticker: String,
    pub process: Process,
    /// Agents joining the crew, in `agents.yaml` order
    pub agents: Vec<String>,
    /// Tasks in execution order
    pub tasks: Vec<PlannedTask>,
}

/// Resolve the definitions for `ticker` into a [`CrewPlan`]
pub fn plan(ticker: &str, settings: &StockCrewSettings) -> Result<CrewPlan> {
    settings.validate()?;
    let definitions = CrewDefinitions::load(&settings.agents_path(), &settings.tasks_path())?;
    let toolbox = StockToolbox::new(Arc::new(MockMarket::new(settings.seed)));
    let used = definitions.used_agents();

    let mut tasks = Vec::with_capacity(definitions.tasks.len());
    for task in &definitions.tasks {
        let Some(agent) = task.agent.as_deref().and_then(|key| definitions.agent(key)) else {
            continue;
        };
        let mut tools: Vec<String> = toolbox
            .tools_for(agent)?
            .iter()
            .map(|tool| tool.name().to_string())
            .collect();
        if agent.allow_delegation && used.len() > 1 {
            tools.extend(["delegate_work".to_string(), "ask_question".to_string()]);
        }
        tasks.push(PlannedTask {
            key: task.key.clone(),
            agent: agent.key.clone(),
            role: agent.role.clone(),
            tools,
            context: task.context.clone(),
            description: task.description_for(ticker),
        });
    }

    Ok(CrewPlan {
        ticker: ticker.to_string(),
        process: Process::Sequential,
        agents: used.iter().map(|agent| agent.key.clone()).collect(),
        tasks,
    })
}

impl fmt::Display for CrewPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["#", "Task", "Agent", "Tools", "Context"]);

        for (index, task) in self.tasks.iter().enumerate() {
            let tools = if task.tools.is_empty() {
                "-".to_string()
            } else {
                task.tools.join(", ")
            };
            let context = task
                .context
                .as_ref()
                .map_or_else(|| "all previous".to_string(), |keys| keys.join(", "));
            table.add_row(vec![
                (index + 1).to_string(),
                task.key.clone(),
                format!("{} ({})", task.role, task.agent),
                tools,
                context,
            ]);
        }

        writeln!(
            f,
            "Crew for {} ({} process, {} agents)",
            self.ticker,
            self.process,
            self.agents.len()
        )?;
        write!(f, "{table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config_dir;

    fn settings() -> StockCrewSettings {
        StockCrewSettings::builder()
            .config_dir(default_config_dir())
            .seed(11)
            .build()
            .unwrap()
    }

    #[test]
    fn test_plan_of_shipped_config() {
        let plan = plan("AAPL", &settings()).unwrap();

        let keys: Vec<&str> = plan.tasks.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "market_analysis",
                "fundamentals_analysis",
                "news_analysis",
                "final_recommendation"
            ]
        );
        assert_eq!(
            plan.agents,
            ["market_agent", "fundamentals_agent", "news_agent", "decision_agent"]
        );
        assert_eq!(plan.tasks[0].tools, ["price_history", "compute_sma"]);
        assert!(plan.tasks[0].description.contains("AAPL"));
        assert!(!plan.tasks[0].description.contains("{ticker}"));
        assert!(plan.tasks[3].tools.is_empty());
        assert_eq!(
            plan.tasks[3].context.as_deref(),
            Some(
                &[
                    "market_analysis".to_string(),
                    "fundamentals_analysis".to_string(),
                    "news_analysis".to_string()
                ][..]
            )
        );

        let rendered = plan.to_string();
        assert!(rendered.starts_with("Crew for AAPL (sequential process, 4 agents)"));
        assert!(rendered.contains("final_recommendation"));
    }

    #[test]
    fn test_plan_missing_config_dir() {
        let settings = StockCrewSettings::builder()
            .config_dir("/definitely/not/here")
            .build()
            .unwrap();
        let err = plan("AAPL", &settings).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing config file: /definitely/not/here/agents.yaml"
        );
    }
}
