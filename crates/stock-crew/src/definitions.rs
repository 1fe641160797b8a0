//! Agent and task definitions loaded from YAML
//!
//! Both files are mappings keyed by agent or task key. Key order matters:
//! it is the task execution order and the agent order of the crew.

use crate::error::{Result, StockCrewError};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a YAML file whose top level is a mapping
///
/// An empty or `null` document yields an empty mapping.
pub fn load_yaml(path: &Path) -> Result<Mapping> {
    if !path.exists() {
        return Err(StockCrewError::MissingConfigFile {
            path: path.to_path_buf(),
        });
    }

    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value = serde_yaml::from_str(&text).map_err(|e| invalid_yaml(path, e))?;
    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(invalid_yaml(path, "top-level value must be a mapping")),
    }
}

fn invalid_yaml(path: &Path, reason: impl ToString) -> StockCrewError {
    StockCrewError::InvalidYaml {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn default_verbose() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawAgent {
    role: Option<String>,
    goal: Option<String>,
    backstory: Option<String>,
    #[serde(default)]
    allow_delegation: bool,
    #[serde(default = "default_verbose")]
    verbose: bool,
    tools: Option<Vec<String>>,
    max_iter: Option<usize>,
}

impl Default for RawAgent {
    fn default() -> Self {
        Self {
            role: None,
            goal: None,
            backstory: None,
            allow_delegation: false,
            verbose: default_verbose(),
            tools: None,
            max_iter: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawTask {
    description: Option<String>,
    expected_output: Option<String>,
    agent: Option<String>,
    context: Option<Vec<String>>,
}

/// One entry of `agents.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentDefinition {
    /// Agent key
    pub key: String,
    /// Role title, defaults to the key
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub allow_delegation: bool,
    pub verbose: bool,
    /// Explicit tool names overriding the default assignment
    pub tools: Option<Vec<String>>,
    /// Per-agent iteration cap
    pub max_iter: Option<usize>,
}

impl AgentDefinition {
    fn from_raw(key: String, raw: RawAgent) -> Self {
        Self {
            role: raw.role.unwrap_or_else(|| key.clone()),
            goal: raw.goal.unwrap_or_default(),
            backstory: raw.backstory.unwrap_or_default(),
            allow_delegation: raw.allow_delegation,
            verbose: raw.verbose,
            tools: raw.tools,
            max_iter: raw.max_iter,
            key,
        }
    }
}

/// One entry of `tasks.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDefinition {
    /// Task key
    pub key: String,
    pub description: String,
    pub expected_output: String,
    /// Key of the agent handling the task
    pub agent: Option<String>,
    /// Task keys whose outputs form the context; `None` means all earlier tasks
    pub context: Option<Vec<String>>,
}

impl TaskDefinition {
    fn from_raw(key: String, raw: RawTask) -> Self {
        Self {
            key,
            description: raw.description.unwrap_or_default(),
            expected_output: raw.expected_output.unwrap_or_default(),
            agent: raw.agent,
            context: raw.context.filter(|keys| !keys.is_empty()),
        }
    }

    /// Description with `{ticker}` replaced
    pub fn description_for(&self, ticker: &str) -> String {
        render_ticker(&self.description, ticker)
    }

    /// Expected output with `{ticker}` replaced
    pub fn expected_output_for(&self, ticker: &str) -> String {
        render_ticker(&self.expected_output, ticker)
    }
}

/// Replace `{ticker}`; other braces stay as they are
pub fn render_ticker(template: &str, ticker: &str) -> String {
    template.replace("{ticker}", ticker)
}

fn entries<T, R>(
    path: &Path,
    mapping: Mapping,
    build: impl Fn(String, R) -> T,
) -> Result<Vec<T>>
where
    R: Default + for<'de> Deserialize<'de>,
{
    mapping
        .into_iter()
        .map(|(key, value)| {
            let key = match key {
                Value::String(key) => key,
                other => {
                    return Err(invalid_yaml(path, format!("key {other:?} is not a string")));
                }
            };
            let raw: Option<R> = serde_yaml::from_value(value)
                .map_err(|e| invalid_yaml(path, format!("'{key}': {e}")))?;
            Ok(build(key, raw.unwrap_or_default()))
        })
        .collect()
}

/// Agents and tasks of a crew, in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewDefinitions {
    pub agents: Vec<AgentDefinition>,
    pub tasks: Vec<TaskDefinition>,
}

impl CrewDefinitions {
    /// Load `agents.yaml` and `tasks.yaml` and check the references between them
    pub fn load(agents_path: &Path, tasks_path: &Path) -> Result<Self> {
        let agents = entries(agents_path, load_yaml(agents_path)?, AgentDefinition::from_raw)?;
        let tasks = entries(tasks_path, load_yaml(tasks_path)?, TaskDefinition::from_raw)?;
        debug!(
            agents = agents.len(),
            tasks = tasks.len(),
            "Loaded crew definitions"
        );

        let definitions = Self { agents, tasks };
        definitions.validate()?;
        Ok(definitions)
    }

    /// Load both files from one directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        Self::load(
            &dir.join(crate::config::AGENTS_FILE),
            &dir.join(crate::config::TASKS_FILE),
        )
    }

    /// Check that every task names a defined agent and an earlier context
    pub fn validate(&self) -> Result<()> {
        for task in &self.tasks {
            let known = task
                .agent
                .as_deref()
                .is_some_and(|agent| self.agent(agent).is_some());
            if !known {
                return Err(StockCrewError::UnknownAgent {
                    task: task.key.clone(),
                    agent: task.agent.clone().unwrap_or_default(),
                });
            }
        }

        let positions: HashMap<&str, usize> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| (task.key.as_str(), index))
            .collect();
        for (index, task) in self.tasks.iter().enumerate() {
            for context in task.context.iter().flatten() {
                match positions.get(context.as_str()) {
                    None => {
                        return Err(StockCrewError::UnknownContextTask {
                            task: task.key.clone(),
                            context: context.clone(),
                        });
                    }
                    Some(&position) if position >= index => {
                        return Err(StockCrewError::ContextNotEarlier {
                            task: task.key.clone(),
                            context: context.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }

    /// Agent definition by key
    pub fn agent(&self, key: &str) -> Option<&AgentDefinition> {
        self.agents.iter().find(|agent| agent.key == key)
    }

    /// Agents referenced by at least one task, in `agents.yaml` order
    pub fn used_agents(&self) -> Vec<&AgentDefinition> {
        self.agents
            .iter()
            .filter(|agent| {
                self.tasks
                    .iter()
                    .any(|task| task.agent.as_deref() == Some(agent.key.as_str()))
            })
            .collect()
    }
}
