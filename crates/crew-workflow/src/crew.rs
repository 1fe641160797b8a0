//! Crew definition and sequential execution

use crate::output::{CrewOutput, TaskOutput};
use crate::task::{Task, interpolate_inputs};
use crew_core::{Agent, Context, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

/// How a crew schedules its tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// Tasks run one after another in declaration order
    #[default]
    Sequential,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

/// A team of agents working through an ordered list of tasks
///
/// Each task sees the outputs of earlier tasks as context: exactly the tasks
/// it lists, or every earlier task when it lists none.
///
/// # Example
///
/// ```no_run
/// use crew_workflow::{Crew, Task};
/// use std::collections::BTreeMap;
///
/// # async fn example(analyst: std::sync::Arc<dyn crew_core::Agent>) -> crew_core::Result<()> {
/// let crew = Crew::builder()
///     .agent(analyst.clone())
///     .task(Task::new("report", "Report on {ticker}", "A paragraph", analyst))
///     .build()?;
///
/// let inputs = BTreeMap::from([("ticker".to_string(), "AAPL".to_string())]);
/// let output = crew.kickoff(&inputs).await?;
/// println!("{output}");
/// # Ok(())
/// # }
/// ```
pub struct Crew {
    agents: Vec<Arc<dyn Agent>>,
    tasks: Vec<Task>,
    process: Process,
    verbose: bool,
}

impl Crew {
    /// Create a new crew builder
    pub fn builder() -> CrewBuilder {
        CrewBuilder::new()
    }

    /// Agents in the crew
    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    /// Tasks in execution order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Scheduling process
    pub fn process(&self) -> Process {
        self.process
    }

    /// Whether task progress is logged at info level
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Run every task and return the outputs
    ///
    /// `{name}` placeholders in task descriptions and expected outputs are
    /// replaced by the matching input. The first failing task aborts the run.
    pub async fn kickoff(&self, inputs: &BTreeMap<String, String>) -> Result<CrewOutput> {
        let run_id = Uuid::new_v4();
        let mut context = Context::new()
            .with_run_id(run_id.to_string())
            .with_inputs(inputs);
        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());

        info!(%run_id, process = %self.process, tasks = self.tasks.len(), "Crew kickoff");

        for task in &self.tasks {
            let description = interpolate_inputs(task.description(), inputs);
            let expected_output = interpolate_inputs(task.expected_output(), inputs);
            let task_context = Self::context_for(task, &outputs);
            let prompt = Task::prompt(&description, &expected_output, &task_context);
            let agent = task.agent();

            if self.verbose {
                info!(task = %task.key(), agent = %agent.name(), "Starting task");
            } else {
                debug!(task = %task.key(), agent = %agent.name(), "Starting task");
            }

            context.set_task(task.key());
            let span = info_span!("task", task = %task.key(), %run_id);
            let raw = agent
                .process(prompt, &mut context)
                .instrument(span)
                .await
                .map_err(|e| {
                    Error::ProcessingFailed(format!("Task '{}' failed: {e}", task.key()))
                })?;

            if self.verbose {
                info!(task = %task.key(), agent = %agent.name(), output = %raw, "Task completed");
            } else {
                debug!(task = %task.key(), output_length = raw.len(), "Task completed");
            }

            outputs.push(TaskOutput {
                task: task.key().to_string(),
                agent: agent.name().to_string(),
                description,
                raw,
            });
        }

        let raw = outputs
            .last()
            .map(|output| output.raw.clone())
            .unwrap_or_default();
        info!(%run_id, "Crew finished");

        Ok(CrewOutput {
            run_id,
            raw,
            tasks_output: outputs,
        })
    }

    fn context_for<'a>(task: &Task, outputs: &'a [TaskOutput]) -> Vec<&'a str> {
        match task.context() {
            Some(keys) => keys
                .iter()
                .filter_map(|key| outputs.iter().find(|output| &output.task == key))
                .map(|output| output.raw.as_str())
                .collect(),
            None => outputs.iter().map(|output| output.raw.as_str()).collect(),
        }
    }
}

/// Builder for constructing crews
pub struct CrewBuilder {
    agents: Vec<Arc<dyn Agent>>,
    tasks: Vec<Task>,
    process: Process,
    verbose: bool,
}

impl CrewBuilder {
    /// Create a new crew builder
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            tasks: Vec::new(),
            process: Process::Sequential,
            verbose: false,
        }
    }

    /// Add an agent to the crew
    pub fn agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add several agents to the crew
    pub fn agents(mut self, agents: impl IntoIterator<Item = Arc<dyn Agent>>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Append a task
    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Append several tasks
    pub fn tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Set the scheduling process
    pub fn process(mut self, process: Process) -> Self {
        self.process = process;
        self
    }

    /// Log task progress at info level
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Build the crew
    ///
    /// Fails when there are no tasks, task keys repeat, a task's agent is not
    /// in the crew, or a task's context names a task that does not run before it.
    pub fn build(self) -> Result<Crew> {
        if self.tasks.is_empty() {
            return Err(Error::InitializationFailed(
                "Crew needs at least one task".to_string(),
            ));
        }

        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (index, task) in self.tasks.iter().enumerate() {
            if positions.insert(task.key(), index).is_some() {
                return Err(Error::InitializationFailed(format!(
                    "Duplicate task '{}'",
                    task.key()
                )));
            }
        }

        for (index, task) in self.tasks.iter().enumerate() {
            let agent_name = task.agent().name();
            if !self.agents.iter().any(|agent| agent.name() == agent_name) {
                return Err(Error::InitializationFailed(format!(
                    "Task '{}' is assigned to agent '{agent_name}' which is not part of the crew",
                    task.key()
                )));
            }

            for key in task.context().unwrap_or_default() {
                match positions.get(key.as_str()) {
                    Some(&position) if position < index => {}
                    Some(_) => {
                        return Err(Error::InitializationFailed(format!(
                            "Task '{}' uses context from task '{key}' which must run before it",
                            task.key()
                        )));
                    }
                    None => {
                        return Err(Error::InitializationFailed(format!(
                            "Task '{}' references unknown context task '{key}'",
                            task.key()
                        )));
                    }
                }
            }
        }

        Ok(Crew {
            agents: self.agents,
            tasks: self.tasks,
            process: self.process,
            verbose: self.verbose,
        })
    }
}

impl Default for CrewBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records prompts and answers with a fixed reply
    struct RecordingAgent {
        name: String,
        reply: String,
        prompts: Mutex<Vec<String>>,
        tasks_seen: Mutex<Vec<String>>,
    }

    impl RecordingAgent {
        fn new(name: &str, reply: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                reply: reply.to_string(),
                prompts: Mutex::default(),
                tasks_seen: Mutex::default(),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Agent for RecordingAgent {
        async fn process(&self, input: String, context: &mut Context) -> Result<String> {
            self.prompts.lock().unwrap().push(input);
            self.tasks_seen
                .lock()
                .unwrap()
                .push(context.task().unwrap_or_default().to_string());
            Ok(self.reply.clone())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    struct FailingAgent;

    #[async_trait]
    impl Agent for FailingAgent {
        async fn process(&self, _input: String, _context: &mut Context) -> Result<String> {
            Err(Error::ProcessingFailed("model unavailable".to_string()))
        }

        fn name(&self) -> &str {
            "Broken"
        }
    }

    fn ticker() -> BTreeMap<String, String> {
        BTreeMap::from([("ticker".to_string(), "NVDA".to_string())])
    }

    #[tokio::test]
    async fn test_sequential_run_passes_all_previous_outputs() {
        let a = RecordingAgent::new("A", "first");
        let b = RecordingAgent::new("B", "second");
        let c = RecordingAgent::new("C", "third");

        let crew = Crew::builder()
            .agents([a.clone() as Arc<dyn Agent>, b.clone(), c.clone()])
            .task(Task::new("one", "Look at {ticker}", "notes", a.clone()))
            .task(Task::new("two", "More on {ticker}", "notes", b.clone()))
            .task(Task::new("three", "Sum up {other}", "verdict", c.clone()))
            .build()
            .unwrap();

        let output = crew.kickoff(&ticker()).await.unwrap();

        assert_eq!(output.raw, "third");
        assert_eq!(output.tasks_output.len(), 3);
        assert_eq!(output.tasks_output[0].description, "Look at NVDA");
        assert_eq!(output.tasks_output[1].agent, "B");

        assert!(!a.prompts()[0].contains("context you're working with"));
        assert!(b.prompts()[0].ends_with("working with:\nfirst"));
        let last = &c.prompts()[0];
        assert!(last.starts_with("Sum up {other}"));
        assert!(last.ends_with("first\n\n----------\n\nsecond"));
        assert_eq!(*c.tasks_seen.lock().unwrap(), vec!["three".to_string()]);
    }

    #[tokio::test]
    async fn test_explicit_context_is_exact_and_ordered() {
        let a = RecordingAgent::new("A", "alpha");
        let b = RecordingAgent::new("B", "beta");
        let d = RecordingAgent::new("D", "done");

        let crew = Crew::builder()
            .agents([a.clone() as Arc<dyn Agent>, b.clone(), d.clone()])
            .task(Task::new("one", "x", "y", a))
            .task(Task::new("two", "x", "y", b))
            .task(Task::new("final", "x", "y", d.clone()).with_context(["two"]))
            .build()
            .unwrap();

        crew.kickoff(&BTreeMap::new()).await.unwrap();

        let prompt = &d.prompts()[0];
        assert!(prompt.ends_with("working with:\nbeta"));
        assert!(!prompt.contains("alpha"));
    }

    #[tokio::test]
    async fn test_task_failure_aborts_run() {
        let a = RecordingAgent::new("A", "first");
        let broken: Arc<dyn Agent> = Arc::new(FailingAgent);

        let crew = Crew::builder()
            .agents([broken.clone(), a.clone()])
            .task(Task::new("bad", "x", "y", broken))
            .task(Task::new("never", "x", "y", a.clone()))
            .build()
            .unwrap();

        let err = crew.kickoff(&BTreeMap::new()).await.unwrap_err();
        assert!(err.to_string().contains("Task 'bad' failed"));
        assert!(a.prompts().is_empty());
    }

    #[test]
    fn test_build_rejects_empty_crew() {
        assert!(Crew::builder().build().is_err());
    }

    #[test]
    fn test_build_rejects_foreign_agent() {
        let a = RecordingAgent::new("A", "x");
        let err = Crew::builder()
            .task(Task::new("one", "x", "y", a))
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("not part of the crew"));
    }

    #[test]
    fn test_build_rejects_forward_and_unknown_context() {
        let a = RecordingAgent::new("A", "x");

        let forward = Crew::builder()
            .agent(a.clone())
            .task(Task::new("one", "x", "y", a.clone()).with_context(["two"]))
            .task(Task::new("two", "x", "y", a.clone()))
            .build()
            .err()
            .unwrap();
        assert!(forward.to_string().contains("must run before it"));

        let unknown = Crew::builder()
            .agent(a.clone())
            .task(Task::new("one", "x", "y", a).with_context(["ghost"]))
            .build()
            .err()
            .unwrap();
        assert!(unknown.to_string().contains("unknown context task 'ghost'"));
    }

    #[test]
    fn test_build_rejects_duplicate_keys() {
        let a = RecordingAgent::new("A", "x");
        let err = Crew::builder()
            .agent(a.clone())
            .task(Task::new("one", "x", "y", a.clone()))
            .task(Task::new("one", "x", "y", a))
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("Duplicate task 'one'"));
    }

    #[test]
    fn test_process_display() {
        assert_eq!(Process::default().to_string(), "sequential");
    }
}
