//! Results of a crew run

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Output of a single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Key of the task that produced the output
    pub task: String,
    /// Name of the agent that handled the task
    pub agent: String,
    /// Interpolated task description
    pub description: String,
    /// The agent's final answer
    pub raw: String,
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Output of a whole crew run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewOutput {
    /// Identifier of the run
    pub run_id: Uuid,
    /// Raw output of the last task
    pub raw: String,
    /// Outputs of every task, in execution order
    pub tasks_output: Vec<TaskOutput>,
}

impl CrewOutput {
    /// Output of the task with the given key
    pub fn task(&self, key: &str) -> Option<&TaskOutput> {
        self.tasks_output.iter().find(|output| output.task == key)
    }
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
