//! Task definition and prompt rendering

use crew_core::Agent;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

const CONTEXT_DIVIDER: &str = "\n\n----------\n\n";

/// A unit of work handled by one agent
#[derive(Clone)]
pub struct Task {
    key: String,
    description: String,
    expected_output: String,
    agent: Arc<dyn Agent>,
    context: Option<Vec<String>>,
}

impl Task {
    /// Create a task with no explicit context
    pub fn new(
        key: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<dyn Agent>,
    ) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            context: None,
        }
    }

    /// Restrict the task's context to the outputs of the named tasks
    pub fn with_context(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.context = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Unique task key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Task description (may contain `{input}` placeholders)
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Criteria for the final answer
    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    /// The agent that handles the task
    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    /// Explicit context task keys; `None` means every earlier task
    pub fn context(&self) -> Option<&[String]> {
        self.context.as_deref()
    }

    /// Render the prompt sent to the agent
    ///
    /// `description` and `expected_output` are passed in already interpolated.
    pub(crate) fn prompt(description: &str, expected_output: &str, context: &[&str]) -> String {
        let mut prompt = format!(
            "{description}\n\nThis is the expected criteria for your final answer: \
             {expected_output}\nyou MUST return the actual complete content as the final \
             answer, not a summary."
        );
        if !context.is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(&context.join(CONTEXT_DIVIDER));
        }
        prompt
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("key", &self.key)
            .field("agent", &self.agent.name())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Replace `{name}` with the value of each provided input
///
/// Placeholders without a matching input and any other braces are left as is.
pub fn interpolate_inputs(template: &str, inputs: &BTreeMap<String, String>) -> String {
    inputs
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}
