//! Execution context for agents
//!
//! A [`Context`] travels with every agent call made while a crew runs. It is a
//! small key-value store holding the crew run id, the key of the task being
//! executed and the kickoff inputs (for example the ticker symbol).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Well-known context keys
pub mod keys {
    /// Unique id of the crew run
    pub const RUN_ID: &str = "run_id";
    /// Key of the task currently executing
    pub const TASK: &str = "task";
    /// Kickoff inputs (object of string values)
    pub const INPUTS: &str = "inputs";
    /// Role of the agent that delegated the current request, if any
    pub const DELEGATED_BY: &str = "delegated_by";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use crew_core::Context;
///
/// let ctx = Context::new()
///     .with_run_id("run-1")
///     .with_input("ticker", "AAPL");
///
/// assert_eq!(ctx.run_id(), Some("run-1"));
/// assert_eq!(ctx.input("ticker"), Some("AAPL"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    // =========== Builder Methods ===========

    /// Set the crew run id
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.insert(keys::RUN_ID, serde_json::json!(run_id.into()));
        self
    }

    /// Add a single kickoff input
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_input(name, value);
        self
    }

    /// Replace all kickoff inputs
    pub fn with_inputs(mut self, inputs: &BTreeMap<String, String>) -> Self {
        self.insert(keys::INPUTS, serde_json::json!(inputs));
        self
    }

    // =========== Common Accessors ===========

    /// Get the crew run id
    pub fn run_id(&self) -> Option<&str> {
        self.get(keys::RUN_ID).and_then(|v| v.as_str())
    }

    /// Get the key of the task being executed
    pub fn task(&self) -> Option<&str> {
        self.get(keys::TASK).and_then(|v| v.as_str())
    }

    /// Set the key of the task being executed
    pub fn set_task(&mut self, task: impl Into<String>) {
        self.insert(keys::TASK, serde_json::json!(task.into()));
    }

    /// Get the role of the delegating agent
    pub fn delegated_by(&self) -> Option<&str> {
        self.get(keys::DELEGATED_BY).and_then(|v| v.as_str())
    }

    /// Record which agent delegated the current request
    pub fn set_delegated_by(&mut self, role: impl Into<String>) {
        self.insert(keys::DELEGATED_BY, serde_json::json!(role.into()));
    }

    /// Get one kickoff input
    pub fn input(&self, name: &str) -> Option<&str> {
        self.get(keys::INPUTS)
            .and_then(|inputs| inputs.get(name))
            .and_then(|v| v.as_str())
    }

    /// Set one kickoff input, keeping the others
    pub fn set_input(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let entry = self
            .data
            .entry(keys::INPUTS.to_string())
            .or_insert_with(|| serde_json::json!({}));
        if !entry.is_object() {
            *entry = serde_json::json!({});
        }
        if let Some(map) = entry.as_object_mut() {
            map.insert(name.into(), serde_json::json!(value.into()));
        }
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        self.data
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })
            })
            .transpose()
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Get the number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
