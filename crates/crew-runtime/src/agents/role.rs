//! Role-playing agent with a persona

use crate::executor::AgentExecutor;
use async_trait::async_trait;
use crew_core::{Agent, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info_span};

/// Who an agent is: role, goal and backstory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Short role title, also used as the agent's name
    pub role: String,
    /// What the agent is trying to achieve
    pub goal: String,
    /// Background that shapes the agent's answers
    pub backstory: String,
}

impl Persona {
    /// Create a persona
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// System prompt the persona is played with
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

/// An agent that plays a [`Persona`] and owns its own tools
///
/// The executor it wraps must have been configured with the persona's
/// system prompt; [`AgentRuntime::create_role_agent`](crate::AgentRuntime::create_role_agent)
/// takes care of that.
pub struct RoleAgent {
    persona: Persona,
    executor: AgentExecutor,
    allows_delegation: bool,
}

impl RoleAgent {
    /// Create a role agent from a persona and a configured executor
    pub fn new(persona: Persona, executor: AgentExecutor) -> Self {
        Self {
            persona,
            executor,
            allows_delegation: false,
        }
    }

    /// Mark the agent as able to delegate to coworkers
    pub fn with_delegation(mut self, allows_delegation: bool) -> Self {
        self.allows_delegation = allows_delegation;
        self
    }

    /// The agent's persona
    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// The agent's role
    pub fn role(&self) -> &str {
        &self.persona.role
    }

    /// Whether the agent was given delegation tools
    pub fn allows_delegation(&self) -> bool {
        self.allows_delegation
    }

    /// Names of the tools this agent can call
    pub fn tool_names(&self) -> Vec<String> {
        self.executor.tools().names()
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for RoleAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        let span = info_span!(
            "agent",
            agent = %self.persona.role,
            task = context.task().unwrap_or("-"),
            delegated_by = context.delegated_by().unwrap_or("-"),
        );
        self.executor.run(input).instrument(span).await
    }

    fn name(&self) -> &str {
        &self.persona.role
    }
}
