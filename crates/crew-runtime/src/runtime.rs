//! Runtime for creating agents with dependency injection
//!
//! The AgentRuntime holds the shared LLM provider and the default execution
//! settings, and provides factory methods for the agent types.

use crew_core::Result;
use crew_llm::LLMProvider;
use crew_tools::ToolRegistry;
use std::sync::Arc;
use tracing::debug;

use crate::agents::{Persona, RoleAgent, ToolAgent};
use crate::executor::{AgentExecutor, ExecutorConfig, LoggingEventHandler};

/// Configuration for the agent runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Default model to use
    pub default_model: String,

    /// Default maximum iterations for tool-using agents
    pub default_max_iterations: usize,

    /// Default max tokens per completion
    pub default_max_tokens: usize,

    /// Default sampling temperature
    pub default_temperature: Option<f32>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let executor = ExecutorConfig::default();
        Self {
            default_model: executor.model,
            default_max_iterations: executor.max_iterations,
            default_max_tokens: executor.max_tokens,
            default_temperature: executor.temperature,
        }
    }
}

impl RuntimeConfig {
    /// Executor configuration seeded from the runtime defaults
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_iterations: self.default_max_iterations,
            model: self.default_model.clone(),
            system_prompt: None,
            max_tokens: self.default_max_tokens,
            temperature: self.default_temperature,
        }
    }
}

/// Per-agent options for [`AgentRuntime::create_role_agent`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleAgentOptions {
    /// Iteration cap overriding the runtime default
    pub max_iterations: Option<usize>,
    /// Log tool activity at info level
    pub verbose: bool,
    /// Agent was given delegation tools
    pub allow_delegation: bool,
}

/// Runtime for creating agents that share one LLM provider
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    config: RuntimeConfig,
}

impl AgentRuntime {
    /// Create a new agent runtime
    pub fn new(provider: Arc<dyn LLMProvider>, config: RuntimeConfig) -> Self {
        Self { provider, config }
    }

    /// Create a new runtime builder
    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    /// Get a reference to the LLM provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get a reference to the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Create a tool-using agent (with LLM loop and tool execution)
    pub fn create_tool_agent(
        &self,
        config: ExecutorConfig,
        tools: Arc<ToolRegistry>,
        name: impl Into<String>,
    ) -> ToolAgent {
        let executor = AgentExecutor::new(self.provider.clone(), tools, config);
        ToolAgent::new(executor, name)
    }

    /// Create an agent that plays `persona` with its own tools
    pub fn create_role_agent(
        &self,
        persona: Persona,
        tools: Arc<ToolRegistry>,
        options: RoleAgentOptions,
    ) -> RoleAgent {
        let mut config = self.config.executor_config();
        config.system_prompt = Some(persona.system_prompt());
        if let Some(max_iterations) = options.max_iterations {
            config.max_iterations = max_iterations;
        }
        debug!(
            role = %persona.role,
            tools = ?tools.names(),
            max_iterations = config.max_iterations,
            verbose = options.verbose,
            "Creating role agent"
        );

        let mut executor = AgentExecutor::new(self.provider.clone(), tools, config);
        if options.verbose {
            executor =
                executor.with_event_handler(Arc::new(LoggingEventHandler::new(&persona.role)));
        }
        RoleAgent::new(persona, executor).with_delegation(options.allow_delegation)
    }
}

/// Builder for AgentRuntime
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    config: RuntimeConfig,
}

impl AgentRuntimeBuilder {
    /// Create a new runtime builder
    pub fn new() -> Self {
        Self {
            provider: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default model
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    /// Set the default max iterations
    pub fn default_max_iterations(mut self, max: usize) -> Self {
        self.config.default_max_iterations = max;
        self
    }

    /// Set the default max tokens
    pub fn default_max_tokens(mut self, max: usize) -> Self {
        self.config.default_max_tokens = max;
        self
    }

    /// Set the default temperature
    pub fn default_temperature(mut self, temperature: f32) -> Self {
        self.config.default_temperature = Some(temperature);
        self
    }

    /// Build the runtime
    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self.provider.ok_or_else(|| {
            crew_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(AgentRuntime::new(provider, self.config))
    }
}

impl Default for AgentRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crew_core::Agent;
    use crew_llm::{CompletionRequest, CompletionResponse};

    struct NeverCalled;

    #[async_trait]
    impl LLMProvider for NeverCalled {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> crew_llm::Result<CompletionResponse> {
            Err(crew_llm::LLMError::RequestFailed("not scripted".into()))
        }

        fn name(&self) -> &str {
            "never"
        }
    }

    #[test]
    fn test_runtime_builder() {
        let builder = AgentRuntimeBuilder::new()
            .default_max_iterations(5)
            .default_model("test-model")
            .default_max_tokens(512)
            .default_temperature(0.1);

        assert_eq!(builder.config.default_max_iterations, 5);
        assert_eq!(builder.config.default_model, "test-model");
        assert_eq!(builder.config.default_max_tokens, 512);
        assert_eq!(builder.config.default_temperature, Some(0.1));
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_create_role_agent_applies_options() {
        let runtime = AgentRuntime::builder()
            .provider(Arc::new(NeverCalled))
            .default_model("m")
            .default_max_iterations(7)
            .build()
            .unwrap();

        let agent = runtime.create_role_agent(
            Persona::new("Analyst", "goal", "story"),
            Arc::new(ToolRegistry::new()),
            RoleAgentOptions {
                max_iterations: Some(3),
                verbose: true,
                allow_delegation: true,
            },
        );

        let config = agent.executor().config();
        assert_eq!(agent.name(), "Analyst");
        assert!(agent.allows_delegation());
        assert_eq!(config.model, "m");
        assert_eq!(config.max_iterations, 3);
        assert_eq!(
            config.system_prompt.as_deref(),
            Some("You are Analyst. story\nYour personal goal is: goal")
        );
    }

    #[test]
    fn test_create_tool_agent_uses_given_config() {
        let runtime = AgentRuntime::builder()
            .provider(Arc::new(NeverCalled))
            .build()
            .unwrap();
        let config = runtime.config().executor_config();
        let agent = runtime.create_tool_agent(config, Arc::new(ToolRegistry::new()), "plain");

        assert_eq!(agent.name(), "plain");
        assert_eq!(agent.executor().config().max_iterations, 10);
    }
}
