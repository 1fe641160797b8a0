//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the core agent loop pattern:
//! 1. Call LLM with conversation history and available tools
//! 2. Check stop reason
//! 3. If tool use requested, execute tools and loop back
//! 4. If completed, return final response

use async_trait::async_trait;
use crew_core::Result;
use crew_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, StopReason, TokenUsage,
};
use crew_tools::ToolRegistry;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const FINAL_ANSWER_NUDGE: &str = "You have used all available tool calls. \
     Do not call any more tools: give your best complete final answer now.";

/// Event handler for agent execution events
///
/// Implement this trait to observe tool calls while an agent works.
#[async_trait]
pub trait ExecutorEventHandler: Send + Sync {
    /// Called when a tool execution starts
    async fn on_tool_start(&self, _id: &str, _name: &str, _input: &Value) {}

    /// Called when a tool execution completes
    async fn on_tool_done(
        &self,
        _id: &str,
        _name: &str,
        _result: std::result::Result<&Value, &str>,
        _duration_ms: u64,
    ) {
    }

    /// Called when the agent completes
    async fn on_complete(&self, _result: &str) {}

    /// Called when the LLM call fails and the run is aborted
    async fn on_error(&self, _error: &str) {}
}

/// No-op event handler for when events are not needed
pub struct NoOpEventHandler;

#[async_trait]
impl ExecutorEventHandler for NoOpEventHandler {}

/// Event handler that reports tool activity through `tracing` at info level
///
/// Attached to verbose crew agents.
pub struct LoggingEventHandler {
    agent: String,
}

impl LoggingEventHandler {
    /// Create a handler that tags events with the agent's name
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
        }
    }
}

#[async_trait]
impl ExecutorEventHandler for LoggingEventHandler {
    async fn on_tool_start(&self, _id: &str, name: &str, input: &Value) {
        info!(agent = %self.agent, tool_name = %name, input = %input, "Using tool");
    }

    async fn on_tool_done(
        &self,
        _id: &str,
        name: &str,
        result: std::result::Result<&Value, &str>,
        duration_ms: u64,
    ) {
        match result {
            Ok(value) => {
                let preview: String = value.to_string().chars().take(300).collect();
                info!(agent = %self.agent, tool_name = %name, duration_ms, output = %preview, "Tool finished");
            }
            Err(error) => {
                warn!(agent = %self.agent, tool_name = %name, duration_ms, error = %error, "Tool failed");
            }
        }
    }

    async fn on_complete(&self, result: &str) {
        let preview: String = result.chars().take(300).collect();
        info!(agent = %self.agent, answer = %preview, "Agent finished");
    }

    async fn on_error(&self, error: &str) {
        warn!(agent = %self.agent, error = %error, "Agent failed");
    }
}

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of LLM calls (prevents infinite tool loops)
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.7),
        }
    }
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Arc<dyn ExecutorEventHandler>,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            event_handler: Arc::new(NoOpEventHandler),
        }
    }

    /// Create a builder
    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    /// Set the event handler for receiving execution events
    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = handler;
        self
    }

    /// Get the executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Get the tools this executor offers the LLM
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Execute the agent loop with a user query
    ///
    /// Returns the final response after all tool calls are complete.
    pub async fn run(&self, user_message: String) -> Result<String> {
        self.run_conversation(vec![Message::user(user_message)])
            .await
    }

    async fn run_conversation(&self, initial_conversation: Vec<Message>) -> Result<String> {
        let mut conversation = initial_conversation;
        let mut usage = TokenUsage::default();
        let mut last_text: Option<String> = None;
        let tools = self.tool_registry.definitions();
        let max_iterations = self.config.max_iterations.max(1);

        for iteration in 1..=max_iterations {
            debug!(iteration, max_iterations, tool_count = tools.len(), "Agent iteration started");

            let mut request_builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .system(
                    self.config
                        .system_prompt
                        .clone()
                        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
                )
                .max_tokens(self.config.max_tokens)
                .tools(tools.clone());
            if let Some(temperature) = self.config.temperature {
                request_builder = request_builder.temperature(temperature);
            }

            let response = match self.provider.complete(request_builder.build()).await {
                Ok(response) => response,
                Err(e) => {
                    let error = e.to_string();
                    self.event_handler.on_error(&error).await;
                    return Err(crew_core::Error::ProcessingFailed(error));
                }
            };

            usage += response.usage;
            debug!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let text = response.message.text();
            if text.is_some() {
                last_text.clone_from(&text);
            }
            let wants_tools =
                response.stop_reason == StopReason::ToolUse || response.message.has_tool_uses();
            conversation.push(response.message.clone());

            if !wants_tools {
                if response.stop_reason == StopReason::MaxTokens {
                    warn!("Hit max tokens in LLM response");
                }
                let text = text.unwrap_or_default();
                info!(
                    iterations = iteration,
                    total_tokens = usage.total(),
                    response_length = text.len(),
                    "Agent completed"
                );
                self.event_handler.on_complete(&text).await;
                return Ok(text);
            }

            let mut results = self.execute_tools(&response.message).await;
            if results.is_empty() {
                warn!("Tool use stop reason without tool calls");
                return Ok(text.unwrap_or_default());
            }
            if iteration + 1 == max_iterations {
                results.push(ContentBlock::Text {
                    text: FINAL_ANSWER_NUDGE.to_string(),
                });
            }
            conversation.push(Message::tool_results(results));
        }

        warn!(max_iterations, "Max iterations reached, returning last answer");
        let text = last_text.unwrap_or_else(|| "Max iterations reached without completion".to_string());
        self.event_handler.on_complete(&text).await;
        Ok(text)
    }

    /// Execute tool calls from an assistant message
    ///
    /// Unknown tools and tool failures become error results for the LLM to
    /// react to; they never abort the loop.
    async fn execute_tools(&self, message: &Message) -> Vec<ContentBlock> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            self.event_handler.on_tool_start(id, name, input).await;
            let start = Instant::now();

            let Some(tool) = self.tool_registry.get(name) else {
                let error = format!(
                    "Error: tool '{name}' does not exist. Available tools: {}",
                    self.tool_registry.names().join(", ")
                );
                warn!(tool_name = %name, "LLM requested an unknown tool");
                self.event_handler.on_tool_done(id, name, Err(&error), 0).await;
                results.push(ContentBlock::tool_error(id.clone(), error));
                continue;
            };

            let outcome = tool.execute(input.clone()).await;
            let duration_ms = start.elapsed().as_millis() as u64;
            match outcome {
                Ok(result) => {
                    let result_str = result.to_string();
                    debug!(
                        tool_name = %name,
                        duration_ms,
                        result_length = result_str.len(),
                        "Tool execution succeeded"
                    );
                    self.event_handler
                        .on_tool_done(id, name, Ok(&result), duration_ms)
                        .await;
                    results.push(ContentBlock::tool_result(id.clone(), result_str));
                }
                Err(e) => {
                    let error = format!("Error: {e}");
                    warn!(tool_name = %name, duration_ms, error = %e, "Tool execution failed");
                    self.event_handler
                        .on_tool_done(id, name, Err(&error), duration_ms)
                        .await;
                    results.push(ContentBlock::tool_error(id.clone(), error));
                }
            }
        }

        results
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
            event_handler: None,
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set the event handler
    pub fn event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self.provider.ok_or_else(|| {
            crew_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        let executor = AgentExecutor::new(provider, self.tool_registry, self.config);
        Ok(match self.event_handler {
            Some(handler) => executor.with_event_handler(handler),
            None => executor,
        })
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_llm::{CompletionResponse, LLMError};
    use crew_tools::Tool;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every request
    #[derive(Default)]
    struct ScriptedProvider {
        responses: Mutex<VecDeque<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<CompletionResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::default(),
            }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> crew_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LLMError::RequestFailed("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn answer(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            },
        }
    }

    fn call(id: &str, name: &str, input: Value) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant_blocks(vec![ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            }]),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    struct Doubler;

    #[async_trait]
    impl Tool for Doubler {
        async fn execute(&self, params: Value) -> crew_core::Result<Value> {
            let x = params["x"]
                .as_f64()
                .ok_or_else(|| crew_core::Error::InvalidArguments("x must be a number".into()))?;
            Ok(json!(x * 2.0))
        }

        fn name(&self) -> &str {
            "double"
        }

        fn description(&self) -> &str {
            "Doubles x"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"x": {"type": "number"}}, "required": ["x"]})
        }
    }

    fn executor(provider: Arc<ScriptedProvider>, max_iterations: usize) -> AgentExecutor {
        AgentExecutor::builder()
            .provider(provider)
            .tool_registry(Arc::new(ToolRegistry::with_tools([
                Arc::new(Doubler) as Arc<dyn Tool>
            ])))
            .max_iterations(max_iterations)
            .system_prompt("You are a calculator")
            .build()
            .unwrap()
    }

    fn tool_result_blocks(request: &CompletionRequest) -> Vec<ContentBlock> {
        match &request.messages.last().unwrap().content {
            Some(crew_llm::MessageContent::Blocks(blocks)) => blocks.clone(),
            other => panic!("expected blocks, got {other:?}"),
        }
    }

    #[test]
    fn test_builder() {
        let builder = AgentExecutorBuilder::new()
            .model("test-model")
            .max_iterations(5)
            .system_prompt("Test prompt");

        assert_eq!(builder.config.model, "test-model");
        assert_eq!(builder.config.max_iterations, 5);
        assert_eq!(builder.config.system_prompt.as_deref(), Some("Test prompt"));
        assert!(builder.build().is_err());
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![answer("42")]));
        let exec = executor(provider.clone(), 3);

        assert_eq!(exec.run("what?".to_string()).await.unwrap(), "42");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some("You are a calculator"));
        assert_eq!(requests[0].tools.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            call("c1", "double", json!({"x": 21})),
            answer("The answer is 42"),
        ]));
        let exec = executor(provider.clone(), 5);

        let out = exec.run("double 21".to_string()).await.unwrap();
        assert_eq!(out, "The answer is 42");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            tool_result_blocks(&requests[1]),
            vec![ContentBlock::tool_result("c1", "42.0")]
        );
    }

    #[tokio::test]
    async fn test_tool_errors_are_reported_to_llm() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            call("c1", "double", json!({"x": "nope"})),
            call("c2", "triple", json!({"x": 1})),
            answer("gave up"),
        ]));
        let exec = executor(provider.clone(), 5);

        assert_eq!(exec.run("go".to_string()).await.unwrap(), "gave up");

        let requests = provider.requests();
        let first = tool_result_blocks(&requests[1]);
        assert!(matches!(
            &first[0],
            ContentBlock::ToolResult { is_error: Some(true), content, .. } if content.contains("x must be a number")
        ));
        let second = tool_result_blocks(&requests[2]);
        assert!(matches!(
            &second[0],
            ContentBlock::ToolResult { is_error: Some(true), content, .. } if content.contains("does not exist")
        ));
    }

    #[tokio::test]
    async fn test_max_iterations_nudges_then_stops() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            call("c1", "double", json!({"x": 1})),
            call("c2", "double", json!({"x": 2})),
        ]));
        let exec = executor(provider.clone(), 2);

        let out = exec.run("loop".to_string()).await.unwrap();
        assert_eq!(out, "Max iterations reached without completion");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        let blocks = tool_result_blocks(&requests[1]);
        assert!(matches!(blocks.last(), Some(ContentBlock::Text { text }) if text == FINAL_ANSWER_NUDGE));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let exec = executor(provider, 2);

        let err = exec.run("hi".to_string()).await.unwrap_err();
        assert!(err.to_string().contains("script exhausted"));
    }
}
