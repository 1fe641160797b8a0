//! Tool agent implementation (wraps AgentExecutor)

use crate::executor::AgentExecutor;
use async_trait::async_trait;
use crew_core::{Agent, Context, Result};

/// An agent that runs the LLM loop with tool execution under a plain name
///
/// Unlike [`RoleAgent`](crate::RoleAgent) it carries no persona: the system
/// prompt is whatever the executor was configured with.
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
}

impl ToolAgent {
    /// Create a new tool agent
    pub fn new(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
        }
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
        self.executor.run(input).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_llm::{
        CompletionRequest, CompletionResponse, LLMProvider, Message, StopReason, TokenUsage,
    };
    use std::sync::Arc;

    struct EchoProvider;

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> crew_llm::Result<CompletionResponse> {
            let last = request
                .messages
                .last()
                .and_then(Message::text)
                .unwrap_or_default();
            Ok(CompletionResponse {
                message: Message::assistant(format!("echo: {last}")),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_tool_agent_process() {
        let executor = AgentExecutor::builder()
            .provider(Arc::new(EchoProvider))
            .build()
            .unwrap();
        let agent = ToolAgent::new(executor, "echoer");

        assert_eq!(agent.name(), "echoer");
        let mut context = Context::new();
        let out = agent.process("ping".to_string(), &mut context).await.unwrap();
        assert_eq!(out, "echo: ping");
    }
}
