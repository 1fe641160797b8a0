//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// Core trait that all agents must implement
///
/// An agent turns a prompt into an answer. Crew tasks, delegation tools and
/// plain tool-using agents all speak this one interface; the input and output
/// are plain strings so concrete agents decide how to format them.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return output
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    ///
    /// Crew agents use their role as name; delegation looks coworkers up by it.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shouting;

    #[async_trait]
    impl Agent for Shouting {
        async fn process(&self, input: String, context: &mut Context) -> Result<String> {
            context.set_task("shout");
            Ok(input.to_uppercase())
        }

        fn name(&self) -> &str {
            "shouting"
        }
    }

    #[tokio::test]
    async fn test_agent_object_safety() {
        let agent: Box<dyn Agent> = Box::new(Shouting);
        let mut ctx = Context::new();

        let out = agent.process("hello".to_string(), &mut ctx).await.unwrap();
        assert_eq!(out, "HELLO");
        assert_eq!(ctx.task(), Some("shout"));
        assert_eq!(agent.name(), "shouting");
    }
}
