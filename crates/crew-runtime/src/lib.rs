//! Agent runtime
//!
//! Runtime infrastructure for executing agents: the [`AgentExecutor`] that
//! drives the LLM ⇄ tool loop, the [`AgentRuntime`] that shares the LLM
//! provider and defaults, and the concrete [`ToolAgent`] and [`RoleAgent`].

pub mod agents;
pub mod executor;
pub mod runtime;

pub use agents::{Persona, RoleAgent, ToolAgent};
pub use executor::{
    AgentExecutor, AgentExecutorBuilder, ExecutorConfig, ExecutorEventHandler,
    LoggingEventHandler, NoOpEventHandler,
};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder, RoleAgentOptions, RuntimeConfig};
