//! Concrete agent implementations
//!
//! - ToolAgent: LLM loop with tool execution
//! - RoleAgent: a ToolAgent speaking as a persona (role, goal, backstory)

pub mod role;
pub mod tool;

pub use role::{Persona, RoleAgent};
pub use tool::ToolAgent;
