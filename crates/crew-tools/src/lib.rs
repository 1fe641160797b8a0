//! Tool management and execution framework
//!
//! Tools are the functions an LLM agent may call. Each tool exposes a name, a
//! description and a JSON schema; a [`ToolRegistry`] holds the tools one
//! agent is allowed to use.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, parse_args};
