//! Multi-agent orchestration for crews
//!
//! A [`Crew`] runs [`Task`]s one after another, each handled by one agent,
//! and feeds earlier task outputs to later tasks as context. Agents that
//! allow delegation get the tools from [`delegation`] to hand work to
//! coworkers.

pub mod crew;
pub mod delegation;
pub mod output;
pub mod task;

pub use crew::{Crew, CrewBuilder, Process};
pub use delegation::{AskQuestionTool, DelegateWorkTool, delegation_tools};
pub use output::{CrewOutput, TaskOutput};
pub use task::{Task, interpolate_inputs};
