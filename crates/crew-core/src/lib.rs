//! Core abstractions for crew agents
//!
//! This crate defines the fundamental traits and types shared by every crate
//! in the workspace: the [`Agent`] trait, the execution [`Context`] handed to
//! agents while a crew runs, and the core [`Error`] type.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
