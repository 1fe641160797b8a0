//! Shared utilities for the crew workspace
//!
//! Logging setup and helpers for reading configuration from the environment.

pub mod config;
pub mod logging;

pub use config::{EnvError, env_parse, env_string};
pub use logging::{init_tracing, init_tracing_with_default};
