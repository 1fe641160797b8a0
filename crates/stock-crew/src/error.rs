//! Error types for the stock crew

use std::path::PathBuf;
use thiserror::Error;

/// Stock crew specific errors
#[derive(Debug, Error)]
pub enum StockCrewError {
    /// A YAML configuration file does not exist
    #[error("Missing config file: {}", path.display())]
    MissingConfigFile {
        /// Path that was looked up
        path: PathBuf,
    },

    /// A YAML configuration file could not be parsed
    #[error("Invalid YAML in {}: {reason}", path.display())]
    InvalidYaml {
        /// Offending file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A task names an agent that is not defined
    #[error("Task '{task}' references unknown agent '{agent}'")]
    UnknownAgent {
        /// Task key
        task: String,
        /// Agent key as written, empty when the field is missing
        agent: String,
    },

    /// A task's context names a task that is not defined
    #[error("Task '{task}' references unknown context task '{context}'")]
    UnknownContextTask {
        /// Task key
        task: String,
        /// Context entry
        context: String,
    },

    /// A task's context names a task that runs later or is the task itself
    #[error("Task '{task}' uses context from task '{context}' which must run before it")]
    ContextNotEarlier {
        /// Task key
        task: String,
        /// Context entry
        context: String,
    },

    /// An agent asks for a tool that does not exist
    #[error("Agent '{agent}' references unknown tool '{tool}'")]
    UnknownTool {
        /// Agent key
        agent: String,
        /// Tool name
        tool: String,
    },

    /// A generator was called with arguments it cannot handle
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Reading a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider could not be created
    #[error("LLM error: {0}")]
    Llm(#[from] crew_llm::LLMError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for stock crew operations
pub type Result<T> = std::result::Result<T, StockCrewError>;

/// Convert StockCrewError to crew_core::Error
impl From<StockCrewError> for crew_core::Error {
    fn from(err: StockCrewError) -> Self {
        match err {
            StockCrewError::InvalidArgument(msg) => crew_core::Error::InvalidArguments(msg),
            other => crew_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

/// Convert crew_core::Error to StockCrewError
impl From<crew_core::Error> for StockCrewError {
    fn from(err: crew_core::Error) -> Self {
        StockCrewError::Other(err.to_string())
    }
}

impl From<crew_utils::EnvError> for StockCrewError {
    fn from(err: crew_utils::EnvError) -> Self {
        StockCrewError::ConfigError(err.to_string())
    }
}
