//! Settings for a stock crew run

use crate::error::{Result, StockCrewError};
use crew_utils::{env_parse, env_string};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File holding the agent definitions
pub const AGENTS_FILE: &str = "agents.yaml";

/// File holding the task definitions
pub const TASKS_FILE: &str = "tasks.yaml";

/// Which LLM API the crew talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// OpenAI chat completions or any compatible server
    #[default]
    OpenAI,
    /// Anthropic messages API
    Anthropic,
}

impl LlmProviderKind {
    /// Model used when none is configured
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4o-mini",
            Self::Anthropic => "claude-sonnet-4-5-20250929",
        }
    }

    /// Highest sampling temperature the API accepts
    pub fn max_temperature(self) -> f32 {
        match self {
            Self::OpenAI => 2.0,
            Self::Anthropic => 1.0,
        }
    }
}

impl fmt::Display for LlmProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => f.write_str("openai"),
            Self::Anthropic => f.write_str("anthropic"),
        }
    }
}

impl FromStr for LlmProviderKind {
    type Err = StockCrewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(StockCrewError::ConfigError(format!(
                "unknown LLM provider '{other}', expected 'openai' or 'anthropic'"
            ))),
        }
    }
}

/// Directory with the YAML definitions shipped with the crate
pub fn default_config_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/config"))
}

/// Settings for building and running the stock crew
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockCrewSettings {
    /// LLM API to use
    pub provider: LlmProviderKind,

    /// Model identifier
    pub model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum LLM calls per task unless an agent sets `max_iter`
    pub max_iterations: usize,

    /// Directory holding `agents.yaml` and `tasks.yaml`
    pub config_dir: PathBuf,

    /// Seed for the mock market data; `None` draws from OS entropy
    pub seed: Option<u64>,

    /// Log task progress at info level
    pub verbose: bool,
}

impl Default for StockCrewSettings {
    fn default() -> Self {
        let provider = LlmProviderKind::default();
        Self {
            provider,
            model: provider.default_model().to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            max_iterations: 15,
            config_dir: default_config_dir(),
            seed: None,
            verbose: true,
        }
    }
}

impl StockCrewSettings {
    /// Create a new settings builder
    pub fn builder() -> StockCrewSettingsBuilder {
        StockCrewSettingsBuilder::default()
    }

    /// Settings from `CREW_LLM_PROVIDER`, `CREW_MODEL`, `CREW_CONFIG_DIR` and `CREW_SEED`
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Path of the agent definitions
    pub fn agents_path(&self) -> PathBuf {
        self.config_dir.join(AGENTS_FILE)
    }

    /// Path of the task definitions
    pub fn tasks_path(&self) -> PathBuf {
        self.config_dir.join(TASKS_FILE)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(StockCrewError::ConfigError(
                "model must not be empty".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(StockCrewError::ConfigError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.max_iterations == 0 {
            return Err(StockCrewError::ConfigError(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        let max_temperature = self.provider.max_temperature();
        if !(0.0..=max_temperature).contains(&self.temperature) {
            return Err(StockCrewError::ConfigError(format!(
                "temperature must be between 0 and {max_temperature} for {}, got {}",
                self.provider, self.temperature
            )));
        }

        Ok(())
    }
}

/// Builder for StockCrewSettings
#[derive(Debug, Default)]
pub struct StockCrewSettingsBuilder {
    provider: Option<LlmProviderKind>,
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    max_iterations: Option<usize>,
    config_dir: Option<PathBuf>,
    seed: Option<u64>,
    verbose: Option<bool>,
}

impl StockCrewSettingsBuilder {
    /// Set the LLM provider
    pub fn provider(mut self, provider: LlmProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the per-task iteration cap
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Set the directory holding the YAML definitions
    pub fn config_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Seed the mock market data
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set crew verbosity
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Fill unset fields from the environment
    ///
    /// Values already set on the builder win over the environment.
    pub fn with_env(mut self) -> Result<Self> {
        if self.provider.is_none() {
            self.provider = env_string("CREW_LLM_PROVIDER")
                .map(|value| value.parse())
                .transpose()?;
        }
        if self.model.is_none() {
            self.model = env_string("CREW_MODEL");
        }
        if self.config_dir.is_none() {
            self.config_dir = env_string("CREW_CONFIG_DIR").map(PathBuf::from);
        }
        if self.seed.is_none() {
            self.seed = env_parse("CREW_SEED")?;
        }
        Ok(self)
    }

    /// Build and validate the settings
    pub fn build(self) -> Result<StockCrewSettings> {
        let defaults = StockCrewSettings::default();
        let provider = self.provider.unwrap_or(defaults.provider);

        let settings = StockCrewSettings {
            provider,
            model: self
                .model
                .unwrap_or_else(|| provider.default_model().to_string()),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            config_dir: self.config_dir.unwrap_or(defaults.config_dir),
            seed: self.seed,
            verbose: self.verbose.unwrap_or(defaults.verbose),
        };

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = StockCrewSettings::default();
        assert_eq!(settings.provider, LlmProviderKind::OpenAI);
        assert_eq!(settings.model, "gpt-4o-mini");
        assert!(settings.verbose);
        assert!(settings.agents_path().ends_with("config/agents.yaml"));
        assert!(settings.tasks_path().ends_with("config/tasks.yaml"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_builder_picks_provider_default_model() {
        let settings = StockCrewSettings::builder()
            .provider(LlmProviderKind::Anthropic)
            .seed(7)
            .config_dir("/etc/crew")
            .build()
            .unwrap();

        assert_eq!(settings.model, "claude-sonnet-4-5-20250929");
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.tasks_path(), PathBuf::from("/etc/crew/tasks.yaml"));
    }

    #[test]
    fn test_validation_errors() {
        assert!(StockCrewSettings::builder().max_tokens(0).build().is_err());
        assert!(StockCrewSettings::builder().max_iterations(0).build().is_err());
        assert!(StockCrewSettings::builder().temperature(2.5).build().is_err());
        assert!(StockCrewSettings::builder().model("  ").build().is_err());
        assert!(StockCrewSettings::builder().temperature(0.0).build().is_ok());
    }

    #[test]
    fn test_temperature_bound_depends_on_provider() {
        assert!(StockCrewSettings::builder().temperature(1.5).build().is_ok());

        let err = StockCrewSettings::builder()
            .provider(LlmProviderKind::Anthropic)
            .temperature(1.5)
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: temperature must be between 0 and 1 for anthropic, got 1.5"
        );
        assert!(
            StockCrewSettings::builder()
                .provider(LlmProviderKind::Anthropic)
                .temperature(1.0)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("OpenAI".parse::<LlmProviderKind>().unwrap(), LlmProviderKind::OpenAI);
        assert_eq!(" anthropic ".parse::<LlmProviderKind>().unwrap(), LlmProviderKind::Anthropic);
        assert!("gemini".parse::<LlmProviderKind>().is_err());
        assert_eq!(LlmProviderKind::Anthropic.to_string(), "anthropic");
    }
}
