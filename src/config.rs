//! Configuration for the LLM clients and the optimization pipeline.
//!
//! Three independent configurations are used:
//! - [`ChatConfig`] for the chat-completion endpoint driving the optimizer stages
//! - [`RunnerConfig`] for the local model server that executes candidate prompts
//! - [`OptimizerConfig`] for the pipeline itself
//!
//! Each has `Default`, `from_env()`, builder setters and `validate()`.
//! [`OptimizerConfig`] can additionally be read from a YAML file.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::prompts::THINKING_STYLES;

/// Default chat model used when `LITELLM_DEFAULT_MODEL` is not set.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Default completion token limit for optimizer calls.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Default address of the local model server.
pub const DEFAULT_RUNNER_HOST: &str = "http://localhost:11434";

/// Default target model candidates are executed against.
pub const DEFAULT_TARGET_MODEL: &str = "llama3.2";

/// Configuration for the OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Base URL of the API (e.g. "http://localhost:4000").
    pub api_base: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Model used when a request does not name one.
    pub model: String,
    /// Completion token limit applied when a request does not set one.
    pub max_tokens: u32,
    /// HTTP request timeout.
    pub request_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl ChatConfig {
    /// Creates a configuration for the given endpoint and model.
    pub fn new(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LITELLM_API_BASE`: Base URL for the API (required)
    /// - `LITELLM_API_KEY`: API key (optional)
    /// - `LITELLM_DEFAULT_MODEL`: Default model (default: gpt-4o-mini)
    /// - `PROMPTFORGE_MAX_TOKENS`: Completion token limit (default: 2048)
    /// - `PROMPTFORGE_REQUEST_TIMEOUT_SECS`: HTTP timeout (default: 120)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        config.api_base = lookup("LITELLM_API_BASE")
            .ok_or_else(|| ConfigError::MissingEnvVar("LITELLM_API_BASE".to_string()))?;
        config.api_key = lookup("LITELLM_API_KEY").filter(|key| !key.is_empty());

        if let Some(val) = lookup("LITELLM_DEFAULT_MODEL") {
            config.model = val;
        }
        if let Some(val) = lookup("PROMPTFORGE_MAX_TOKENS") {
            config.max_tokens = parse_env_value(&val, "PROMPTFORGE_MAX_TOKENS")?;
        }
        if let Some(val) = lookup("PROMPTFORGE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "PROMPTFORGE_REQUEST_TIMEOUT_SECS")?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the completion token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "api_base cannot be empty".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "model cannot be empty".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "request_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the local model server that executes candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Base URL of the server.
    pub host: String,
    /// Remove `<think>...</think>` blocks from outputs.
    pub strip_reasoning: bool,
    /// HTTP request timeout.
    pub request_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RUNNER_HOST.to_string(),
            strip_reasoning: true,
            request_timeout: Duration::from_secs(300),
        }
    }
}

impl RunnerConfig {
    /// Creates a configuration pointing at `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OLLAMA_HOST`: Server URL (default: http://localhost:11434)
    /// - `PROMPTFORGE_STRIP_REASONING`: Strip reasoning blocks (default: true)
    /// - `PROMPTFORGE_RUNNER_TIMEOUT_SECS`: HTTP timeout (default: 300)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(val) = lookup("OLLAMA_HOST") {
            config.host = val;
        }
        if let Some(val) = lookup("PROMPTFORGE_STRIP_REASONING") {
            config.strip_reasoning = parse_env_bool(&val, "PROMPTFORGE_STRIP_REASONING")?;
        }
        if let Some(val) = lookup("PROMPTFORGE_RUNNER_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "PROMPTFORGE_RUNNER_TIMEOUT_SECS")?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set whether reasoning blocks are stripped.
    pub fn with_strip_reasoning(mut self, strip: bool) -> Self {
        self.strip_reasoning = strip;
        self
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "host cannot be empty".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "request_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// How candidate outputs are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Heuristic for every candidate, judge re-scores the top performers.
    #[default]
    Hybrid,
    /// Heuristic only; no judge calls.
    Heuristic,
}

impl FromStr for ScoringMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hybrid" => Ok(ScoringMode::Hybrid),
            "heuristic" => Ok(ScoringMode::Heuristic),
            other => Err(ConfigError::InvalidValue {
                key: "scoring_mode".to_string(),
                message: format!("expected 'hybrid' or 'heuristic', got '{}'", other),
            }),
        }
    }
}

impl std::fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringMode::Hybrid => write!(f, "hybrid"),
            ScoringMode::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Configuration for the optimization pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Model candidates are executed against.
    pub target_model: String,
    /// Variations requested per generate-variants call.
    pub num_variations: usize,
    /// Refined prompts requested from the refine stage.
    pub steps_per_sample: usize,
    /// Number of thinking styles primed into generate-variants.
    pub thinking_styles: usize,
    /// Candidates re-scored by the judge in hybrid mode.
    pub judge_top_k: usize,
    /// Scoring policy.
    pub scoring_mode: ScoringMode,
    /// Sampling temperature for optimizer stages.
    pub stage_temperature: f64,
    /// Sampling temperature for judge calls.
    pub judge_temperature: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            target_model: DEFAULT_TARGET_MODEL.to_string(),
            num_variations: 5,
            steps_per_sample: 3,
            thinking_styles: 10,
            judge_top_k: 2,
            scoring_mode: ScoringMode::Hybrid,
            stage_temperature: 0.7,
            judge_temperature: 0.0,
        }
    }
}

impl OptimizerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PROMPTFORGE_TARGET_MODEL`: Target model (default: llama3.2)
    /// - `PROMPTFORGE_NUM_VARIATIONS`: Variations per call (default: 5)
    /// - `PROMPTFORGE_STEPS_PER_SAMPLE`: Refined prompts per refine (default: 3)
    /// - `PROMPTFORGE_THINKING_STYLES`: Thinking styles primed (default: 10)
    /// - `PROMPTFORGE_JUDGE_TOP_K`: Judge-scored candidates (default: 2)
    /// - `PROMPTFORGE_SCORING_MODE`: `hybrid` or `heuristic` (default: hybrid)
    /// - `PROMPTFORGE_STAGE_TEMPERATURE`: Stage temperature (default: 0.7)
    /// - `PROMPTFORGE_JUDGE_TEMPERATURE`: Judge temperature (default: 0.0)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Applies environment variable overrides on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(val) = lookup("PROMPTFORGE_TARGET_MODEL") {
            self.target_model = val;
        }
        if let Some(val) = lookup("PROMPTFORGE_NUM_VARIATIONS") {
            self.num_variations = parse_env_value(&val, "PROMPTFORGE_NUM_VARIATIONS")?;
        }
        if let Some(val) = lookup("PROMPTFORGE_STEPS_PER_SAMPLE") {
            self.steps_per_sample = parse_env_value(&val, "PROMPTFORGE_STEPS_PER_SAMPLE")?;
        }
        if let Some(val) = lookup("PROMPTFORGE_THINKING_STYLES") {
            self.thinking_styles = parse_env_value(&val, "PROMPTFORGE_THINKING_STYLES")?;
        }
        if let Some(val) = lookup("PROMPTFORGE_JUDGE_TOP_K") {
            self.judge_top_k = parse_env_value(&val, "PROMPTFORGE_JUDGE_TOP_K")?;
        }
        if let Some(val) = lookup("PROMPTFORGE_SCORING_MODE") {
            self.scoring_mode = val.parse()?;
        }
        if let Some(val) = lookup("PROMPTFORGE_STAGE_TEMPERATURE") {
            self.stage_temperature = parse_env_value(&val, "PROMPTFORGE_STAGE_TEMPERATURE")?;
        }
        if let Some(val) = lookup("PROMPTFORGE_JUDGE_TEMPERATURE") {
            self.judge_temperature = parse_env_value(&val, "PROMPTFORGE_JUDGE_TEMPERATURE")?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "target_model cannot be empty".to_string(),
            ));
        }
        if self.num_variations == 0 {
            return Err(ConfigError::ValidationFailed(
                "num_variations must be greater than 0".to_string(),
            ));
        }
        if self.steps_per_sample == 0 {
            return Err(ConfigError::ValidationFailed(
                "steps_per_sample must be greater than 0".to_string(),
            ));
        }
        if self.thinking_styles == 0 || self.thinking_styles > THINKING_STYLES.len() {
            return Err(ConfigError::ValidationFailed(format!(
                "thinking_styles must be between 1 and {}",
                THINKING_STYLES.len()
            )));
        }
        if !(0.0..=2.0).contains(&self.stage_temperature) {
            return Err(ConfigError::ValidationFailed(
                "stage_temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.judge_temperature) {
            return Err(ConfigError::ValidationFailed(
                "judge_temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        Ok(())
    }

    /// Builder method to set the target model.
    pub fn with_target_model(mut self, model: impl Into<String>) -> Self {
        self.target_model = model.into();
        self
    }

    /// Builder method to set variations per call.
    pub fn with_num_variations(mut self, n: usize) -> Self {
        self.num_variations = n;
        self
    }

    /// Builder method to set refined prompts per refine call.
    pub fn with_steps_per_sample(mut self, n: usize) -> Self {
        self.steps_per_sample = n;
        self
    }

    /// Builder method to set the number of judge-scored candidates.
    pub fn with_judge_top_k(mut self, k: usize) -> Self {
        self.judge_top_k = k;
        self
    }

    /// Builder method to set the scoring mode.
    pub fn with_scoring_mode(mut self, mode: ScoringMode) -> Self {
        self.scoring_mode = mode;
        self
    }

    /// Builder method to set the stage temperature.
    pub fn with_stage_temperature(mut self, temperature: f64) -> Self {
        self.stage_temperature = temperature;
        self
    }
}

/// Parse an environment variable value into the target type.
fn parse_env_value<T: FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}

/// Parse an environment variable as a boolean.
fn parse_env_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected boolean value, got '{}'", value),
        }),
    }
}
