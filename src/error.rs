//! Error types for promptforge operations.
//!
//! Defines error types for the major subsystems:
//! - LLM API interactions (chat completion and target-model execution)
//! - Prompt template rendering
//! - Individual optimization stages
//! - LLM-judged scoring
//! - The optimization pipeline
//! - Configuration loading and validation

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("LLM returned no content")]
    EmptyResponse,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Errors that can occur while rendering a prompt template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template placeholder '{{{name}}}' has no value")]
    MissingPlaceholder { name: String },

    #[error("Rendered template is empty")]
    EmptyOutput,
}

/// Errors that can occur inside a single optimization stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Stage '{0}' produced no usable text")]
    EmptyResponse(&'static str),
}

/// Errors that can occur while asking the judge for a score.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Could not parse judge score: {0}")]
    Unparsable(String),
}

/// Errors that abort an optimization run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Pipeline stage '{stage}' failed")]
    StageFailed { stage: &'static str },
}

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
