//! promptforge: iterative prompt optimization for small language models.
//!
//! An optimizer LLM rewrites, critiques and refines a prompt, generates
//! variants of it, and every candidate is executed against a target model
//! and scored to surface the best one.

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod scoring;
pub mod stages;
pub mod utils;

// Re-export commonly used types
pub use config::{ChatConfig, OptimizerConfig, RunnerConfig, ScoringMode};
pub use error::{ConfigError, LlmError, PipelineError, ScoringError, StageError, TemplateError};
pub use pipeline::{OptimizationResult, PromptOptimizer, TaskSpec};
