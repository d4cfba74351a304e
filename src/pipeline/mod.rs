//! Prompt-optimization pipeline.
//!
//! # Architecture
//!
//! - **Orchestrator**: [`PromptOptimizer`] sequences the stages, runs every
//!   candidate against the target model and scores the outputs
//! - **Types**: the run input ([`TaskSpec`]), per-run state
//!   ([`OptimizationContext`]) and the result ([`OptimizationResult`])
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use promptforge::config::{ChatConfig, OptimizerConfig, RunnerConfig};
//! use promptforge::llm::{LiteLlmClient, OllamaClient};
//! use promptforge::pipeline::PromptOptimizer;
//!
//! let provider = Arc::new(LiteLlmClient::new(ChatConfig::from_env()?)?);
//! let runner = Arc::new(OllamaClient::new(RunnerConfig::from_env()?)?);
//! let optimizer = PromptOptimizer::new(provider, runner, OptimizerConfig::default());
//!
//! let result = optimizer
//!     .optimize_prompt(
//!         "Translate text from Chinese to English",
//!         "Please translate the following text to English:",
//!         Some("我很喜歡在公園裡散步"),
//!     )
//!     .await;
//!
//! if let Some((prompt, score)) = result.best_prompt() {
//!     println!("{score:.1}: {prompt}");
//! }
//! ```

pub mod orchestrator;
pub mod types;

pub use orchestrator::{best_prompt_response, PromptOptimizer};
pub use types::{OptimizationContext, OptimizationResult, TaskSpec};
