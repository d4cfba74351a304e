//! LLM integration for promptforge.
//!
//! The pipeline depends on two capabilities, both injected as trait objects:
//!
//! - [`LlmProvider`] - chat completion, used by the optimizer stages and
//!   the judge. [`LiteLlmClient`] implements it for any OpenAI-compatible
//!   endpoint.
//! - [`ModelRunner`] - executes a candidate prompt against the target model.
//!   [`OllamaClient`] talks to a local model server; [`ProviderRunner`]
//!   adapts any `LlmProvider`.
//!
//! ```ignore
//! use std::sync::Arc;
//! use promptforge::config::{ChatConfig, RunnerConfig};
//! use promptforge::llm::{LiteLlmClient, OllamaClient};
//!
//! let chat = Arc::new(LiteLlmClient::new(ChatConfig::from_env()?)?);
//! let runner = Arc::new(OllamaClient::new(RunnerConfig::from_env()?)?);
//! ```

pub mod litellm;
pub mod ollama;
pub mod runner;

pub use litellm::{
    Choice, GenerationRequest, GenerationResponse, LiteLlmClient, LlmProvider, Message, Usage,
};
pub use ollama::{format_size_gb, LocalModel, LocalModelDetails, OllamaClient};
pub use runner::{ModelRunner, ProviderRunner};
