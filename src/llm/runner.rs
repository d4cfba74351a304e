//! Capability for executing a prompt against a target model.
//!
//! Candidates are run against the model being optimized for, which is
//! usually a small local model and not the one driving the optimizer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::utils::strip_reasoning_tags;

use super::litellm::{GenerationRequest, LlmProvider, Message};

/// Runs a single prompt against a named model and returns its output text.
#[async_trait]
pub trait ModelRunner: Send + Sync {
    /// Execute `prompt` as a single user message against `model`.
    async fn run_prompt(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Adapts a chat-completion provider into a [`ModelRunner`], so the target
/// model can also be served by an OpenAI-compatible endpoint.
pub struct ProviderRunner {
    provider: Arc<dyn LlmProvider>,
    strip_reasoning: bool,
}

impl ProviderRunner {
    /// Wraps `provider`; reasoning blocks are stripped from outputs.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            strip_reasoning: true,
        }
    }

    /// Set whether `<think>` blocks are removed from outputs.
    pub fn with_strip_reasoning(mut self, strip: bool) -> Self {
        self.strip_reasoning = strip;
        self
    }
}

#[async_trait]
impl ModelRunner for ProviderRunner {
    async fn run_prompt(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let request = GenerationRequest::new(model, vec![Message::user(prompt)]);
        let response = self.provider.generate(request).await?;
        let content = response.first_content().ok_or(LlmError::EmptyResponse)?;

        Ok(if self.strip_reasoning {
            strip_reasoning_tags(content)
        } else {
            content.to_string()
        })
    }
}
