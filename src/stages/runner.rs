//! The four LLM-mediated optimization stages.
//!
//! Each stage renders its template, makes one chat-completion call and
//! pulls the `<START>...<END>` payloads out of the reply. Stages never
//! return an error: failures are logged and reported as a
//! [`StageStatus::Error`](super::StageStatus::Error) response.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::OptimizerConfig;
use crate::error::{LlmError, StageError};
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::prompts::{
    build_critique_prompt, build_initial_prompt, build_refine_prompt, build_variants_prompt,
    StagePrompt,
};
use crate::utils::{extract_marked_blocks, strip_reasoning_tags};

use super::types::{ResponseType, StageResponse};

/// Runs optimization stages against a chat-completion provider.
pub struct StageRunner {
    provider: Arc<dyn LlmProvider>,
    config: OptimizerConfig,
    model: String,
}

impl StageRunner {
    /// Create a stage runner using the provider's default model.
    pub fn new(provider: Arc<dyn LlmProvider>, config: OptimizerConfig) -> Self {
        Self {
            provider,
            config,
            model: String::new(),
        }
    }

    /// Use a specific optimizer model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Rewrites `initial_prompt` into an optimized prompt for the task.
    pub async fn generate_initial_prompt(
        &self,
        task_description: &str,
        initial_prompt: &str,
    ) -> StageResponse<String> {
        let result = self
            .try_initial_prompt(task_description, initial_prompt)
            .await;
        finish("generate_initial_prompt", ResponseType::PromptOptimization, result)
    }

    /// Critiques `instruction` using `examples`; feedback items are joined
    /// one per line.
    pub async fn critique(&self, instruction: &str, examples: &str) -> StageResponse<String> {
        let result = self.try_critique(instruction, examples).await;
        finish("critique", ResponseType::CritiqueFeedback, result)
    }

    /// Produces refined prompts addressing `critique`.
    pub async fn refine(
        &self,
        instruction: &str,
        critique: &str,
        examples: Option<&str>,
    ) -> StageResponse<Vec<String>> {
        let result = self.try_refine(instruction, critique, examples).await;
        finish("refine", ResponseType::RefinedPrompt, result)
    }

    /// Produces variations of `prompt_instruction`.
    pub async fn generate_variants(
        &self,
        prompt_instruction: &str,
        task_description: &str,
    ) -> StageResponse<Vec<String>> {
        let result = self
            .try_variants(prompt_instruction, task_description)
            .await;
        finish("generate_variants", ResponseType::PromptVariants, result)
    }

    async fn try_initial_prompt(
        &self,
        task_description: &str,
        initial_prompt: &str,
    ) -> Result<String, StageError> {
        let prompt = build_initial_prompt(task_description, initial_prompt)?;
        let blocks = self.complete("generate_initial_prompt", prompt).await?;
        blocks
            .into_iter()
            .next()
            .ok_or(StageError::EmptyResponse("generate_initial_prompt"))
    }

    async fn try_critique(&self, instruction: &str, examples: &str) -> Result<String, StageError> {
        let prompt = build_critique_prompt(instruction, examples)?;
        let blocks = self.complete("critique", prompt).await?;
        Ok(blocks.join("\n"))
    }

    async fn try_refine(
        &self,
        instruction: &str,
        critique: &str,
        examples: Option<&str>,
    ) -> Result<Vec<String>, StageError> {
        let prompt = build_refine_prompt(
            instruction,
            critique,
            self.config.steps_per_sample,
            examples,
        )?;
        self.complete("refine", prompt).await
    }

    async fn try_variants(
        &self,
        prompt_instruction: &str,
        task_description: &str,
    ) -> Result<Vec<String>, StageError> {
        let prompt = build_variants_prompt(
            prompt_instruction,
            task_description,
            self.config.num_variations,
            self.config.thinking_styles,
        )?;
        self.complete("generate_variants", prompt).await
    }

    /// Sends the stage prompt and returns the non-empty extracted blocks.
    async fn complete(
        &self,
        stage: &'static str,
        prompt: StagePrompt,
    ) -> Result<Vec<String>, StageError> {
        debug!(
            stage,
            system_chars = prompt.system.len(),
            user_chars = prompt.user.len(),
            "Sending stage prompt"
        );

        let request = GenerationRequest::new(
            self.model.clone(),
            vec![Message::system(prompt.system), Message::user(prompt.user)],
        )
        .with_temperature(self.config.stage_temperature);

        let response = self.provider.generate(request).await?;
        let content = response.first_content().ok_or(LlmError::EmptyResponse)?;

        let blocks: Vec<String> = extract_marked_blocks(&strip_reasoning_tags(content))
            .into_iter()
            .filter(|block| !block.is_empty())
            .collect();

        if blocks.is_empty() {
            return Err(StageError::EmptyResponse(stage));
        }
        Ok(blocks)
    }
}

fn finish<T: Default + Countable>(
    stage: &'static str,
    response_type: ResponseType,
    result: Result<T, StageError>,
) -> StageResponse<T> {
    match result {
        Ok(data) => {
            info!(stage, items = data.count(), "Stage completed");
            StageResponse::success(response_type, data)
        }
        Err(err) => {
            warn!(stage, error = %err, "Stage failed");
            StageResponse::failure(response_type)
        }
    }
}

/// Item count reported in stage logs.
trait Countable {
    fn count(&self) -> usize;
}

impl Countable for String {
    fn count(&self) -> usize {
        1
    }
}

impl Countable for Vec<String> {
    fn count(&self) -> usize {
        self.len()
    }
}
