//! Builders for the two-message conversation each stage sends.

use std::collections::HashMap;

use crate::error::TemplateError;

use super::templates::{
    CRITIQUE_TEMPLATE, INITIAL_PROMPT_TEMPLATE, JUDGE_SYSTEM_PROMPT, JUDGE_USER_TEMPLATE,
    NO_EXAMPLES_TEXT, OPTIMIZER_SYSTEM_PROMPT, REFINE_TEMPLATE, THINKING_STYLES,
    VARIANTS_TEMPLATE,
};

/// System and user messages for a single stage call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePrompt {
    /// System prompt establishing the optimizer persona.
    pub system: String,
    /// Rendered user prompt.
    pub user: String,
}

impl StagePrompt {
    /// Creates a stage prompt from its two messages.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    fn optimizer(user: String) -> Self {
        Self::new(OPTIMIZER_SYSTEM_PROMPT, user)
    }
}

/// Prompt for generate-initial-prompt.
pub fn build_initial_prompt(
    task_description: &str,
    initial_prompt: &str,
) -> Result<StagePrompt, TemplateError> {
    let values = HashMap::from([
        ("taskDescription", task_description),
        ("initialPrompt", initial_prompt),
    ]);
    INITIAL_PROMPT_TEMPLATE
        .render(&values)
        .map(StagePrompt::optimizer)
}

/// Prompt for critique.
pub fn build_critique_prompt(
    instruction: &str,
    examples: &str,
) -> Result<StagePrompt, TemplateError> {
    let values = HashMap::from([("instruction", instruction), ("_examples_", examples)]);
    CRITIQUE_TEMPLATE.render(&values).map(StagePrompt::optimizer)
}

/// Prompt for refine.
///
/// Without `examples` the examples slot is filled with a fixed notice.
pub fn build_refine_prompt(
    instruction: &str,
    critique: &str,
    steps_per_sample: usize,
    examples: Option<&str>,
) -> Result<StagePrompt, TemplateError> {
    let steps = steps_per_sample.to_string();
    let values = HashMap::from([
        ("instruction", instruction),
        ("critique", critique),
        ("steps_per_sample", steps.as_str()),
        ("_examples_", examples.unwrap_or(NO_EXAMPLES_TEXT)),
    ]);
    REFINE_TEMPLATE.render(&values).map(StagePrompt::optimizer)
}

/// Prompt for generate-variants, primed with the first `thinking_styles`
/// entries of [`THINKING_STYLES`].
pub fn build_variants_prompt(
    prompt_instruction: &str,
    task_description: &str,
    num_variations: usize,
    thinking_styles: usize,
) -> Result<StagePrompt, TemplateError> {
    let meta_prompts = THINKING_STYLES
        .iter()
        .take(thinking_styles)
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    let num_variations = num_variations.to_string();
    let values = HashMap::from([
        ("task_description", task_description),
        ("meta_prompts", meta_prompts.as_str()),
        ("num_variations", num_variations.as_str()),
        ("prompt_instruction", prompt_instruction),
    ]);
    VARIANTS_TEMPLATE.render(&values).map(StagePrompt::optimizer)
}

/// Prompt asking the judge to score one (prompt, output) pair.
pub fn build_judge_prompt(
    prompt: &str,
    output: &str,
    task_description: &str,
) -> Result<StagePrompt, TemplateError> {
    let values = HashMap::from([
        ("task_description", task_description),
        ("prompt", prompt),
        ("output", output),
    ]);
    JUDGE_USER_TEMPLATE
        .render(&values)
        .map(|user| StagePrompt::new(JUDGE_SYSTEM_PROMPT, user))
}
