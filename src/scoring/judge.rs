//! LLM-judged scoring against the content/language/structure rubric.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::error::{LlmError, ScoringError};
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::prompts::build_judge_prompt;

static SCORE_TOTAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<SCORE>[\s\S]*?total:\s*(\d+(?:\.\d+)?)[\s\S]*?</SCORE>")
        .expect("judge score regex is valid")
});

/// Extracts the `total:` value from a `<SCORE>...</SCORE>` block, clamped
/// to `[0, 100]`.
pub fn parse_judge_score(reply: &str) -> Option<f64> {
    let total = SCORE_TOTAL.captures(reply)?.get(1)?.as_str();
    total.parse::<f64>().ok().map(|score| score.clamp(0.0, 100.0))
}

/// Asks a chat-completion model to grade an output.
pub struct JudgeScorer {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
}

impl JudgeScorer {
    /// Judge using the provider's default model at temperature 0.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            model: String::new(),
            temperature: 0.0,
        }
    }

    /// Use a specific judge model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature for judge calls.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Scores `output` produced by `prompt` for `task_description`.
    pub async fn score(
        &self,
        prompt: &str,
        output: &str,
        task_description: &str,
    ) -> Result<f64, ScoringError> {
        let judge_prompt = build_judge_prompt(prompt, output, task_description)?;
        let request = GenerationRequest::new(
            self.model.clone(),
            vec![
                Message::system(judge_prompt.system),
                Message::user(judge_prompt.user),
            ],
        )
        .with_temperature(self.temperature);

        let response = self.provider.generate(request).await?;
        let reply = response.first_content().ok_or(LlmError::EmptyResponse)?;

        parse_judge_score(reply).ok_or_else(|| ScoringError::Unparsable(truncate(reply, 120)))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
