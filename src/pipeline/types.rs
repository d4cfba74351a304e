//! Inputs, per-run state and results of an optimization run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::stages::{ResponseType, StageStatus};

/// Input to one optimization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    pub task_description: String,
    pub initial_prompt: String,
    /// Example input. Its presence selects guided mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl TaskSpec {
    /// Standalone-mode task.
    pub fn new(task_description: impl Into<String>, initial_prompt: impl Into<String>) -> Self {
        Self {
            task_description: task_description.into(),
            initial_prompt: initial_prompt.into(),
            example: None,
        }
    }

    /// Attach an example input, switching the run to guided mode.
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn is_guided(&self) -> bool {
        self.example.is_some()
    }

    /// Text sent to the target model for `prompt`.
    pub fn executed_text(&self, prompt: &str) -> String {
        match &self.example {
            Some(example) => format!("{}\n\n {}", prompt, example),
            None => prompt.to_string(),
        }
    }
}

/// State accumulated while a run progresses. Owned by a single run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizationContext {
    pub task_description: String,
    pub optimized_prompt: String,
    pub critique_feedback: Option<String>,
    pub refined_prompts: Vec<String>,
    pub variants: Vec<String>,
    /// Target-model output per candidate prompt.
    pub outputs: BTreeMap<String, String>,
    /// Score per candidate prompt.
    pub scores: BTreeMap<String, f64>,
}

impl OptimizationContext {
    pub fn new(task_description: impl Into<String>) -> Self {
        Self {
            task_description: task_description.into(),
            ..Self::default()
        }
    }

    /// Distinct candidate prompts: the optimized prompt, then refined
    /// prompts, then variants, in first-seen order.
    pub fn candidates(&self) -> Vec<String> {
        let mut candidates = Vec::new();
        let all = std::iter::once(&self.optimized_prompt)
            .chain(&self.refined_prompts)
            .chain(&self.variants);
        for prompt in all {
            push_unique(&mut candidates, prompt.clone());
        }
        candidates
    }
}

/// Appends `value` unless an identical string is already present.
pub(crate) fn push_unique(items: &mut Vec<String>, value: String) {
    if !items.contains(&value) {
        items.push(value);
    }
}

/// Final result of an optimization run.
///
/// On failure only the fixed shape is populated: the original prompt in
/// `optimized_prompt` and empty collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub status: StageStatus,
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub optimized_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critique_feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined_prompts: Option<Vec<String>>,
    pub variants: Vec<String>,
    pub outputs: BTreeMap<String, String>,
    pub scores: BTreeMap<String, f64>,
}

impl OptimizationResult {
    /// Successful result built from a completed run.
    pub fn success(context: OptimizationContext, guided: bool) -> Self {
        let (critique_feedback, refined_prompts) = if guided {
            (context.critique_feedback, Some(context.refined_prompts))
        } else {
            (None, None)
        };

        Self {
            status: StageStatus::Success,
            response_type: ResponseType::PromptOptimization,
            optimized_prompt: context.optimized_prompt,
            critique_feedback,
            refined_prompts,
            variants: context.variants,
            outputs: context.outputs,
            scores: context.scores,
        }
    }

    /// Fixed-shape failure result echoing the caller's prompt.
    pub fn failure(initial_prompt: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Error,
            response_type: ResponseType::PromptOptimization,
            optimized_prompt: initial_prompt.into(),
            critique_feedback: None,
            refined_prompts: None,
            variants: Vec::new(),
            outputs: BTreeMap::new(),
            scores: BTreeMap::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }

    /// Highest-scoring candidate and its score. Ties go to the prompt that
    /// sorts first.
    pub fn best_prompt(&self) -> Option<(&str, f64)> {
        self.scores
            .iter()
            .fold(None, |best, (prompt, &score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((prompt.as_str(), score)),
            })
    }

    /// Candidates ordered by score, highest first.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .scores
            .iter()
            .map(|(prompt, &score)| (prompt.as_str(), score))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}
