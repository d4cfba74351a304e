//! Prompt optimizer sequencing the stages, target-model runs and scoring.
//!
//! Guided mode (example present):
//! initial prompt -> critique -> refine -> variants of every refined
//! prompt and the optimized prompt.
//!
//! Standalone mode: initial prompt -> variants of the optimized prompt.
//!
//! Every distinct candidate is then executed against the target model and
//! scored. Fan-outs wait for every candidate and tolerate individual
//! failures; a failed initial, critique or refine stage fails the run.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{OptimizerConfig, ScoringMode};
use crate::error::PipelineError;
use crate::llm::{LlmProvider, ModelRunner};
use crate::scoring::{
    select_best_prompt, HybridScorer, JudgeScorer, ScoringCandidate, VariantResult,
};
use crate::stages::{ResponseType, StageResponse, StageRunner};

use super::types::{push_unique, OptimizationContext, OptimizationResult, TaskSpec};

/// Runs the prompt-optimization pipeline.
pub struct PromptOptimizer {
    provider: Arc<dyn LlmProvider>,
    runner: Arc<dyn ModelRunner>,
    stages: StageRunner,
    scorer: HybridScorer,
    config: OptimizerConfig,
}

impl PromptOptimizer {
    /// Creates an optimizer.
    ///
    /// `provider` drives the stages and the judge; `runner` executes
    /// candidates against `config.target_model`.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        runner: Arc<dyn ModelRunner>,
        config: OptimizerConfig,
    ) -> Self {
        let stages = StageRunner::new(provider.clone(), config.clone());
        let scorer = build_scorer(provider.clone(), &config, "");
        Self {
            provider,
            runner,
            stages,
            scorer,
            config,
        }
    }

    /// Use a specific chat model for the stages and the judge.
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.scorer = build_scorer(self.provider.clone(), &self.config, &model);
        self.stages = StageRunner::new(self.provider.clone(), self.config.clone()).with_model(model);
        self
    }

    /// Optimizes `initial_prompt` for `task_description`.
    ///
    /// Supplying `example` runs guided mode. Never fails: a fatal stage
    /// failure yields [`OptimizationResult::failure`].
    pub async fn optimize_prompt(
        &self,
        task_description: &str,
        initial_prompt: &str,
        example: Option<&str>,
    ) -> OptimizationResult {
        let mut task = TaskSpec::new(task_description, initial_prompt);
        task.example = example.map(str::to_string);
        self.optimize(&task).await
    }

    /// Optimizes the prompt described by `task`.
    pub async fn optimize(&self, task: &TaskSpec) -> OptimizationResult {
        let run_id = Uuid::new_v4();
        let span = info_span!("optimize_prompt", run_id = %run_id, guided = task.is_guided());

        async {
            info!(target_model = %self.config.target_model, "Starting prompt optimization");
            match self.run(task).await {
                Ok(context) => {
                    info!(
                        candidates = context.outputs.len(),
                        variants = context.variants.len(),
                        "Prompt optimization completed"
                    );
                    OptimizationResult::success(context, task.is_guided())
                }
                Err(err) => {
                    warn!(error = %err, "Prompt optimization failed");
                    OptimizationResult::failure(task.initial_prompt.clone())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, task: &TaskSpec) -> Result<OptimizationContext, PipelineError> {
        let mut context = OptimizationContext::new(task.task_description.clone());

        context.optimized_prompt = required(
            "generate_initial_prompt",
            self.stages
                .generate_initial_prompt(&task.task_description, &task.initial_prompt)
                .await,
        )?;

        match &task.example {
            Some(example) => {
                let critique = required(
                    "critique",
                    self.stages.critique(&context.optimized_prompt, example).await,
                )?;
                context.refined_prompts = required(
                    "refine",
                    self.stages
                        .refine(&context.optimized_prompt, &critique, None)
                        .await,
                )?;
                context.critique_feedback = Some(critique);

                let mut sources = vec![context.optimized_prompt.clone()];
                sources.extend(context.refined_prompts.iter().cloned());
                context.variants = self.expand_variants(&sources, &task.task_description).await;
            }
            None => {
                context.variants = self
                    .expand_variants(
                        std::slice::from_ref(&context.optimized_prompt),
                        &task.task_description,
                    )
                    .await;
            }
        }

        let candidates = context.candidates();
        info!(candidates = candidates.len(), "Executing candidates");
        context.outputs = self.execute_candidates(&candidates, task).await;
        context.scores = self.score_outputs(&candidates, &context.outputs, task).await;

        Ok(context)
    }

    /// Generates variants of every source prompt concurrently and returns
    /// their union, excluding the sources themselves. A failed variant call
    /// contributes nothing.
    async fn expand_variants(&self, sources: &[String], task_description: &str) -> Vec<String> {
        let responses = join_all(
            sources
                .iter()
                .map(|source| self.stages.generate_variants(source, task_description)),
        )
        .await;

        let mut variants = Vec::new();
        for (source, response) in sources.iter().zip(responses) {
            match response.into_data() {
                Some(generated) => {
                    for variant in generated {
                        if !sources.contains(&variant) {
                            push_unique(&mut variants, variant);
                        }
                    }
                }
                None => debug!(source_chars = source.len(), "No variants for source prompt"),
            }
        }
        variants
    }

    /// Runs every candidate against the target model. Failed runs are
    /// missing from the returned map.
    async fn execute_candidates(
        &self,
        candidates: &[String],
        task: &TaskSpec,
    ) -> BTreeMap<String, String> {
        let model = self.config.target_model.as_str();
        let runs = join_all(candidates.iter().map(|candidate| {
            let executed = task.executed_text(candidate);
            async move { self.runner.run_prompt(model, &executed).await }
        }))
        .await;

        let mut outputs = BTreeMap::new();
        for (candidate, run) in candidates.iter().zip(runs) {
            match run {
                Ok(output) => {
                    outputs.insert(candidate.clone(), output);
                }
                Err(err) => {
                    warn!(model, error = %err, "Candidate execution failed");
                }
            }
        }
        outputs
    }

    /// Executes and scores externally supplied variants, best first.
    ///
    /// Fails only when no variant produced an output.
    pub async fn test_prompt_variants(
        &self,
        variants: &[String],
        task: &TaskSpec,
    ) -> StageResponse<Vec<VariantResult>> {
        let mut distinct = Vec::new();
        for variant in variants {
            push_unique(&mut distinct, variant.clone());
        }

        let outputs = self.execute_candidates(&distinct, task).await;
        if outputs.is_empty() {
            warn!(variants = distinct.len(), "No variant produced an output");
            return StageResponse::failure(ResponseType::VariantResults);
        }

        let results = self.score_results(&distinct, &outputs, task).await;
        info!(scored = results.len(), "Variants evaluated");
        StageResponse::success(ResponseType::VariantResults, results)
    }

    /// Scores every candidate that produced an output.
    async fn score_outputs(
        &self,
        candidates: &[String],
        outputs: &BTreeMap<String, String>,
        task: &TaskSpec,
    ) -> BTreeMap<String, f64> {
        self.score_results(candidates, outputs, task)
            .await
            .into_iter()
            .map(|result| (result.variant, result.score))
            .collect()
    }

    async fn score_results(
        &self,
        candidates: &[String],
        outputs: &BTreeMap<String, String>,
        task: &TaskSpec,
    ) -> Vec<VariantResult> {
        let batch: Vec<ScoringCandidate> = candidates
            .iter()
            .filter_map(|candidate| {
                outputs.get(candidate).map(|output| {
                    ScoringCandidate::new(candidate.clone(), output.clone())
                        .with_scored_prompt(task.executed_text(candidate))
                })
            })
            .collect();

        self.scorer.score_batch(batch, &task.task_description).await
    }
}

/// Wraps the highest-scoring result; fails on empty input.
pub fn best_prompt_response(results: &[VariantResult]) -> StageResponse<Option<VariantResult>> {
    match select_best_prompt(results) {
        Some(best) => StageResponse::success(ResponseType::BestPrompt, Some(best.clone())),
        None => StageResponse::failure(ResponseType::BestPrompt),
    }
}

fn build_scorer(provider: Arc<dyn LlmProvider>, config: &OptimizerConfig, model: &str) -> HybridScorer {
    match config.scoring_mode {
        ScoringMode::Hybrid => HybridScorer::new(
            JudgeScorer::new(provider)
                .with_model(model)
                .with_temperature(config.judge_temperature),
        )
        .with_top_k(config.judge_top_k),
        ScoringMode::Heuristic => HybridScorer::heuristic_only(),
    }
}

/// Unwraps a stage whose failure is fatal for the run.
fn required<T>(stage: &'static str, response: StageResponse<T>) -> Result<T, PipelineError> {
    response
        .into_data()
        .ok_or(PipelineError::StageFailed { stage })
}
