//! End-to-end pipeline scenarios driven through the public API with
//! scripted capabilities.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use promptforge::config::{OptimizerConfig, ScoringMode};
use promptforge::error::LlmError;
use promptforge::llm::{
    Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, ModelRunner, Usage,
};
use promptforge::pipeline::{OptimizationResult, PromptOptimizer};
use promptforge::scoring::{heuristic_score, HybridScorer, JudgeScorer, ScoringCandidate};
use promptforge::stages::StageStatus;

const TRANSLATE_TASK: &str = "Translate text from Chinese to English";
const TRANSLATE_PROMPT: &str =
    "Please translate the following text to English, maintaining a natural and fluent style:";
const TRANSLATE_EXAMPLE: &str = "我很喜歡在公園裡散步，尤其是在春天的時候。";

/// Optimizer model that answers each stage with canned marker output.
struct ScriptedOptimizer {
    fail_initial: bool,
    call_count: AtomicUsize,
    judge_calls: AtomicUsize,
}

impl ScriptedOptimizer {
    fn new() -> Self {
        Self {
            fail_initial: false,
            call_count: AtomicUsize::new(0),
            judge_calls: AtomicUsize::new(0),
        }
    }

    fn failing_initial() -> Self {
        Self {
            fail_initial: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedOptimizer {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
        let user = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let content = if user.contains("Output to Evaluate") {
            self.judge_calls.fetch_add(1, Ordering::SeqCst);
            "<SCORE>\ncontent_quality: 35\nlanguage_complexity: 25\nstructure_organization: 25\ntotal: 85\n</SCORE>".to_string()
        } else if user.contains("different improved versions") {
            "<START>Translate the Chinese text into natural English. Output only the translation.<END>\n\
             <START>You are a professional translator. Render the text in fluent English.<END>\n\
             <START>Translate into English, keeping the tone and any time expressions.<END>"
                .to_string()
        } else if user.contains("variations of the prompt") {
            let seed = user.len() % 1000;
            format!(
                "<START>Variation {seed}-a: think step by step, then translate.<END>\n\
                 <START>Variation {seed}-b: list the key phrases first, then translate.<END>"
            )
        } else if user.contains("demanding reviewer") {
            "<START>Does not say whether to keep the original tone.<END>\n\
             <START>Output format is unspecified.<END>"
                .to_string()
        } else {
            if self.fail_initial {
                return Err(LlmError::ApiError {
                    code: 503,
                    message: "optimizer unavailable".to_string(),
                });
            }
            if user.contains("cat who discovers") {
                "<START>Write a short story (300-500 words) about a cat who discovers it can fly.<END>"
                    .to_string()
            } else {
                "<START>Translate the following Chinese text into fluent, natural English.<END>"
                    .to_string()
            }
        };

        Ok(GenerationResponse {
            id: format!("scripted-{}", idx),
            model: "scripted".to_string(),
            choices: vec![Choice {
                index: 0,
                message: Message::assistant(content),
                finish_reason: "stop".to_string(),
            }],
            usage: Usage::default(),
        })
    }
}

/// Target model that records prompts and answers with a fixed reply.
struct EchoTargetModel {
    prompts: Mutex<Vec<String>>,
}

impl EchoTargetModel {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelRunner for EchoTargetModel {
    async fn run_prompt(&self, _model: &str, prompt: &str) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .expect("lock not poisoned")
            .push(prompt.to_string());
        Ok(format!(
            "I really enjoy walking in the park, especially in spring. ({} chars of prompt)",
            prompt.chars().count()
        ))
    }
}

fn optimizer(provider: Arc<ScriptedOptimizer>, runner: Arc<EchoTargetModel>) -> PromptOptimizer {
    PromptOptimizer::new(provider, runner, OptimizerConfig::default())
}

#[tokio::test]
async fn test_guided_translation_scenario() {
    let provider = Arc::new(ScriptedOptimizer::new());
    let runner = Arc::new(EchoTargetModel::new());

    let result = optimizer(provider.clone(), runner.clone())
        .optimize_prompt(TRANSLATE_TASK, TRANSLATE_PROMPT, Some(TRANSLATE_EXAMPLE))
        .await;

    assert_eq!(result.status, StageStatus::Success);
    assert!(result
        .critique_feedback
        .as_deref()
        .is_some_and(|c| !c.is_empty()));
    assert!(result.refined_prompts.as_ref().is_some_and(|r| !r.is_empty()));
    assert!(!result.variants.is_empty());
    assert_eq!(result.outputs.len(), result.scores.len());

    // Every execution carries the example after the prompt.
    let prompts = runner.prompts.lock().unwrap();
    assert!(prompts
        .iter()
        .all(|p| p.ends_with(&format!("\n\n {}", TRANSLATE_EXAMPLE))));

    // Judge calls are bounded regardless of candidate count.
    assert!(result.scores.len() > 2);
    assert_eq!(provider.judge_calls.load(Ordering::SeqCst), 2);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "success");
    assert!(json["critiqueFeedback"].is_string());
    assert!(json["refinedPrompts"].is_array());
}

#[tokio::test]
async fn test_standalone_story_scenario() {
    let provider = Arc::new(ScriptedOptimizer::new());
    let runner = Arc::new(EchoTargetModel::new());

    let result = optimizer(provider, runner.clone())
        .optimize_prompt(
            "Generate a short story about a specific topic",
            "Write a story about a cat who discovers it can fly",
            None,
        )
        .await;

    assert_eq!(result.status, StageStatus::Success);
    assert!(result.critique_feedback.is_none());
    assert!(result.refined_prompts.is_none());
    assert_eq!(result.outputs.len(), 1 + result.variants.len());
    assert_eq!(result.outputs.len(), result.scores.len());

    let prompts = runner.prompts.lock().unwrap();
    assert!(prompts.iter().all(|p| !p.contains("\n\n ")));

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("critiqueFeedback").is_none());
    assert!(json.get("refinedPrompts").is_none());
}

#[tokio::test]
async fn test_initial_stage_failure_scenario() {
    let provider = Arc::new(ScriptedOptimizer::failing_initial());
    let runner = Arc::new(EchoTargetModel::new());

    let result = optimizer(provider, runner.clone())
        .optimize_prompt(TRANSLATE_TASK, TRANSLATE_PROMPT, Some(TRANSLATE_EXAMPLE))
        .await;

    assert_eq!(result.status, StageStatus::Error);
    assert_eq!(result.optimized_prompt, TRANSLATE_PROMPT);
    assert!(result.variants.is_empty());
    assert!(result.outputs.is_empty());
    assert!(result.scores.is_empty());
    assert_eq!(result, OptimizationResult::failure(TRANSLATE_PROMPT));
    assert!(runner.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_heuristic_mode_makes_no_judge_calls() {
    let provider = Arc::new(ScriptedOptimizer::new());
    let runner = Arc::new(EchoTargetModel::new());
    let config = OptimizerConfig::default().with_scoring_mode(ScoringMode::Heuristic);

    let result = PromptOptimizer::new(provider.clone(), runner, config)
        .optimize_prompt(TRANSLATE_TASK, TRANSLATE_PROMPT, Some(TRANSLATE_EXAMPLE))
        .await;

    assert!(result.is_success());
    assert_eq!(provider.judge_calls.load(Ordering::SeqCst), 0);
    for (prompt, score) in &result.scores {
        let executed = format!("{}\n\n {}", prompt, TRANSLATE_EXAMPLE);
        let output = &result.outputs[prompt];
        assert_eq!(*score, heuristic_score(&executed, output, TRANSLATE_TASK));
    }
}

#[tokio::test]
async fn test_hybrid_scoring_judges_exactly_top_two_of_five() {
    let provider = Arc::new(ScriptedOptimizer::new());
    let scorer = HybridScorer::new(JudgeScorer::new(provider.clone()));

    let outputs = [
        "Short.",
        "A slightly longer answer that still lacks structure.",
        "First, read the text.\n\nSecond, translate it carefully.",
        "1. Read the source text.\n2. Translate each sentence.\n\nTherefore, the result is fluent.",
        "# Translation\n\n1. First, analyze the sentence.\n2. Moreover, evaluate tone.\n\n- Output: I really enjoy walking in the park, especially in spring.\n\nIn conclusion, the translation is complete.",
    ];
    let candidates: Vec<ScoringCandidate> = outputs
        .iter()
        .enumerate()
        .map(|(i, output)| ScoringCandidate::new(format!("prompt-{}", i), *output))
        .collect();

    let mut heuristics: Vec<f64> = outputs
        .iter()
        .map(|o| heuristic_score("", o, "Translate"))
        .collect();
    heuristics.sort_by(|a, b| b.total_cmp(a));
    heuristics.dedup();
    assert_eq!(heuristics.len(), 5, "heuristic scores must be distinct");

    let results = scorer.score_batch(candidates, "Translate").await;

    assert_eq!(provider.judge_calls.load(Ordering::SeqCst), 2);
    assert_eq!(results.iter().filter(|r| r.judged).count(), 2);
    for (rank, result) in results.iter().enumerate() {
        assert_eq!(result.heuristic_score, heuristics[rank]);
        if rank < 2 {
            assert!(result.judged);
            assert_eq!(result.score, 85.0);
        } else {
            assert!(!result.judged);
            assert_eq!(result.score, result.heuristic_score);
        }
    }
}
