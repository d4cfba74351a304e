//! Batch scoring: heuristic for everyone, the judge for the top performers.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::heuristic::heuristic_score;
use super::judge::JudgeScorer;

/// Default number of candidates re-scored by the judge.
pub const DEFAULT_JUDGE_TOP_K: usize = 2;

/// One candidate handed to [`HybridScorer::score_batch`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringCandidate {
    /// Candidate prompt, used as the result key.
    pub variant: String,
    /// Text shown to the scorer as "the prompt used". Usually the variant,
    /// or the variant with the example input appended.
    pub scored_prompt: String,
    /// Output the target model produced.
    pub output: String,
}

impl ScoringCandidate {
    /// Candidate scored against its bare prompt.
    pub fn new(variant: impl Into<String>, output: impl Into<String>) -> Self {
        let variant = variant.into();
        Self {
            scored_prompt: variant.clone(),
            variant,
            output: output.into(),
        }
    }

    /// Override the prompt text presented to the scorer.
    pub fn with_scored_prompt(mut self, scored_prompt: impl Into<String>) -> Self {
        self.scored_prompt = scored_prompt.into();
        self
    }
}

/// Scored candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantResult {
    pub variant: String,
    pub output: String,
    /// Final score: the judge's when `judged`, otherwise the heuristic.
    pub score: f64,
    pub heuristic_score: f64,
    pub judged: bool,
}

/// Applies the hybrid scoring policy to a batch of candidates.
pub struct HybridScorer {
    judge: Option<JudgeScorer>,
    top_k: usize,
}

impl HybridScorer {
    /// Hybrid scorer re-scoring the top [`DEFAULT_JUDGE_TOP_K`] candidates.
    pub fn new(judge: JudgeScorer) -> Self {
        Self {
            judge: Some(judge),
            top_k: DEFAULT_JUDGE_TOP_K,
        }
    }

    /// Scorer that never calls the judge.
    pub fn heuristic_only() -> Self {
        Self {
            judge: None,
            top_k: 0,
        }
    }

    /// Set how many top candidates the judge re-scores.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Upper bound on judge calls per batch.
    pub fn judge_budget(&self) -> usize {
        if self.judge.is_some() {
            self.top_k
        } else {
            0
        }
    }

    /// Scores every candidate heuristically, then re-scores the best
    /// `top_k` with the judge.
    ///
    /// Results are ordered by heuristic score, highest first; equal scores
    /// keep their input order. A judge failure leaves that candidate on its
    /// heuristic score.
    pub async fn score_batch(
        &self,
        candidates: Vec<ScoringCandidate>,
        task_description: &str,
    ) -> Vec<VariantResult> {
        let mut ranked: Vec<(ScoringCandidate, f64)> = candidates
            .into_iter()
            .map(|candidate| {
                let score =
                    heuristic_score(&candidate.scored_prompt, &candidate.output, task_description);
                (candidate, score)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let judge_count = ranked.len().min(self.judge_budget());
        let judge_scores = match &self.judge {
            Some(judge) if judge_count > 0 => {
                debug!(judged = judge_count, total = ranked.len(), "Judging top candidates");
                join_all(ranked[..judge_count].iter().map(|(candidate, _)| {
                    judge.score(&candidate.scored_prompt, &candidate.output, task_description)
                }))
                .await
            }
            _ => Vec::new(),
        };

        let mut judge_scores = judge_scores.into_iter();
        ranked
            .into_iter()
            .map(|(candidate, heuristic)| {
                let (score, judged) = match judge_scores.next() {
                    Some(Ok(score)) => (score, true),
                    Some(Err(err)) => {
                        warn!(error = %err, "Judge scoring failed, keeping heuristic score");
                        (heuristic, false)
                    }
                    None => (heuristic, false),
                };
                VariantResult {
                    variant: candidate.variant,
                    output: candidate.output,
                    score,
                    heuristic_score: heuristic,
                    judged,
                }
            })
            .collect()
    }
}

/// Highest-scoring result; ties go to the earliest. `None` when empty.
pub fn select_best_prompt(results: &[VariantResult]) -> Option<&VariantResult> {
    results.iter().fold(None, |best, candidate| match best {
        Some(current) if current.score >= candidate.score => Some(current),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{
        Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, Usage,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Mock judge that always returns the same reply and records which
    /// outputs it was asked about.
    struct MockLlmProvider {
        reply: String,
        judged_outputs: Mutex<Vec<String>>,
        call_count: AtomicUsize,
    }

    impl MockLlmProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                judged_outputs: Mutex::new(Vec::new()),
                call_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            let user = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            self.judged_outputs
                .lock()
                .expect("lock not poisoned")
                .push(user);
            Ok(GenerationResponse {
                id: format!("mock-{}", idx),
                model: "mock-model".to_string(),
                choices: vec![Choice {
                    index: 0,
                    message: Message::assistant(self.reply.clone()),
                    finish_reason: "stop".to_string(),
                }],
                usage: Usage::default(),
            })
        }
    }

    /// Five outputs with strictly increasing heuristic scores.
    fn five_candidates() -> Vec<ScoringCandidate> {
        vec![
            ScoringCandidate::new("v-short", "ok"),
            ScoringCandidate::new("v-longest", "x".repeat(180)),
            ScoringCandidate::new("v-mid", "x".repeat(60)),
            ScoringCandidate::new("v-long", "x".repeat(120)),
            ScoringCandidate::new("v-tiny", "x".repeat(20)),
        ]
    }

    #[tokio::test]
    async fn test_only_top_two_are_judged() {
        let provider = Arc::new(MockLlmProvider::new("<SCORE>total: 95</SCORE>"));
        let scorer = HybridScorer::new(JudgeScorer::new(provider.clone()));

        let results = scorer.score_batch(five_candidates(), "task").await;

        assert_eq!(provider.call_count.load(Ordering::SeqCst), 2);
        let order: Vec<&str> = results.iter().map(|r| r.variant.as_str()).collect();
        assert_eq!(order, vec!["v-longest", "v-long", "v-mid", "v-tiny", "v-short"]);

        for result in &results[..2] {
            assert!(result.judged);
            assert_eq!(result.score, 95.0);
        }
        for result in &results[2..] {
            assert!(!result.judged);
            assert_eq!(result.score, result.heuristic_score);
        }

        let judged = provider.judged_outputs.lock().unwrap();
        assert!(judged.iter().any(|u| u.contains(&"x".repeat(180))));
        assert!(judged.iter().all(|u| !u.contains("Output to Evaluate: ok")));
    }

    #[tokio::test]
    async fn test_unparsable_judge_falls_back_to_heuristic() {
        let provider = Arc::new(MockLlmProvider::new("Looks fine to me."));
        let scorer = HybridScorer::new(JudgeScorer::new(provider.clone()));

        let results = scorer.score_batch(five_candidates(), "task").await;

        assert_eq!(provider.call_count.load(Ordering::SeqCst), 2);
        for result in &results {
            assert!(!result.judged);
            assert_eq!(result.score, result.heuristic_score);
        }
    }

    #[tokio::test]
    async fn test_heuristic_only_never_calls_judge() {
        let scorer = HybridScorer::heuristic_only();
        assert_eq!(scorer.judge_budget(), 0);

        let results = scorer.score_batch(five_candidates(), "task").await;
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| !r.judged));
    }

    #[tokio::test]
    async fn test_top_k_larger_than_batch() {
        let provider = Arc::new(MockLlmProvider::new("<SCORE>total: 50</SCORE>"));
        let scorer = HybridScorer::new(JudgeScorer::new(provider.clone())).with_top_k(10);

        let results = scorer
            .score_batch(vec![ScoringCandidate::new("only", "output")], "task")
            .await;

        assert_eq!(provider.call_count.load(Ordering::SeqCst), 1);
        assert_eq!(results[0].score, 50.0);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let provider = Arc::new(MockLlmProvider::new("<SCORE>total: 50</SCORE>"));
        let scorer = HybridScorer::new(JudgeScorer::new(provider.clone()));

        assert!(scorer.score_batch(Vec::new(), "task").await.is_empty());
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scored_prompt_is_sent_to_judge() {
        let provider = Arc::new(MockLlmProvider::new("<SCORE>total: 70</SCORE>"));
        let scorer = HybridScorer::new(JudgeScorer::new(provider.clone())).with_top_k(1);
        let candidate = ScoringCandidate::new("Translate:", "I like walking")
            .with_scored_prompt("Translate:\n\n 我喜歡散步");

        let results = scorer.score_batch(vec![candidate], "Translate").await;

        assert_eq!(results[0].variant, "Translate:");
        let judged = provider.judged_outputs.lock().unwrap();
        assert!(judged[0].contains("Prompt Used: Translate:\n\n 我喜歡散步"));
    }

    fn result(variant: &str, score: f64) -> VariantResult {
        VariantResult {
            variant: variant.to_string(),
            output: String::new(),
            score,
            heuristic_score: score,
            judged: false,
        }
    }

    #[test]
    fn test_select_best_prompt() {
        let results = vec![result("a", 40.0), result("b", 72.5), result("c", 10.0)];
        assert_eq!(select_best_prompt(&results).map(|r| r.variant.as_str()), Some("b"));
    }

    #[test]
    fn test_select_best_prompt_tie_keeps_first() {
        let results = vec![result("a", 60.0), result("b", 60.0)];
        assert_eq!(select_best_prompt(&results).map(|r| r.variant.as_str()), Some("a"));
    }

    #[test]
    fn test_select_best_prompt_empty() {
        assert!(select_best_prompt(&[]).is_none());
    }

    #[test]
    fn test_variant_result_serializes_camel_case() {
        let json = serde_json::to_value(result("a", 1.0)).unwrap();
        assert!(json.get("heuristicScore").is_some());
    }
}
