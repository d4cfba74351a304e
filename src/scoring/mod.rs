//! Scoring engine for candidate prompt outputs.
//!
//! Scores are on a 0-100 scale. A deterministic heuristic rates every
//! output; in hybrid mode an LLM judge re-scores the best few, bounding the
//! number of expensive judge calls per batch.

mod heuristic;
mod hybrid;
mod judge;

pub use heuristic::{heuristic_score, ScoreBreakdown, ADVANCED_TERMS, LOGICAL_CONNECTORS};
pub use hybrid::{
    select_best_prompt, HybridScorer, ScoringCandidate, VariantResult, DEFAULT_JUDGE_TOP_K,
};
pub use judge::{parse_judge_score, JudgeScorer};
