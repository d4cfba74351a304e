//! Deterministic, network-free output quality estimate.
//!
//! The score rewards outputs of moderate length (200-1000 characters), a
//! rich vocabulary with analytical connectives, and visible structure
//! (paragraphs, lists, headers, transitions).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Terms counted towards the complexity component.
pub const ADVANCED_TERMS: &[&str] = &[
    "therefore",
    "however",
    "moreover",
    "consequently",
    "furthermore",
    "nevertheless",
    "specifically",
    "additionally",
    "alternatively",
    "analyze",
    "evaluate",
    "implement",
    "optimize",
    "integrate",
];

/// Phrases counted towards the structure component.
pub const LOGICAL_CONNECTORS: &[&str] = &[
    "first",
    "second",
    "third",
    "finally",
    "because",
    "since",
    "as a result",
    "for example",
    "such as",
    "specifically",
    "in addition",
    "furthermore",
    "moreover",
    "however",
    "on the other hand",
    "in contrast",
    "in conclusion",
    "to summarize",
    "overall",
];

const IDEAL_MIN_LEN: f64 = 200.0;
const IDEAL_MAX_LEN: f64 = 1000.0;

const MAX_LENGTH_SCORE: f64 = 40.0;
const MAX_RICHNESS_SCORE: f64 = 15.0;
const MAX_TERM_SCORE: f64 = 15.0;
const MAX_PARAGRAPH_SCORE: f64 = 10.0;
const MAX_CONNECTOR_SCORE: f64 = 10.0;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph regex is valid"));
static NUMBERED_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s").expect("numbered list regex is valid"));
static BULLET_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-•*]\s").expect("bullet regex is valid"));
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+\s|\*\*[\w\s]+\*\*").expect("header regex is valid"));

/// Per-component heuristic score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Length component, 0-40.
    pub length_score: f64,
    /// Vocabulary and advanced-term component, 0-30.
    pub complexity_score: f64,
    /// Paragraph, list and connector component, 0-30.
    pub structure_score: f64,
}

impl ScoreBreakdown {
    /// Computes all three components for `output`.
    pub fn of(output: &str) -> Self {
        let lowered = output.to_lowercase();
        Self {
            length_score: length_score(output.chars().count()),
            complexity_score: complexity_score(&lowered),
            structure_score: structure_score(output, &lowered),
        }
    }

    /// Sum of the components clamped to 0-100.
    pub fn total(&self) -> f64 {
        (self.length_score + self.complexity_score + self.structure_score).clamp(0.0, 100.0)
    }
}

/// Heuristic score in `[0, 100]` for an output produced by `_prompt` on
/// `_task_description`.
///
/// Only the output text contributes; the other arguments are part of the
/// scoring contract shared with the judge.
pub fn heuristic_score(_prompt: &str, output: &str, _task_description: &str) -> f64 {
    ScoreBreakdown::of(output).total()
}

fn length_score(len: usize) -> f64 {
    let len = len as f64;
    if len < IDEAL_MIN_LEN {
        (len / IDEAL_MIN_LEN) * 20.0
    } else if len <= IDEAL_MAX_LEN {
        MAX_LENGTH_SCORE * ((len - IDEAL_MIN_LEN) / (IDEAL_MAX_LEN - IDEAL_MIN_LEN))
    } else {
        let overflow = ((len - IDEAL_MAX_LEN) / IDEAL_MAX_LEN).min(0.5);
        MAX_LENGTH_SCORE * (1.0 - overflow)
    }
}

fn complexity_score(lowered: &str) -> f64 {
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let richness = if words.is_empty() {
        0.0
    } else {
        let unique: HashSet<&str> = words.iter().copied().collect();
        unique.len() as f64 / words.len() as f64
    };

    let term_count = count_present(lowered, ADVANCED_TERMS);

    (richness * 20.0).min(MAX_RICHNESS_SCORE) + (term_count as f64 * 1.5).min(MAX_TERM_SCORE)
}

fn structure_score(output: &str, lowered: &str) -> f64 {
    let paragraphs = PARAGRAPH_BREAK
        .split(output)
        .filter(|p| !p.trim().is_empty())
        .count();
    let paragraph_score = if paragraphs > 1 {
        (paragraphs as f64 * 2.0).min(MAX_PARAGRAPH_SCORE)
    } else {
        0.0
    };

    let mut format_score = 0.0;
    if NUMBERED_LIST.is_match(output) {
        format_score += 4.0;
    }
    if BULLET_LIST.is_match(output) {
        format_score += 3.0;
    }
    if HEADER.is_match(output) {
        format_score += 3.0;
    }

    let connector_score = (count_present(lowered, LOGICAL_CONNECTORS) as f64).min(MAX_CONNECTOR_SCORE);

    paragraph_score + format_score + connector_score
}

/// Number of distinct `terms` occurring as substrings of `lowered`.
fn count_present(lowered: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|term| lowered.contains(*term)).count()
}
