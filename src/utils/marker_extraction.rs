//! Extraction of `<START>...<END>` delimited payloads from LLM responses.
//!
//! Stage prompts ask the model to wrap every answer in a marker pair. Models
//! do not always comply, so extraction falls back to the whole response
//! instead of failing.
//!
//! # Example
//!
//! ```
//! use promptforge::utils::marker_extraction::extract_marked_blocks;
//!
//! let response = "Sure!\n<START>first prompt<END>\n<START> second prompt <END>";
//! assert_eq!(extract_marked_blocks(response), vec!["first prompt", "second prompt"]);
//!
//! assert_eq!(extract_marked_blocks("  no markers  "), vec!["no markers"]);
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Opening marker expected around each payload.
pub const START_MARKER: &str = "<START>";

/// Closing marker expected around each payload.
pub const END_MARKER: &str = "<END>";

/// Each `<START>` pairs with the nearest following `<END>`.
static MARKED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}([\s\S]*?){}",
        regex::escape(START_MARKER),
        regex::escape(END_MARKER)
    ))
    .expect("marker regex is valid")
});

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<think>[\s\S]*?</think>").expect("think regex is valid"));

/// Extracts every marker-delimited payload from `content`, trimmed, in
/// document order.
///
/// When no complete marker pair exists the trimmed whole input is returned
/// as the only element, so the result is never empty.
pub fn extract_marked_blocks(content: &str) -> Vec<String> {
    let blocks: Vec<String> = MARKED_BLOCK
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect();

    if blocks.is_empty() {
        vec![content.trim().to_string()]
    } else {
        blocks
    }
}

/// Removes `<think>...</think>` reasoning blocks emitted by local reasoning
/// models and trims the remainder.
pub fn strip_reasoning_tags(content: &str) -> String {
    THINK_BLOCK.replace_all(content, "").trim().to_string()
}
