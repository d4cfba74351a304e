//! LLM prompts for the prompt-optimization stages.
//!
//! # Architecture
//!
//! - [`templates`] - the optimizer persona, stage templates, judge rubric and
//!   the thinking-style library
//! - [`render`] - validated `{placeholder}` substitution
//! - [`stage_prompts`] - builders producing the system/user pair per stage
//!
//! # Usage
//!
//! ```
//! use promptforge::prompts::build_critique_prompt;
//!
//! let prompt = build_critique_prompt("Translate to English:", "Bonjour")
//!     .expect("all placeholders supplied");
//! assert!(prompt.user.contains("Bonjour"));
//! ```

pub mod render;
pub mod stage_prompts;
pub mod templates;

pub use render::PromptTemplate;
pub use stage_prompts::{
    build_critique_prompt, build_initial_prompt, build_judge_prompt, build_refine_prompt,
    build_variants_prompt, StagePrompt,
};
pub use templates::{JUDGE_SYSTEM_PROMPT, OPTIMIZER_SYSTEM_PROMPT, THINKING_STYLES};
