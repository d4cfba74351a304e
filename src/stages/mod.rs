//! Stage functions of the optimization pipeline.
//!
//! - generate-initial-prompt: rewrite the user's prompt for the task
//! - critique: list weaknesses of a prompt given example input
//! - refine: rewrite a prompt to address a critique
//! - generate-variants: diversify a prompt through thinking styles

mod runner;
mod types;

pub use runner::StageRunner;
pub use types::{ResponseType, StageResponse, StageStatus};
