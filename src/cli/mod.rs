//! Command-line interface for promptforge.
//!
//! Provides commands for prompt optimization, output scoring and local
//! model server inspection.

mod commands;

pub use commands::{parse_cli, run, run_with_cli};
