//! Shared utility functions for promptforge.
//!
//! This module provides text utilities used across multiple modules,
//! including marker-delimited payload extraction from LLM responses.

pub mod marker_extraction;

pub use marker_extraction::{
    extract_marked_blocks, strip_reasoning_tags, END_MARKER, START_MARKER,
};
