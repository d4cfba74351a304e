//! `{placeholder}` substitution for prompt templates.
//!
//! Templates are immutable strings with named placeholders written as
//! `{name}`, where `name` is an identifier (`[A-Za-z_][A-Za-z0-9_]*`).
//! Rendering is single-pass: substituted values are never re-scanned, so a
//! task description containing `{instruction}` reaches the model verbatim.
//! A placeholder without a value is an error instead of leaking a literal
//! `{name}` into the prompt.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::TemplateError;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
});

/// A prompt template with named `{placeholder}` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    source: &'static str,
}

impl PromptTemplate {
    /// Wraps a static template string.
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }

    /// Raw template text.
    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Names of all placeholders in order of first appearance.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for caps in PLACEHOLDER.captures_iter(self.source) {
            if let Some(m) = caps.get(1) {
                if !names.contains(&m.as_str()) {
                    names.push(m.as_str());
                }
            }
        }
        names
    }

    /// Substitutes every placeholder from `values`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingPlaceholder`] for the first placeholder
    /// with no entry in `values`, and [`TemplateError::EmptyOutput`] if the
    /// rendered text is blank.
    pub fn render(&self, values: &HashMap<&str, &str>) -> Result<String, TemplateError> {
        let mut rendered = String::with_capacity(self.source.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(self.source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = values
                .get(name.as_str())
                .ok_or_else(|| TemplateError::MissingPlaceholder {
                    name: name.as_str().to_string(),
                })?;
            rendered.push_str(&self.source[last..whole.start()]);
            rendered.push_str(value);
            last = whole.end();
        }
        rendered.push_str(&self.source[last..]);

        if rendered.trim().is_empty() {
            return Err(TemplateError::EmptyOutput);
        }
        Ok(rendered)
    }
}
