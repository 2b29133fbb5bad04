// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The template renderer collaborator interface (§6). The real
//! variable-substitution engine (with its HCL-like interpolation) is
//! explicitly out of scope; this is the `{{NAME}}`-placeholder default the
//! store and bridge depend on for the four named document templates.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
}

/// External collaborator consumed, not implemented, by the core (§6).
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, name: &str, vars: &HashMap<String, String>) -> Result<String, TemplateError>;
}

/// `{{NAME}}` placeholder pattern (spec.md §6's artifact-template syntax).
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("constant regex pattern is valid"));

/// Substitute `{{NAME}}` placeholders with values from `vars`. Unknown
/// placeholders are replaced with `N/A`, matching §4.6's "leave template
/// placeholders replaced by N/A when a metric is absent".
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            vars.get(name).cloned().unwrap_or_else(|| "N/A".to_string())
        })
        .to_string()
}

const DIRECTIVE_PROMPT_TEMPLATE: &str = r#"# {{SLUG}}

## Prompt

{{TASK}}
"#;

const DIRECTIVE_OUT_TEMPLATE: &str = r#"# {{SLUG}} — Output

**Status:** {{STATUS}}
**Priority:** {{PRIORITY}}

## Directive

[[{{DIRECTIVE_ID}}]]

## Performance

- tokens in: {{TOKENS_IN}}
- tokens out: {{TOKENS_OUT}}
- cost: {{COST}}
- processing time: {{PROCESSING_TIME}}

## Output

{{RESULT}}

## Notes

{{NOTES}}
"#;

const CLAUDE_TODO_TEMPLATE: &str = r#"# {{SLUG}}

- id: {{TODO_ID}}
- priority: {{PRIORITY}}

{{TASK}}
"#;

/// Default renderer for the four named templates (§6): `directive-prompt`,
/// `directive-out`, `claude-todo`, plus a `default` fallback used when a
/// content-heuristic domain template isn't registered. Falls back to the
/// built-in fixed document if a requested name isn't registered, per
/// §4.1's "if rendering fails, a fixed built-in fallback is used".
#[derive(Debug, Clone, Default)]
pub struct PlaceholderRenderer {
    extra_templates: HashMap<String, String>,
}

impl PlaceholderRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a domain template selected by the decomposer/bridge's
    /// content heuristics (spec.md §6: "domain templates selected by
    /// content heuristics").
    pub fn register(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.extra_templates.insert(name.into(), body.into());
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "directive-prompt" => Some(DIRECTIVE_PROMPT_TEMPLATE),
            "directive-out" => Some(DIRECTIVE_OUT_TEMPLATE),
            "claude-todo" => Some(CLAUDE_TODO_TEMPLATE),
            other => self.extra_templates.get(other).map(String::as_str),
        }
    }
}

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, name: &str, vars: &HashMap<String, String>) -> Result<String, TemplateError> {
        match self.lookup(name) {
            Some(body) => Ok(interpolate(body, vars)),
            None => Err(TemplateError::UnknownTemplate(name.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
