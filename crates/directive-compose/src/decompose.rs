// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Decomposer (C4): turn a free-form prompt into an ordered chain of
//! directive records (§4.2). Structured mode recognizes domain signals and
//! emits one record per detected phase in canonical order; structural mode
//! falls back to splitting on sentence terminators. An optional oracle may
//! be asked for a better split; any failure silently falls back to
//! structural mode without mutating any state first.

use async_trait::async_trait;
use chrono::Utc;
use directive_core::{Directive, DirectiveId, DirectiveStatus, Platform, Priority, Sanitizer, SessionId};

use crate::lexicon::{
    contains_any, ACTION_VERBS, API_SIGNALS, ARCHITECTURE_SIGNALS, DATA_SIGNALS, DEFERRAL_MARKERS, DEPLOY_SIGNALS,
    TEST_SIGNALS, UI_SIGNALS, URGENCY_MARKERS,
};

const MIN_FRAGMENT_WORDS: usize = 3;
const SLUG_MAX_LEN: usize = 48;

/// An external oracle the decomposer may consult for a better split than
/// naive sentence splitting (§4.2). Any error is swallowed by the caller
/// and treated as "use structural mode instead".
#[async_trait]
pub trait SplitOracle: Send + Sync {
    async fn suggest_split(&self, prompt: &str) -> Result<Vec<String>, OracleError>;
}

#[derive(Debug, thiserror::Error)]
#[error("oracle split failed: {0}")]
pub struct OracleError(pub String);

/// One phase detected in structured mode, in the canonical emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Analyze,
    Data,
    Api,
    Ui,
    Test,
    Deploy,
}

impl Phase {
    fn label(&self) -> &'static str {
        match self {
            Self::Analyze => "Analyze the requirements",
            Self::Data => "Design and implement the data layer",
            Self::Api => "Build the API surface",
            Self::Ui => "Build the user interface",
            Self::Test => "Write tests",
            Self::Deploy => "Deploy the system",
        }
    }

    fn priority(&self) -> Priority {
        match self {
            Self::Analyze | Self::Data | Self::Api => Priority::High,
            Self::Ui | Self::Test => Priority::Medium,
            Self::Deploy => Priority::Low,
        }
    }
}

pub struct Decomposer {
    oracle: Option<Box<dyn SplitOracle>>,
}

impl Decomposer {
    pub fn new() -> Self {
        Self { oracle: None }
    }

    pub fn with_oracle(oracle: Box<dyn SplitOracle>) -> Self {
        Self { oracle: Some(oracle) }
    }

    /// Decompose `prompt` into an ordered chain of [`Directive`] records,
    /// all tagged with `session_id`. `selector` is the optional
    /// (platform, model) override applied to every emitted record.
    pub async fn decompose(
        &self,
        prompt: &str,
        session_id: SessionId,
        selector: Option<(Platform, String)>,
        sanitizer: &dyn Sanitizer,
    ) -> Vec<Directive> {
        let tasks = match structured_phases(prompt) {
            Some(phases) => phases.into_iter().map(|p| p.label().zip_priority(p.priority())).collect(),
            None => self.structural_or_oracle_tasks(prompt).await,
        };

        build_chain(tasks, session_id, selector, sanitizer)
    }

    async fn structural_or_oracle_tasks(&self, prompt: &str) -> Vec<(String, Priority)> {
        if let Some(oracle) = &self.oracle {
            if let Ok(fragments) = oracle.suggest_split(prompt).await {
                if !fragments.is_empty() {
                    return fragments.into_iter().map(|f| classify_fragment(&f)).collect();
                }
            }
        }
        structural_fragments(prompt)
    }
}

impl Default for Decomposer {
    fn default() -> Self {
        Self::new()
    }
}

/// Small trait-free helper so [`Phase::label`] can pair itself with a
/// priority without an extra allocation at every call site.
trait ZipPriority {
    fn zip_priority(self, priority: Priority) -> (String, Priority);
}

impl ZipPriority for &'static str {
    fn zip_priority(self, priority: Priority) -> (String, Priority) {
        (self.to_string(), priority)
    }
}

/// Detect structured-mode phases (§4.2). `Analyze` is always present once
/// any other signal fires — every decomposition needs a first look at the
/// requirements regardless of whether the prompt uses the word
/// "architecture" (§9's documented quirk: later phases sometimes appear
/// "by virtue of other records existing" rather than their own keyword).
fn structured_phases(prompt: &str) -> Option<Vec<Phase>> {
    let architecture = contains_any(prompt, ARCHITECTURE_SIGNALS);
    let data = contains_any(prompt, DATA_SIGNALS);
    let api = contains_any(prompt, API_SIGNALS);
    let ui = contains_any(prompt, UI_SIGNALS);
    let test_explicit = contains_any(prompt, TEST_SIGNALS);
    let deploy_explicit = contains_any(prompt, DEPLOY_SIGNALS);

    let any_signal = architecture || data || api || ui || test_explicit || deploy_explicit;
    if !any_signal {
        return None;
    }

    // Test and deploy can appear without their own keyword when enough of
    // the surrounding phases are already present (§9 REDESIGN/DESIGN NOTE:
    // treated as deliberate, not a bug).
    let test = test_explicit || (data && api);
    let deploy = deploy_explicit || (api && ui);

    let mut phases = vec![Phase::Analyze];
    if data {
        phases.push(Phase::Data);
    }
    if api {
        phases.push(Phase::Api);
    }
    if ui {
        phases.push(Phase::Ui);
    }
    if test {
        phases.push(Phase::Test);
    }
    if deploy {
        phases.push(Phase::Deploy);
    }
    Some(phases)
}

/// Split on sentence terminators; keep a fragment if it's long enough or
/// contains a recognized action verb (§4.2). An empty/unqualified prompt
/// becomes exactly one record over the whole text (§8).
fn structural_fragments(prompt: &str) -> Vec<(String, Priority)> {
    let fragments: Vec<&str> = prompt
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();

    let qualifying: Vec<&str> = fragments
        .into_iter()
        .filter(|f| f.split_whitespace().count() >= MIN_FRAGMENT_WORDS || contains_any(f, ACTION_VERBS))
        .collect();

    if qualifying.is_empty() {
        return vec![classify_fragment(prompt.trim())];
    }
    qualifying.into_iter().map(classify_fragment).collect()
}

fn classify_fragment(fragment: &str) -> (String, Priority) {
    let priority = if contains_any(fragment, URGENCY_MARKERS) {
        Priority::High
    } else if contains_any(fragment, DEFERRAL_MARKERS) {
        Priority::Low
    } else {
        Priority::Medium
    };
    (fragment.to_string(), priority)
}

fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut last_was_dash = false;
    for ch in text.to_ascii_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_dash = false;
        } else if !last_was_dash && !slug.is_empty() {
            slug.push('-');
            last_was_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    let truncated: String = slug.chars().take(SLUG_MAX_LEN).collect();
    truncated.trim_end_matches('-').to_string()
}

fn build_chain(
    tasks: Vec<(String, Priority)>,
    session_id: SessionId,
    selector: Option<(Platform, String)>,
    sanitizer: &dyn Sanitizer,
) -> Vec<Directive> {
    let total = tasks.len() as u32;
    let mut previous_slug: Option<String> = None;
    let mut directives = Vec::with_capacity(tasks.len());

    for (index, (task, priority)) in tasks.into_iter().enumerate() {
        let sanitized_task = sanitizer.sanitize_prompt(&task).unwrap_or(task);
        let slug_source = slugify(&sanitized_task);
        let slug = if slug_source.is_empty() {
            sanitizer.generate_safe_id(&sanitized_task, "directive-")
        } else {
            slug_source
        };

        let prerequisites = previous_slug.clone().into_iter().collect();
        let directive = Directive {
            id: DirectiveId::new(),
            slug: slug.clone(),
            task: sanitized_task,
            status: DirectiveStatus::Pending,
            priority,
            created: Utc::now(),
            platform: selector.as_ref().map(|(p, _)| p.to_string()),
            model: selector.as_ref().map(|(_, m)| m.clone()),
            prerequisites,
            todo_id: None,
            session_id: Some(session_id.clone()),
            todo_index: Some(index as u32),
            total_todos: Some(total),
        };

        previous_slug = Some(slug);
        directives.push(directive);
    }

    directives
}

#[cfg(test)]
#[path = "decompose_tests.rs"]
mod tests;
