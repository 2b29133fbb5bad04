// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::directive::{Directive, DirectiveId, DirectiveStatus, OutputArtifact, Priority};
use crate::session::{CompletedDirectiveSummary, SessionContext, SessionId};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core data-model types, used by header
/// round-trip and slug-invariant properties elsewhere in the workspace.
pub mod strategies {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_priority() -> impl Strategy<Value = Priority> {
        prop_oneof![Just(Priority::High), Just(Priority::Medium), Just(Priority::Low)]
    }

    pub fn arb_status() -> impl Strategy<Value = DirectiveStatus> {
        prop_oneof![
            Just(DirectiveStatus::Pending),
            Just(DirectiveStatus::Completed),
            Just(DirectiveStatus::Failed),
        ]
    }

    /// Task text restricted to printable, non-empty strings — directive
    /// headers never need to round-trip arbitrary control characters.
    pub fn arb_task_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ,.!?'-]{1,120}"
    }
}

// ── Factory functions ───────────────────────────────────────────────────

pub fn directive(slug: &str, task: &str) -> Directive {
    Directive::builder().slug(slug).task(task).build()
}

pub fn directive_with_prerequisites(slug: &str, task: &str, prerequisites: &[&str]) -> Directive {
    let mut d = directive(slug, task);
    d.prerequisites = prerequisites.iter().map(|s| s.to_string()).collect();
    d
}

pub fn pending_directive_in_session(slug: &str, task: &str, session_id: &SessionId) -> Directive {
    Directive::builder().slug(slug).task(task).session_id(session_id.clone()).build()
}

pub fn completed_output_artifact(directive: &Directive, tokens_in: u64, tokens_out: u64, cost: f64) -> OutputArtifact {
    let mut artifact = OutputArtifact::placeholder(directive);
    artifact = artifact
        .status(DirectiveStatus::Completed)
        .tokens_in(tokens_in)
        .tokens_out(tokens_out)
        .cost(cost)
        .processing_time_ms(1_000);
    artifact.result = "placeholder result".to_string();
    artifact
}

pub fn completion_summary(directive_id: DirectiveId, slug: &str, task: &str) -> CompletedDirectiveSummary {
    CompletedDirectiveSummary::new(directive_id, slug, task, "result tail")
}

pub fn session_context_with_one_completion(task: &str) -> SessionContext {
    let mut ctx = SessionContext::new(SessionId::new("session-test"));
    ctx.record_completion(completion_summary(DirectiveId::new(), "placeholder-slug", task));
    ctx
}
