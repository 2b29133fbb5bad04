// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identifier and the shared session context (C6).
//!
//! A session is the group of directives produced by a single decomposition
//! call; [`SessionContext`] is the bag of state they share (completion
//! history, knowledge base, to-do linkage). See [`crate::directive`] for the
//! directive records themselves.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directive::DirectiveId;

/// Unique identifier for a session, conventionally `session-<timestamp>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Create a new SessionId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value of this SessionId.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for SessionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SessionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Generate a fresh id as `session-<epoch_ms>`.
pub fn generate_session_id(epoch_ms: u64) -> SessionId {
    SessionId::new(format!("session-{epoch_ms}"))
}

/// One entry in a session's append-only completion log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedDirectiveSummary {
    pub directive_id: DirectiveId,
    pub slug: String,
    pub task: String,
    pub success: bool,
    pub duration_ms: u64,
    pub tokens_in: Option<u64>,
    pub tokens_out: Option<u64>,
    pub cost: Option<f64>,
    /// First 200 characters of the rendered output.
    pub output_tail: String,
    pub completed_at: DateTime<Utc>,
}

impl CompletedDirectiveSummary {
    pub fn new(directive_id: DirectiveId, slug: impl Into<String>, task: impl Into<String>, output: &str) -> Self {
        let output_tail: String = output.chars().take(200).collect();
        Self {
            directive_id,
            slug: slug.into(),
            task: task.into(),
            success: true,
            duration_ms: 0,
            tokens_in: None,
            tokens_out: None,
            cost: None,
            output_tail,
            completed_at: Utc::now(),
        }
    }

    crate::setters! {
        set { success: bool, duration_ms: u64 }
        option { tokens_in: u64, tokens_out: u64, cost: f64 }
    }
}

/// One line in a session's execution history (distinct from the completion
/// log: this tracks every dispatch attempt, not just completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub directive_id: DirectiveId,
    pub action: String,
    pub duration_ms: u64,
}

/// The bag of state shared by every directive produced from one
/// decomposition call (§3, §4.3). Created once by the decomposer, appended
/// by the execution loop after each directive completes, never deleted.
/// Loss of the backing file is advisory, not fatal — the context block it
/// feeds into dispatch is always "best effort".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    /// The originating to-do list, verbatim (id, content, status, priority
    /// tuples are the bridge's concern; this just keeps the raw payload).
    #[serde(default)]
    pub originating_todos: Vec<TodoRef>,
    /// external-todo id -> directive id.
    #[serde(default)]
    pub todo_directives: HashMap<String, DirectiveId>,
    #[serde(default)]
    pub completed_directives: Vec<CompletedDirectiveSummary>,
    #[serde(default)]
    pub knowledge_base: HashMap<String, String>,
    #[serde(default)]
    pub execution_history: Vec<ExecutionHistoryEntry>,
}

/// A reference to one to-do entry as recorded in the session context;
/// the bridge owns the richer live to-do representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoRef {
    pub id: String,
    pub content: String,
}

impl SessionContext {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            created_at: Utc::now(),
            originating_todos: Vec::new(),
            todo_directives: HashMap::new(),
            completed_directives: Vec::new(),
            knowledge_base: HashMap::new(),
            execution_history: Vec::new(),
        }
    }

    /// Append a completion summary. The spec requires this happen before
    /// the directive's file is relocated to a terminal folder (§5).
    pub fn record_completion(&mut self, summary: CompletedDirectiveSummary) {
        self.completed_directives.push(summary);
    }

    pub fn record_history(&mut self, directive_id: DirectiveId, action: impl Into<String>, duration_ms: u64) {
        self.execution_history.push(ExecutionHistoryEntry {
            timestamp: Utc::now(),
            directive_id,
            action: action.into(),
            duration_ms,
        });
    }

    pub fn set_knowledge(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.knowledge_base.insert(key.into(), value.into());
    }

    pub fn knowledge(&self, key: &str) -> Option<&str> {
        self.knowledge_base.get(key).map(String::as_str)
    }

    /// Up to the last five completed-directive summaries, most recent last.
    pub fn recent_summaries(&self, n: usize) -> &[CompletedDirectiveSummary] {
        let len = self.completed_directives.len();
        &self.completed_directives[len.saturating_sub(n)..]
    }

    /// Resolve a prerequisite reference (id, slug, or to-do id — matching
    /// the union semantics `DirectiveStore::prerequisites_satisfied` applies
    /// to the same field) to its completion summary, if the directive has
    /// completed. The decomposer and the bridge both store the *slug* in a
    /// directive's `prerequisites`, so the slug arm is the one that matters
    /// in practice; id and to-do-id stay as fallbacks for callers that pass
    /// either of those instead.
    pub fn resolve_prerequisite(&self, reference: &str) -> Option<&CompletedDirectiveSummary> {
        if let Some(directive_id) = self.todo_directives.get(reference) {
            if let Some(summary) =
                self.completed_directives.iter().find(|s| s.directive_id == *directive_id)
            {
                return Some(summary);
            }
        }
        if let Some(summary) = self.completed_directives.iter().find(|s| s.directive_id == reference) {
            return Some(summary);
        }
        self.completed_directives.iter().find(|s| s.slug == reference)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
