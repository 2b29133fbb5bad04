// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Context persistence and context-block assembly (C6, §4.3).
//!
//! On start-up the most recently modified session file is resumed;
//! otherwise a new one is created. Persistence is atomic (write to a
//! temporary file, rename over the canonical name); loss of the file is
//! advisory, never fatal, since the context block it feeds is best-effort.

use std::fs;
use std::path::{Path, PathBuf};

use directive_core::{generate_session_id, Clock, Directive, SessionContext, SessionId};

use crate::error::EngineError;

const SESSION_PREFIX: &str = "session-";
const SESSION_SUFFIX: &str = ".json";

/// Turn `session_id` into its canonical filename stem, independent of
/// whether the id already carries the `session-` prefix (directive
/// headers store the id verbatim; [`generate_session_id`] already
/// includes the prefix).
fn filename_stem(id: &SessionId) -> &str {
    id.as_str().trim_start_matches(SESSION_PREFIX)
}

/// Owns the on-disk session-context directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resume the most recently modified session file under `root`, or
    /// create a fresh one with a timestamp-derived id if none exists
    /// (§4.3).
    pub fn resume_or_create(&self, clock: &impl Clock) -> Result<SessionContext, EngineError> {
        fs::create_dir_all(&self.root)?;
        match self.most_recent_session_file()? {
            Some(path) => {
                let text = fs::read_to_string(&path)?;
                Ok(serde_json::from_str(&text)?)
            }
            None => Ok(SessionContext::new(generate_session_id(clock.epoch_ms()))),
        }
    }

    fn most_recent_session_file(&self) -> Result<Option<PathBuf>, EngineError> {
        let mut best: Option<(std::time::SystemTime, PathBuf)> = None;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if !is_session_file(&path) {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            let replace = match &best {
                Some((best_time, _)) => modified > *best_time,
                None => true,
            };
            if replace {
                best = Some((modified, path));
            }
        }
        Ok(best.map(|(_, path)| path))
    }

    /// Persist `session` atomically: write to a sibling temp file, then
    /// rename over the canonical session file (§4.3).
    pub fn persist(&self, session: &SessionContext) -> Result<(), EngineError> {
        fs::create_dir_all(&self.root)?;
        let path = self.session_path(&session.session_id);
        let tmp_path = path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(session)?;
        fs::write(&tmp_path, text)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn session_path(&self, id: &SessionId) -> PathBuf {
        self.root.join(format!("{SESSION_PREFIX}{}{SESSION_SUFFIX}", filename_stem(id)))
    }

    /// Load the session `id` belongs to, creating a fresh (empty) bag if
    /// its file doesn't exist yet. Used by the execution loop (C7) to
    /// resolve a directive's own `session_id` rather than guessing at the
    /// most-recently-modified file, which [`resume_or_create`] is for
    /// (the decomposer's start-up case, §4.3).
    pub fn load_or_create(&self, session_id: &SessionId) -> Result<SessionContext, EngineError> {
        fs::create_dir_all(&self.root)?;
        let path = self.session_path(session_id);
        if path.exists() {
            let text = fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&text)?)
        } else {
            Ok(SessionContext::new(session_id.clone()))
        }
    }
}

fn is_session_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(SESSION_PREFIX) && n.ends_with(SESSION_SUFFIX))
            .unwrap_or(false)
}

/// Build the markdown-shaped context block prepended to a directive's task
/// text before dispatch (§4.3): session id and start time, up to the last
/// five completed-directive summaries, related external to-dos, any
/// knowledge-base entries, and a resolution of each prerequisite to its
/// completed-directive summary.
pub fn context_block(session: &SessionContext, directive: &Directive) -> String {
    let mut block = String::new();
    block.push_str("## Session Context\n\n");
    block.push_str(&format!("- session: {}\n", session.session_id));
    block.push_str(&format!("- started: {}\n", session.created_at.to_rfc3339()));

    let recent = session.recent_summaries(5);
    if !recent.is_empty() {
        block.push_str("\n### Recent completions\n\n");
        for summary in recent {
            let outcome = if summary.success { "ok" } else { "failed" };
            block.push_str(&format!("- [{outcome}] {} ({}ms): {}\n", summary.task, summary.duration_ms, summary.output_tail));
        }
    }

    if !session.originating_todos.is_empty() {
        block.push_str("\n### Related to-dos\n\n");
        for todo in &session.originating_todos {
            block.push_str(&format!("- {}: {}\n", todo.id, todo.content));
        }
    }

    if !session.knowledge_base.is_empty() {
        block.push_str("\n### Knowledge base\n\n");
        for (key, value) in &session.knowledge_base {
            block.push_str(&format!("- {key}: {value}\n"));
        }
    }

    if !directive.prerequisites.is_empty() {
        block.push_str("\n### Prerequisites\n\n");
        for reference in &directive.prerequisites {
            match session.resolve_prerequisite(reference) {
                Some(summary) => block.push_str(&format!("- {reference}: completed — {}\n", summary.output_tail)),
                None => block.push_str(&format!("- {reference}: not yet resolved\n")),
            }
        }
    }

    block
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
