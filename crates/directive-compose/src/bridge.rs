// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Bridge (C5): bidirectional mapping between an external to-do list
//! and directive records (§4.7). Forward turns to-dos into a directive
//! chain; backward/sync mirrors a directive's new status onto its
//! originating to-do; scan reconstructs a to-do list by walking every
//! lifecycle folder.

use chrono::Utc;
use directive_core::{Directive, DirectiveId, DirectiveStatus, Priority, Sanitizer, SessionContext, TodoRef};
use directive_store::{DirectiveStore, LifecycleState};

/// One entry from the external to-do list (§4.7). `Bridge` owns this
/// richer live representation; [`TodoRef`] in the session context is just
/// the (id, content) pair worth persisting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTodo {
    pub id: String,
    pub content: String,
    pub status: TodoStatus,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoStatus {
    Pending,
    Completed,
}

pub struct Bridge;

impl Bridge {
    /// Emit one directive per to-do, in order, recording each to-do's id
    /// and ordinal and chaining prerequisites to the preceding directive
    /// in the same batch (§4.7).
    pub fn forward(
        todos: &[ExternalTodo],
        session: &mut SessionContext,
        sanitizer: &dyn Sanitizer,
    ) -> Vec<Directive> {
        let total = todos.len() as u32;
        let mut previous_slug: Option<String> = None;
        let mut directives = Vec::with_capacity(todos.len());

        for (index, todo) in todos.iter().enumerate() {
            let sanitized_task = sanitizer.sanitize_prompt(&todo.content).unwrap_or_else(|_| todo.content.clone());
            let slug_source = slugify(&sanitized_task);
            let slug = if slug_source.is_empty() {
                sanitizer.generate_safe_id(&sanitized_task, "directive-")
            } else {
                slug_source
            };

            let directive = Directive {
                id: DirectiveId::new(),
                slug: slug.clone(),
                task: sanitized_task,
                status: DirectiveStatus::Pending,
                priority: todo.priority,
                created: Utc::now(),
                platform: None,
                model: None,
                prerequisites: previous_slug.clone().into_iter().collect(),
                todo_id: Some(todo.id.clone()),
                session_id: Some(session.session_id.clone()),
                todo_index: Some(index as u32),
                total_todos: Some(total),
            };

            session.todo_directives.insert(todo.id.clone(), directive.id);
            session.originating_todos.push(TodoRef { id: todo.id.clone(), content: todo.content.clone() });

            previous_slug = Some(slug);
            directives.push(directive);
        }

        directives
    }

    /// Mirror a directive's new status onto the in-memory to-do it was
    /// created from. Returns `false` if no to-do in `todos` is linked to
    /// `directive_id` (not an error — the directive may not have
    /// originated from this bridge's to-do list).
    pub fn sync(todos: &mut [ExternalTodo], session: &SessionContext, directive_id: DirectiveId, new_status: DirectiveStatus) -> bool {
        let Some(todo_id) = session
            .todo_directives
            .iter()
            .find(|(_, did)| **did == directive_id)
            .map(|(tid, _)| tid.clone())
        else {
            return false;
        };

        let Some(todo) = todos.iter_mut().find(|t| t.id == todo_id) else { return false };
        todo.status = match new_status {
            DirectiveStatus::Completed => TodoStatus::Completed,
            DirectiveStatus::Pending | DirectiveStatus::Failed => TodoStatus::Pending,
        };
        true
    }

    /// Walk every lifecycle folder in `store` and project a to-do list out
    /// of every directive that carries a recorded to-do id. Status is
    /// inferred from the containing folder: `completed` for any
    /// success-class folder (`success`, `slow`, `exemplar`), `pending`
    /// otherwise (§4.7).
    pub fn scan(store: &DirectiveStore) -> Vec<ExternalTodo> {
        store
            .scan_all()
            .into_iter()
            .filter_map(|(directive, state)| {
                let todo_id = directive.todo_id?;
                let status = match state {
                    LifecycleState::Success | LifecycleState::Slow | LifecycleState::Exemplar => TodoStatus::Completed,
                    LifecycleState::New | LifecycleState::Failed => TodoStatus::Pending,
                };
                Some(ExternalTodo { id: todo_id, content: directive.task, status, priority: directive.priority })
            })
            .collect()
    }
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
    let truncated: String = slug.chars().take(48).collect();
    truncated.trim_end_matches('-').to_string()
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
