// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use directive_core::{BasicSanitizer, DirectiveStatus, SessionContext, SessionId};
use directive_store::DirectiveStore;
use tempfile::TempDir;

use super::*;

fn todos() -> Vec<ExternalTodo> {
    vec![
        ExternalTodo { id: "todo-1".to_string(), content: "Fix the login bug".to_string(), status: TodoStatus::Pending, priority: Priority::High },
        ExternalTodo { id: "todo-2".to_string(), content: "Write the docs".to_string(), status: TodoStatus::Pending, priority: Priority::Low },
    ]
}

#[test]
fn forward_emits_one_directive_per_todo_in_order_with_chained_prerequisites() {
    let mut session = SessionContext::new(SessionId::new("session-1"));
    let sanitizer = BasicSanitizer;
    let directives = Bridge::forward(&todos(), &mut session, &sanitizer);

    assert_eq!(directives.len(), 2);
    assert_eq!(directives[0].todo_id.as_deref(), Some("todo-1"));
    assert_eq!(directives[0].priority, Priority::High);
    assert!(directives[0].prerequisites.is_empty());

    assert_eq!(directives[1].todo_id.as_deref(), Some("todo-2"));
    assert_eq!(directives[1].priority, Priority::Low);
    assert_eq!(directives[1].prerequisites, vec![directives[0].slug.clone()]);

    assert_eq!(session.todo_directives.get("todo-1"), Some(&directives[0].id));
    assert_eq!(session.originating_todos.len(), 2);
}

#[test]
fn sync_rewrites_the_linked_todo_status() {
    let mut session = SessionContext::new(SessionId::new("session-1"));
    let sanitizer = BasicSanitizer;
    let directives = Bridge::forward(&todos(), &mut session, &sanitizer);
    let mut live_todos = todos();

    let updated = Bridge::sync(&mut live_todos, &session, directives[0].id, DirectiveStatus::Completed);

    assert!(updated);
    assert_eq!(live_todos[0].status, TodoStatus::Completed);
    assert_eq!(live_todos[1].status, TodoStatus::Pending);
}

#[test]
fn sync_returns_false_for_an_unlinked_directive() {
    let session = SessionContext::new(SessionId::new("session-1"));
    let mut live_todos = todos();
    let unrelated_id = DirectiveId::new();

    let updated = Bridge::sync(&mut live_todos, &session, unrelated_id, DirectiveStatus::Completed);
    assert!(!updated);
}

#[test]
fn scan_projects_a_todo_list_with_status_from_the_containing_folder() {
    let dir = TempDir::new().expect("tempdir");
    let store = DirectiveStore::new(dir.path());
    store.init().expect("init");
    let sanitizer = BasicSanitizer;
    let template = directive_core::PlaceholderRenderer::default();

    let mut session = SessionContext::new(SessionId::new("session-1"));
    let directives = Bridge::forward(&todos(), &mut session, &sanitizer);

    let (path0, artifact0) = store.write_new(&directives[0], &sanitizer, &template).expect("write first");
    store.relocate(&path0, &artifact0, LifecycleState::Success).expect("relocate first");
    store.write_new(&directives[1], &sanitizer, &template).expect("write second");

    let scanned = Bridge::scan(&store);

    assert_eq!(scanned.len(), 2);
    let first = scanned.iter().find(|t| t.id == "todo-1").expect("todo-1 present");
    assert_eq!(first.status, TodoStatus::Completed);
    let second = scanned.iter().find(|t| t.id == "todo-2").expect("todo-2 present");
    assert_eq!(second.status, TodoStatus::Pending);
}
