// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn session_id_display() {
    let id = SessionId::new("test-session");
    assert_eq!(id.to_string(), "test-session");
}

#[test]
fn session_id_equality() {
    let id1 = SessionId::new("session-1");
    let id2 = SessionId::new("session-1");
    let id3 = SessionId::new("session-2");

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
}

#[test]
fn session_id_from_str() {
    let id: SessionId = "test".into();
    assert_eq!(id.as_str(), "test");
}

#[test]
fn session_id_serde() {
    let id = SessionId::new("my-session");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"my-session\"");

    let parsed: SessionId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn generate_session_id_embeds_epoch() {
    let id = generate_session_id(1_700_000_000_000);
    assert_eq!(id.as_str(), "session-1700000000000");
}

#[test]
fn recent_summaries_returns_at_most_last_n() {
    let mut ctx = SessionContext::new(SessionId::new("s1"));
    for i in 0..7 {
        ctx.record_completion(CompletedDirectiveSummary::new(
            DirectiveId::new(),
            format!("slug-{i}"),
            format!("task {i}"),
            "result",
        ));
    }
    assert_eq!(ctx.recent_summaries(5).len(), 5);
    assert_eq!(ctx.recent_summaries(5).last().unwrap().task, "task 6");
}

#[test]
fn knowledge_base_set_and_get() {
    let mut ctx = SessionContext::new(SessionId::new("s1"));
    assert_eq!(ctx.knowledge("key"), None);
    ctx.set_knowledge("key", "value");
    assert_eq!(ctx.knowledge("key"), Some("value"));
}

#[test]
fn resolve_prerequisite_by_todo_id_or_directive_id() {
    let mut ctx = SessionContext::new(SessionId::new("s1"));
    let directive_id = DirectiveId::new();
    ctx.todo_directives.insert("todo-1".to_string(), directive_id);
    let mut summary = CompletedDirectiveSummary::new(directive_id, "task-slug", "task", "result");
    summary = summary.duration_ms(500);
    ctx.record_completion(summary);

    assert!(ctx.resolve_prerequisite("todo-1").is_some());
    assert!(ctx.resolve_prerequisite(&directive_id.to_string()).is_some());
    assert!(ctx.resolve_prerequisite("nonexistent").is_none());
}

#[test]
fn resolve_prerequisite_by_slug() {
    // The decomposer and the bridge both record a directive's prerequisite
    // as the predecessor's slug, never its id, so this is the lookup path
    // that matters for a real chain.
    let mut ctx = SessionContext::new(SessionId::new("s1"));
    let directive_id = DirectiveId::new();
    let summary = CompletedDirectiveSummary::new(directive_id, "build-the-api", "task", "result");
    ctx.record_completion(summary);

    assert!(ctx.resolve_prerequisite("build-the-api").is_some());
}

#[test]
fn completed_summary_truncates_output_to_200_chars() {
    let long_output = "x".repeat(500);
    let summary = CompletedDirectiveSummary::new(DirectiveId::new(), "slug", "task", &long_output);
    assert_eq!(summary.output_tail.len(), 200);
}
