// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use directive_core::{Directive, FakeClock, SessionContext, SessionId};

use super::*;

fn store(temp: &tempfile::TempDir) -> SessionStore {
    SessionStore::new(temp.path().join("sessions"))
}

#[test]
fn resume_or_create_makes_a_fresh_session_when_none_exists() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = store(&temp);
    let clock = FakeClock::new();

    let session = store.resume_or_create(&clock).expect("resume_or_create");

    assert!(session.completed_directives.is_empty());
    assert!(session.session_id.as_str().starts_with(SESSION_PREFIX));
}

#[test]
fn persist_then_resume_round_trips_the_most_recent_session() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = store(&temp);
    let clock = FakeClock::new();

    let mut session = store.resume_or_create(&clock).expect("resume_or_create");
    session.set_knowledge("stack", "rust");
    store.persist(&session).expect("persist");

    let resumed = store.resume_or_create(&clock).expect("resume_or_create");
    assert_eq!(resumed.session_id, session.session_id);
    assert_eq!(resumed.knowledge("stack"), Some("rust"));
}

#[test]
fn resume_or_create_picks_the_most_recently_modified_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = store(&temp);

    let older = SessionContext::new(SessionId::new("session-1"));
    store.persist(&older).expect("persist older");
    std::thread::sleep(std::time::Duration::from_millis(10));
    let newer = SessionContext::new(SessionId::new("session-2"));
    store.persist(&newer).expect("persist newer");

    let resumed = store.resume_or_create(&FakeClock::new()).expect("resume_or_create");
    assert_eq!(resumed.session_id, newer.session_id);
}

#[test]
fn load_or_create_fetches_by_id_regardless_of_recency() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = store(&temp);

    let first = SessionContext::new(SessionId::new("session-1"));
    store.persist(&first).expect("persist first");
    std::thread::sleep(std::time::Duration::from_millis(10));
    let second = SessionContext::new(SessionId::new("session-2"));
    store.persist(&second).expect("persist second");

    let loaded = store.load_or_create(&SessionId::new("session-1")).expect("load_or_create");
    assert_eq!(loaded.session_id, first.session_id);
}

#[test]
fn load_or_create_makes_a_fresh_bag_for_an_unknown_id() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = store(&temp);

    let loaded = store.load_or_create(&SessionId::new("session-never-seen")).expect("load_or_create");
    assert_eq!(loaded.session_id, SessionId::new("session-never-seen"));
    assert!(loaded.completed_directives.is_empty());
}

fn directive_with_prerequisites(prerequisites: &[&str]) -> Directive {
    let mut d = Directive::builder().slug("dir-b").task("second directive").build();
    d.prerequisites = prerequisites.iter().map(|s| s.to_string()).collect();
    d
}

#[test]
fn context_block_includes_session_id_and_start_time() {
    let session = SessionContext::new(SessionId::new("session-42"));
    let directive = Directive::builder().build();

    let block = context_block(&session, &directive);

    assert!(block.contains("session-42"));
    assert!(block.contains(&session.created_at.to_rfc3339()));
}

#[test]
fn context_block_lists_up_to_five_recent_completions() {
    let mut session = SessionContext::new(SessionId::new("session-1"));
    for i in 0..7 {
        let mut summary = directive_core::test_support::completion_summary(
            directive_core::DirectiveId::new(),
            &format!("slug-{i}"),
            &format!("task {i}"),
        );
        summary = summary.duration_ms(1_000);
        session.record_completion(summary);
    }
    let directive = Directive::builder().build();

    let block = context_block(&session, &directive);

    assert!(block.contains("task 2"));
    assert!(block.contains("task 6"));
    assert!(!block.contains("task 0"));
    assert!(!block.contains("task 1"));
}

#[test]
fn context_block_resolves_prerequisites_to_their_summary() {
    let mut session = SessionContext::new(SessionId::new("session-1"));
    let prereq_id = directive_core::DirectiveId::new();
    session.record_completion(directive_core::test_support::completion_summary(prereq_id, "dir-a", "first directive"));
    let directive = directive_with_prerequisites(&[prereq_id.to_string().as_str()]);

    let block = context_block(&session, &directive);

    assert!(block.contains("completed"));
}

#[test]
fn context_block_resolves_prerequisites_stored_as_a_slug() {
    // The decomposer and the bridge both chain directives by slug, not by
    // id, so this is the resolution path a real pipeline run actually uses.
    let mut session = SessionContext::new(SessionId::new("session-1"));
    let prereq_id = directive_core::DirectiveId::new();
    session.record_completion(directive_core::test_support::completion_summary(prereq_id, "dir-a", "first directive"));
    let directive = directive_with_prerequisites(&["dir-a"]);

    let block = context_block(&session, &directive);

    assert!(block.contains("completed"));
}

#[test]
fn context_block_marks_unresolved_prerequisites() {
    let session = SessionContext::new(SessionId::new("session-1"));
    let directive = directive_with_prerequisites(&["missing-prereq"]);

    let block = context_block(&session, &directive);

    assert!(block.contains("not yet resolved"));
}
