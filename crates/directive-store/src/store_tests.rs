// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use directive_core::{
    BasicSanitizer, Directive, DirectiveBuilder, DirectiveStatus, OutputArtifact,
    PlaceholderRenderer, Priority, Sanitizer, TemplateError, TemplateRenderer,
};
use tempfile::tempdir;

use super::*;

struct StubRenderer;

impl TemplateRenderer for StubRenderer {
    fn render(&self, name: &str, _vars: &HashMap<String, String>) -> Result<String, TemplateError> {
        Err(TemplateError::UnknownTemplate(name.to_string()))
    }
}

fn new_store() -> (tempfile::TempDir, DirectiveStore) {
    let dir = tempdir().expect("tempdir");
    let store = DirectiveStore::new(dir.path());
    store.init().expect("init");
    (dir, store)
}

#[test]
fn init_creates_every_lifecycle_folder() {
    let (dir, _store) = new_store();
    for name in ["new", "success", "failed", "slow", "exemplar", "processing"] {
        assert!(dir.path().join(name).is_dir(), "missing {name}");
    }
}

#[test]
fn write_new_does_not_collide_artifacts_for_directives_with_the_same_slug() {
    // Duplicate/near-duplicate to-do content or structural-mode sentence
    // fragments can slugify to the same string; the artifact filename must
    // still be unique per directive.
    let (_dir, store) = new_store();
    let first = DirectiveBuilder::default().slug("write-the-readme").task("write the readme").build();
    let second = DirectiveBuilder::default().slug("write-the-readme").task("write the readme, again").build();

    let (_, first_artifact) =
        store.write_new(&first, &BasicSanitizer, &PlaceholderRenderer::new()).expect("write_new first");
    let (_, second_artifact) =
        store.write_new(&second, &BasicSanitizer, &PlaceholderRenderer::new()).expect("write_new second");

    assert_ne!(first_artifact, second_artifact, "same-slug directives must not share an artifact file");
    assert!(first_artifact.exists(), "writing the second directive must not have overwritten the first's artifact");
    assert!(second_artifact.exists());
}

#[test]
fn write_new_places_directive_and_artifact_in_new() {
    let (_dir, store) = new_store();
    let directive = DirectiveBuilder::default().slug("fix-login").task("fix the login bug").build();
    let (directive_path, artifact_path) = store
        .write_new(&directive, &BasicSanitizer, &PlaceholderRenderer::new())
        .expect("write_new");

    assert!(directive_path.exists());
    assert!(artifact_path.exists());
    assert!(directive_path.starts_with(store.root().join("new")));
    let text = std::fs::read_to_string(&directive_path).unwrap();
    assert!(text.contains("fix the login bug"));
}

#[test]
fn enumerate_ready_returns_directives_with_no_prerequisites() {
    let (_dir, store) = new_store();
    let directive = DirectiveBuilder::default().slug("alpha").task("do alpha").build();
    store.write_new(&directive, &BasicSanitizer, &PlaceholderRenderer::new()).unwrap();

    let ready = store.enumerate_ready();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].slug, "alpha");
    assert_eq!(ready[0].task, "do alpha");
}

#[test]
fn enumerate_ready_excludes_directive_with_unmet_prerequisite() {
    let (_dir, store) = new_store();
    let mut directive = DirectiveBuilder::default().slug("beta").task("do beta").build();
    directive.prerequisites = vec!["nonexistent-slug".to_string()];
    store.write_new(&directive, &BasicSanitizer, &PlaceholderRenderer::new()).unwrap();

    assert!(store.enumerate_ready().is_empty());
}

#[test]
fn enumerate_ready_includes_directive_once_prerequisite_lands_in_a_terminal_folder() {
    let (_dir, store) = new_store();

    let prereq = DirectiveBuilder::default().slug("prereq").task("first").build();
    let (prereq_dir_path, prereq_artifact_path) =
        store.write_new(&prereq, &BasicSanitizer, &PlaceholderRenderer::new()).unwrap();
    store.relocate(&prereq_dir_path, &prereq_artifact_path, LifecycleState::Success).unwrap();

    let mut dependent = DirectiveBuilder::default().slug("dependent").task("second").build();
    dependent.prerequisites = vec!["prereq".to_string()];
    store.write_new(&dependent, &BasicSanitizer, &PlaceholderRenderer::new()).unwrap();

    let ready = store.enumerate_ready();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].slug, "dependent");
}

#[test]
fn enumerate_ready_sorts_by_priority_then_age_then_id() {
    let (_dir, store) = new_store();
    let low = DirectiveBuilder::default().slug("low-pri").task("t").priority(Priority::Low).build();
    let high = DirectiveBuilder::default().slug("high-pri").task("t").priority(Priority::High).build();
    let medium = DirectiveBuilder::default().slug("medium-pri").task("t").priority(Priority::Medium).build();

    for d in [&low, &high, &medium] {
        store.write_new(d, &BasicSanitizer, &PlaceholderRenderer::new()).unwrap();
    }

    let ready = store.enumerate_ready();
    assert_eq!(ready.len(), 3);
    assert_eq!(ready[0].slug, "high-pri");
    assert_eq!(ready[1].slug, "medium-pri");
    assert_eq!(ready[2].slug, "low-pri");
}

#[test]
fn claim_round_trips_file_back_into_new() {
    let (_dir, store) = new_store();
    let directive = DirectiveBuilder::default().slug("gamma").task("do gamma").build();
    store.write_new(&directive, &BasicSanitizer, &PlaceholderRenderer::new()).unwrap();

    let claimed = store.claim(&directive.id).expect("claim ok").expect("claimed");
    assert_eq!(claimed.directive.slug, "gamma");
    assert!(claimed.directive_path.starts_with(store.root().join("new")));
    assert!(store.root().join("processing").read_dir().unwrap().next().is_none());
}

#[test]
fn claim_returns_none_for_unknown_id() {
    let (_dir, store) = new_store();
    let bogus = Directive::builder().build().id;
    assert!(store.claim(&bogus).unwrap().is_none());
}

#[test]
fn relocate_moves_both_files_to_the_target_folder() {
    let (_dir, store) = new_store();
    let directive = DirectiveBuilder::default().slug("delta").task("do delta").build();
    let (directive_path, artifact_path) =
        store.write_new(&directive, &BasicSanitizer, &PlaceholderRenderer::new()).unwrap();

    let (new_directive_path, new_artifact_path) =
        store.relocate(&directive_path, &artifact_path, LifecycleState::Failed).unwrap();

    assert!(!directive_path.exists());
    assert!(!artifact_path.exists());
    assert!(new_directive_path.starts_with(store.root().join("failed")));
    assert!(new_artifact_path.starts_with(store.root().join("failed")));
}

#[test]
fn rewrite_status_preserves_other_header_fields() {
    let (_dir, store) = new_store();
    let directive = DirectiveBuilder::default().slug("epsilon").task("do epsilon").priority(Priority::High).build();
    let (directive_path, _artifact_path) =
        store.write_new(&directive, &BasicSanitizer, &PlaceholderRenderer::new()).unwrap();

    store.rewrite_status(&directive_path, DirectiveStatus::Completed).unwrap();

    let text = std::fs::read_to_string(&directive_path).unwrap();
    let (parsed, _) = parse_directive_file(&text).unwrap();
    assert_eq!(parsed.status, DirectiveStatus::Completed);
    assert_eq!(parsed.priority, Priority::High);
    assert_eq!(parsed.slug, "epsilon");
}

#[test]
fn write_artifact_falls_back_to_builtin_template_when_renderer_fails() {
    let (_dir, store) = new_store();
    let directive = DirectiveBuilder::default().slug("zeta").task("do zeta").build();
    let artifact = OutputArtifact::placeholder(&directive).status(DirectiveStatus::Completed).result("done");
    let artifact_path = store.root().join("new").join("output-zeta.md");

    store.write_artifact(&artifact_path, &artifact, &StubRenderer).unwrap();

    let text = std::fs::read_to_string(&artifact_path).unwrap();
    assert!(text.contains("zeta"));
    assert!(text.contains("done"));
}
