// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    high = { "high", Priority::High },
    medium = { "medium", Priority::Medium },
    low = { "low", Priority::Low },
    mixed_case = { "HiGh", Priority::High },
)]
fn priority_parses(input: &str, expected: Priority) {
    assert_eq!(input.parse::<Priority>().unwrap(), expected);
}

#[test]
fn priority_rank_orders_high_over_low() {
    assert!(Priority::High.rank() > Priority::Medium.rank());
    assert!(Priority::Medium.rank() > Priority::Low.rank());
}

#[test]
fn priority_unparseable_ranks_as_low() {
    assert_eq!(rank_or_unknown(None), Priority::Low.rank());
    assert_eq!(rank_or_unknown("bogus".parse::<Priority>().ok()), Priority::Low.rank());
}

#[test]
fn status_display_matches_header_convention() {
    assert_eq!(DirectiveStatus::Pending.to_string(), "pending");
    assert_eq!(DirectiveStatus::Completed.to_string(), "completed");
    assert_eq!(DirectiveStatus::Failed.to_string(), "failed");
}

#[test]
fn status_roundtrips_through_display_and_parse() {
    for s in [DirectiveStatus::Pending, DirectiveStatus::Completed, DirectiveStatus::Failed] {
        assert_eq!(s.to_string().parse::<DirectiveStatus>().unwrap(), s);
    }
}

#[test]
fn prerequisites_satisfied_matches_by_id_slug_or_todo_id() {
    let directive = Directive::builder()
        .slug("write-docs")
        .task("write docs")
        .build();
    let mut directive = directive;
    directive.prerequisites = vec!["dir-abc".to_string(), "fix-login".to_string(), "todo-9".to_string()];

    assert!(!directive.prerequisites_satisfied(&[], &[], &[]));
    assert!(directive.prerequisites_satisfied(&["dir-abc"], &["fix-login"], &["todo-9"]));
    // a subset that's still missing one reference is not satisfied
    assert!(!directive.prerequisites_satisfied(&["dir-abc"], &["fix-login"], &[]));
}

#[test]
fn placeholder_artifact_links_back_to_its_directive() {
    let directive = Directive::builder().build();
    let artifact = OutputArtifact::placeholder(&directive);
    assert_eq!(artifact.directive_id, directive.id);
    assert_eq!(artifact.id, format!("output-{}", directive.id));
    assert_eq!(artifact.status, DirectiveStatus::Pending);
    assert!(artifact.tokens_in.is_none());
}

#[test]
fn builder_produces_fresh_ids_each_call() {
    let a = Directive::builder().build();
    let b = Directive::builder().build();
    assert_ne!(a.id, b.id);
}
