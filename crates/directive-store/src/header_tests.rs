// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use directive_core::DirectiveBuilder;

fn sample() -> Directive {
    let mut d = Directive::builder().slug("fix-login").task("fix the login bug").priority(Priority::High).build();
    d.prerequisites = vec!["prior-slug".to_string()];
    d
}

#[test]
fn round_trip_preserves_header_fields() {
    let directive = sample();
    let text = serialize_directive_file(&directive, "# fix-login\n\n## Prompt\n\nfix the login bug\n");
    let (parsed, body) = parse_directive_file(&text).unwrap();

    assert_eq!(parsed.id, directive.id);
    assert_eq!(parsed.slug, directive.slug);
    assert_eq!(parsed.status, directive.status);
    assert_eq!(parsed.priority, directive.priority);
    assert_eq!(parsed.prerequisites, directive.prerequisites);
    assert!(body.contains("fix the login bug"));
}

#[test]
fn missing_delimiter_is_rejected() {
    let err = parse_directive_file("no header here\njust body text").unwrap_err();
    assert!(matches!(err, HeaderError::MissingDelimiter));
}

#[test]
fn single_delimiter_is_rejected() {
    let err = parse_directive_file("---\nid: dir-x\nstatus: pending\n").unwrap_err();
    assert!(matches!(err, HeaderError::MissingDelimiter));
}

#[test]
fn duplicate_key_is_rejected() {
    let text = "---\nid: dir-a\nid: dir-b\nstatus: pending\npriority: low\ncreated: 2026-01-01T00:00:00Z\nslug: x\n---\nbody\n";
    let err = parse_directive_file(text).unwrap_err();
    assert!(matches!(err, HeaderError::DuplicateKey(_)));
}

#[test]
fn missing_required_field_is_rejected() {
    let text = "---\nstatus: pending\npriority: low\ncreated: 2026-01-01T00:00:00Z\nslug: x\n---\nbody\n";
    let err = parse_directive_file(text).unwrap_err();
    assert!(matches!(err, HeaderError::MissingField("id")));
}

#[test]
fn invalid_priority_value_is_rejected() {
    let text = "---\nid: dir-a\nstatus: pending\npriority: urgent\ncreated: 2026-01-01T00:00:00Z\nslug: x\n---\nbody\n";
    let err = parse_directive_file(text).unwrap_err();
    assert!(matches!(err, HeaderError::InvalidField { field: "priority", .. }));
}

#[test]
fn empty_prerequisites_serialize_without_a_line() {
    let directive = DirectiveBuilder::default().slug("x").task("y").build();
    let text = serialize_directive_file(&directive, "body\n");
    assert!(!text.contains("prerequisites:"));
}

#[test]
fn prerequisites_list_round_trips() {
    let mut directive = sample();
    directive.prerequisites = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let text = serialize_directive_file(&directive, "body\n");
    let (parsed, _) = parse_directive_file(&text).unwrap();
    assert_eq!(parsed.prerequisites, vec!["a", "b", "c"]);
}
