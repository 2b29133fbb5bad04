// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One serializer, one parser, for the directive file format (§6, §9: "do
//! not re-serialize headers by ad-hoc substring manipulation; specify
//! exactly one serializer and one parser... reject ambiguity").
//!
//! Header block: a line containing exactly `---` opens it, the next such
//! line closes it; in between, one `key: value` pair per line. Anything
//! after the closing delimiter is the body, kept byte-for-byte.

use chrono::{DateTime, Utc};

use directive_core::{Directive, DirectiveId, DirectiveStatus, Priority, SessionId};

const DELIMITER: &str = "---";

#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("no header delimiter found")]
    MissingDelimiter,
    #[error("ambiguous header: more than two `---` delimiter lines before body content")]
    AmbiguousDelimiters,
    #[error("duplicate header key: {0}")]
    DuplicateKey(String),
    #[error("missing required header field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for header field {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Parse `key: value` lines between the two `---` delimiters into an
/// ordered map, rejecting duplicate keys per §9.
fn parse_kv_block(block: &str) -> Result<Vec<(String, String)>, HeaderError> {
    let mut pairs = Vec::new();
    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_string();
        let value = value.trim().to_string();
        if pairs.iter().any(|(k, _): &(String, String)| k == &key) {
            return Err(HeaderError::DuplicateKey(key));
        }
        pairs.push((key, value));
    }
    Ok(pairs)
}

fn find_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Inline list syntax: `[a, b, c]`. An absent or empty field is `[]`.
fn parse_list(value: &str) -> Vec<String> {
    let trimmed = value.trim().trim_start_matches('[').trim_end_matches(']');
    if trimmed.trim().is_empty() {
        return Vec::new();
    }
    trimmed.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

fn render_list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

/// Split a whole directive file into its header block and body text, given
/// the two `---` delimiter lines own the first two occurrences of that
/// exact line; a third bare `---` line anywhere before the body begins is
/// ambiguous and rejected (§9).
fn split_header_body(text: &str) -> Result<(&str, &str), HeaderError> {
    let mut offset = 0usize;
    let mut delimiters = Vec::new();
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches('\n').trim_end_matches('\r');
        if trimmed.trim() == DELIMITER {
            delimiters.push(offset);
            if delimiters.len() == 2 {
                break;
            }
        }
        offset += line.len();
    }
    match delimiters.as_slice() {
        [] => Err(HeaderError::MissingDelimiter),
        [_open] => Err(HeaderError::MissingDelimiter),
        [open, close] => {
            let header_start = *open + DELIMITER.len();
            let header_block = &text[header_start..*close];
            let body_start_line_end =
                text[*close..].find('\n').map(|i| *close + i + 1).unwrap_or(text.len());
            let body = &text[body_start_line_end..];
            Ok((header_block, body))
        }
        _ => Err(HeaderError::AmbiguousDelimiters),
    }
}

/// Parse a full directive file (header + body) into a [`Directive`] plus
/// its raw body text. Malformed files should be logged and skipped by the
/// caller rather than aborting the pass (§4.1).
pub fn parse_directive_file(text: &str) -> Result<(Directive, String), HeaderError> {
    let (header_block, body) = split_header_body(text)?;
    let pairs = parse_kv_block(header_block)?;

    let id = find_value(&pairs, "id").ok_or(HeaderError::MissingField("id"))?;
    let status_raw = find_value(&pairs, "status").ok_or(HeaderError::MissingField("status"))?;
    let priority_raw = find_value(&pairs, "priority").ok_or(HeaderError::MissingField("priority"))?;
    let created_raw = find_value(&pairs, "created").ok_or(HeaderError::MissingField("created"))?;
    let slug = find_value(&pairs, "slug").ok_or(HeaderError::MissingField("slug"))?;

    let status = status_raw
        .parse::<DirectiveStatus>()
        .map_err(|_| HeaderError::InvalidField { field: "status", value: status_raw.to_string() })?;
    let priority = priority_raw
        .parse::<Priority>()
        .map_err(|_| HeaderError::InvalidField { field: "priority", value: priority_raw.to_string() })?;
    let created = DateTime::parse_from_rfc3339(created_raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| HeaderError::InvalidField { field: "created", value: created_raw.to_string() })?;

    let directive = Directive {
        id: DirectiveId::from_string(id),
        slug: slug.to_string(),
        task: String::new(),
        status,
        priority,
        created,
        platform: find_value(&pairs, "platform").map(str::to_string),
        model: find_value(&pairs, "model").map(str::to_string),
        prerequisites: find_value(&pairs, "prerequisites").map(parse_list).unwrap_or_default(),
        todo_id: find_value(&pairs, "claude_todo_id").map(str::to_string),
        session_id: find_value(&pairs, "session_id").map(SessionId::new),
        todo_index: find_value(&pairs, "todo_index").and_then(|v| v.parse().ok()),
        total_todos: find_value(&pairs, "total_todos").and_then(|v| v.parse().ok()),
    };

    Ok((directive, body.to_string()))
}

/// Serialize a directive's header plus its body back into the on-disk
/// format. `task` is written into the body by the caller (the header
/// itself never repeats the task text — it lives only in the body's
/// prompt section).
pub fn serialize_directive_file(directive: &Directive, body: &str) -> String {
    let mut lines = vec![
        format!("id: {}", directive.id),
        format!("status: {}", directive.status),
        format!("priority: {}", directive.priority),
        format!("created: {}", directive.created.to_rfc3339()),
        format!("slug: {}", directive.slug),
    ];
    if let Some(platform) = &directive.platform {
        lines.push(format!("platform: {platform}"));
    }
    if let Some(model) = &directive.model {
        lines.push(format!("model: {model}"));
    }
    if let Some(todo_id) = &directive.todo_id {
        lines.push(format!("claude_todo_id: {todo_id}"));
    }
    if let Some(session_id) = &directive.session_id {
        lines.push(format!("session_id: {session_id}"));
    }
    if let Some(todo_index) = directive.todo_index {
        lines.push(format!("todo_index: {todo_index}"));
    }
    if let Some(total_todos) = directive.total_todos {
        lines.push(format!("total_todos: {total_todos}"));
    }
    if !directive.prerequisites.is_empty() {
        lines.push(format!("prerequisites: {}", render_list(&directive.prerequisites)));
    }

    format!("{DELIMITER}\n{}\n{DELIMITER}\n{body}", lines.join("\n"))
}

#[cfg(test)]
#[path = "header_tests.rs"]
mod tests;
