// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The directive record and its paired output artifact.
//!
//! A directive is the unit of work the pipeline moves through the five
//! lifecycle folders (`new`, `success`, `failed`, `slow`, `exemplar`);
//! the folder a directive's file currently sits in is the authoritative
//! lifecycle state. The `status` field carried in the directive's own
//! header only distinguishes `pending` (still in `new`) from the two
//! terminal outcomes (`completed`, `failed`); it never encodes the
//! latency class (`slow`/`exemplar`) that folder placement does.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionId;

crate::define_id! {
    /// Unique identifier for a directive record.
    pub struct DirectiveId("dir-");
}

/// Status carried in a directive's header.
///
/// Distinct from the lifecycle folder: `Completed` directives may live in
/// `success`, `slow`, or `exemplar` depending on measured duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveStatus {
    Pending,
    Completed,
    Failed,
}

crate::simple_display! {
    DirectiveStatus {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
    }
}

impl FromStr for DirectiveStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized directive status: {0:?}")]
pub struct ParseStatusError(String);

/// Priority ranking. Higher-ranked directives are selected first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

crate::simple_display! {
    Priority {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

impl Priority {
    /// Sort rank used by the store's ready-candidate ordering: high=3,
    /// medium=2, low=1. An unparseable header value also ranks as 1 (see
    /// [`rank_or_unknown`]).
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// Rank used when a raw header value fails to parse as a [`Priority`]:
/// treated the same as `low` rather than rejecting the file outright.
pub fn rank_or_unknown(parsed: Option<Priority>) -> u8 {
    parsed.map(|p| p.rank()).unwrap_or(1)
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized priority: {0:?}")]
pub struct ParsePriorityError(String);

/// The unit of work. Owns its on-disk representation (header + body) via
/// the store; this struct is the in-memory parsed form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directive {
    pub id: DirectiveId,
    pub slug: String,
    pub task: String,
    pub status: DirectiveStatus,
    pub priority: Priority,
    pub created: DateTime<Utc>,
    pub platform: Option<String>,
    pub model: Option<String>,
    /// Ordered references to prior directives: may be an id, a slug, or an
    /// external to-do id (union semantics — any one match satisfies it).
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub todo_id: Option<String>,
    pub session_id: Option<SessionId>,
    pub todo_index: Option<u32>,
    pub total_todos: Option<u32>,
}

impl Directive {
    /// True once every entry in `prerequisites` matches one of `resolved_ids`,
    /// `resolved_slugs`, or `resolved_todo_ids` (the union of everything
    /// currently sitting in a terminal folder).
    pub fn prerequisites_satisfied(
        &self,
        resolved_ids: &[&str],
        resolved_slugs: &[&str],
        resolved_todo_ids: &[&str],
    ) -> bool {
        self.prerequisites.iter().all(|p| {
            resolved_ids.contains(&p.as_str())
                || resolved_slugs.contains(&p.as_str())
                || resolved_todo_ids.contains(&p.as_str())
        })
    }

    crate::setters! {
        into { slug: String, task: String }
        set { status: DirectiveStatus, priority: Priority }
        option { platform: String, model: String, todo_id: String }
    }
}

crate::builder! {
    pub struct DirectiveBuilder => Directive {
        into { slug: String = "test-directive", task: String = "do the thing" }
        set { status: DirectiveStatus = DirectiveStatus::Pending, priority: Priority = Priority::Medium }
        option { platform: String = None, model: String = None, todo_id: String = None,
                 session_id: SessionId = None, todo_index: u32 = None, total_todos: u32 = None }
        computed {
            id: DirectiveId = DirectiveId::new(),
            created: DateTime<Utc> = Utc::now(),
            prerequisites: Vec<String> = Vec::new()
        }
    }
}

/// Paired 1:1 with a [`Directive`]; created alongside it with placeholder
/// values and updated in place by the execution loop on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputArtifact {
    /// Conventionally `output-<directive-id>`.
    pub id: String,
    pub directive_id: DirectiveId,
    pub slug: String,
    pub status: DirectiveStatus,
    pub priority: Priority,
    pub created: DateTime<Utc>,
    pub tokens_in: Option<u64>,
    pub tokens_out: Option<u64>,
    pub cost: Option<f64>,
    pub processing_time_ms: Option<u64>,
    pub result: String,
    pub completed_at: Option<DateTime<Utc>>,
}

impl OutputArtifact {
    /// Placeholder artifact written alongside a freshly created directive.
    pub fn placeholder(directive: &Directive) -> Self {
        Self {
            id: format!("output-{}", directive.id),
            directive_id: directive.id,
            slug: directive.slug.clone(),
            status: DirectiveStatus::Pending,
            priority: directive.priority,
            created: directive.created,
            tokens_in: None,
            tokens_out: None,
            cost: None,
            processing_time_ms: None,
            result: String::new(),
            completed_at: None,
        }
    }

    crate::setters! {
        into { result: String }
        set { status: DirectiveStatus }
        option { tokens_in: u64, tokens_out: u64, cost: f64, processing_time_ms: u64, completed_at: DateTime<Utc> }
    }
}

#[cfg(test)]
#[path = "directive_tests.rs"]
mod tests;
