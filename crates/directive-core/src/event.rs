// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured event schema emitted for every lifecycle transition and
//! provider call (C8). Every event carries a timestamp, a component name,
//! and a payload of named fields; sinks (text or JSON) live in the
//! `directive-log` crate and only depend on this enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directive::DirectiveId;
use crate::session::SessionId;

/// One structured event. `component` names the emitting subsystem
/// (e.g. `"execution-loop"`, `"provider-gateway"`, `"batch-coordinator"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub component: String,
    pub kind: Event,
}

impl LogEvent {
    pub fn new(component: impl Into<String>, kind: Event) -> Self {
        Self { timestamp: Utc::now(), component: component.into(), kind }
    }
}

/// The payload kinds named in spec.md §4.8.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    DirectiveCreated {
        directive_id: DirectiveId,
        session_id: Option<SessionId>,
        slug: String,
    },
    DirectiveStarted {
        directive_id: DirectiveId,
    },
    DirectiveCompleted {
        directive_id: DirectiveId,
        success: bool,
        duration_ms: u64,
        tokens_in: Option<u64>,
        tokens_out: Option<u64>,
        cost: Option<f64>,
    },
    ProviderRequest {
        directive_id: Option<DirectiveId>,
        platform: String,
        model: String,
    },
    ProviderResponse {
        directive_id: Option<DirectiveId>,
        platform: String,
        model: String,
        success: bool,
        tokens_in: Option<u64>,
        tokens_out: Option<u64>,
        cost: Option<f64>,
        error: Option<String>,
    },
    BatchSubmitted {
        batch_id: String,
        platform: String,
        model: String,
        directive_count: usize,
    },
    BatchCompleted {
        batch_id: String,
        success_count: usize,
        failure_count: usize,
    },
    SystemStatus {
        directives_processed: u64,
        directives_succeeded: u64,
        directives_failed: u64,
        total_tokens_in: u64,
        total_tokens_out: u64,
        total_cost: f64,
        provider_calls: u64,
        provider_errors: u64,
    },
}

impl Event {
    /// Short machine name, used by the text sink's one-line rendering.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::DirectiveCreated { .. } => "directive_created",
            Self::DirectiveStarted { .. } => "directive_started",
            Self::DirectiveCompleted { .. } => "directive_completed",
            Self::ProviderRequest { .. } => "provider_request",
            Self::ProviderResponse { .. } => "provider_response",
            Self::BatchSubmitted { .. } => "batch_submitted",
            Self::BatchCompleted { .. } => "batch_completed",
            Self::SystemStatus { .. } => "system_status",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
