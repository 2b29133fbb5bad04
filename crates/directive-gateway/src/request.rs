// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response shapes for a single provider call (§4.4).

use directive_core::Platform;

/// A single directive dispatch: the already-context-enriched prompt plus
/// the routing selector. Carries an optional correlation id so the batch
/// coordinator can demultiplex results back to their submitting directive.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub correlation_id: String,
    pub prompt: String,
    pub platform: Platform,
    pub model: String,
}

impl GatewayRequest {
    pub fn new(correlation_id: impl Into<String>, prompt: impl Into<String>, platform: Platform, model: impl Into<String>) -> Self {
        Self { correlation_id: correlation_id.into(), prompt: prompt.into(), platform, model: model.into() }
    }
}

/// The result of one successful provider call: content plus the metrics
/// the execution loop folds into the output artifact and session summary.
#[derive(Debug, Clone)]
pub struct GatewayResult {
    pub success: bool,
    pub content: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub cost: f64,
}

impl GatewayResult {
    pub fn ok(content: impl Into<String>, tokens_in: u64, tokens_out: u64, cost: f64) -> Self {
        Self { success: true, content: content.into(), tokens_in, tokens_out, cost }
    }
}
