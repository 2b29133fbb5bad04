// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-process performance counters, with an on-demand summary event
//! (spec.md §4.8 plus the "summary-on-demand" behavior from
//! `original_source`, see `SPEC_FULL.md` §C).

use parking_lot::Mutex;

use directive_core::Event;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    directives_processed: u64,
    directives_succeeded: u64,
    directives_failed: u64,
    total_tokens_in: u64,
    total_tokens_out: u64,
    total_cost: f64,
    provider_calls: u64,
    provider_errors: u64,
}

/// Accumulates counters across a process's lifetime; cheap to clone
/// (interior mutability via a mutex, matching the teacher's `Clock`
/// abstraction style for shared, mutable, cross-thread state).
#[derive(Debug, Clone, Default)]
pub struct PerformanceTracker {
    counters: std::sync::Arc<Mutex<Counters>>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_directive_completed(&self, success: bool, tokens_in: Option<u64>, tokens_out: Option<u64>, cost: Option<f64>) {
        let mut c = self.counters.lock();
        c.directives_processed += 1;
        if success {
            c.directives_succeeded += 1;
        } else {
            c.directives_failed += 1;
        }
        c.total_tokens_in += tokens_in.unwrap_or(0);
        c.total_tokens_out += tokens_out.unwrap_or(0);
        c.total_cost += cost.unwrap_or(0.0);
    }

    pub fn record_provider_call(&self, success: bool) {
        let mut c = self.counters.lock();
        c.provider_calls += 1;
        if !success {
            c.provider_errors += 1;
        }
    }

    /// Build a `SystemStatus` event from the current counters; may be
    /// called at any time, not just on a fixed timer.
    pub fn summary_event(&self) -> Event {
        let c = *self.counters.lock();
        Event::SystemStatus {
            directives_processed: c.directives_processed,
            directives_succeeded: c.directives_succeeded,
            directives_failed: c.directives_failed,
            total_tokens_in: c.total_tokens_in,
            total_tokens_out: c.total_tokens_out,
            total_cost: c.total_cost,
            provider_calls: c.provider_calls,
            provider_errors: c.provider_errors,
        }
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
