// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn accumulates_across_calls() {
    let tracker = PerformanceTracker::new();
    tracker.record_directive_completed(true, Some(100), Some(50), Some(0.00105));
    tracker.record_directive_completed(false, None, None, None);
    tracker.record_provider_call(true);
    tracker.record_provider_call(false);

    match tracker.summary_event() {
        Event::SystemStatus {
            directives_processed,
            directives_succeeded,
            directives_failed,
            total_tokens_in,
            total_tokens_out,
            provider_calls,
            provider_errors,
            ..
        } => {
            assert_eq!(directives_processed, 2);
            assert_eq!(directives_succeeded, 1);
            assert_eq!(directives_failed, 1);
            assert_eq!(total_tokens_in, 100);
            assert_eq!(total_tokens_out, 50);
            assert_eq!(provider_calls, 2);
            assert_eq!(provider_errors, 1);
        }
        other => panic!("expected SystemStatus, got {other:?}"),
    }
}

#[test]
fn clone_shares_the_same_counters() {
    let tracker = PerformanceTracker::new();
    let clone = tracker.clone();
    clone.record_directive_completed(true, None, None, None);
    if let Event::SystemStatus { directives_processed, .. } = tracker.summary_event() {
        assert_eq!(directives_processed, 1);
    } else {
        panic!("expected SystemStatus");
    }
}
