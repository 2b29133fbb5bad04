// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    first_retry = { 1, Duration::from_millis(100) },
    second_retry = { 2, Duration::from_millis(200) },
    third_retry = { 3, Duration::from_millis(400) },
)]
fn delay_doubles_with_no_jitter(attempt_number: u32, expected: Duration) {
    let policy = RetryPolicy::new(3, Duration::from_millis(100));
    assert_eq!(policy.delay_before_retry(attempt_number), expected);
}

#[test]
fn total_delay_matches_scenario_6() {
    // retry_attempts=3, two 429 failures then success: total sleep is d + 2d = 3d.
    let policy = RetryPolicy::new(3, Duration::from_millis(10));
    assert_eq!(policy.total_delay(2), Duration::from_millis(30));
}

#[test]
fn n_equals_one_means_no_retry() {
    let policy = RetryPolicy::new(1, Duration::from_millis(10));
    assert_eq!(policy.total_delay(0), Duration::ZERO);
}

#[test]
fn attempts_floor_is_one() {
    let policy = RetryPolicy::new(0, Duration::from_millis(10));
    assert_eq!(policy.attempts, 1);
}
