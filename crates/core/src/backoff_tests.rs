// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn should_retry_stops_at_max_retries() {
    let policy = BackoffPolicy { max_retries: 2, ..Default::default() };
    assert!(policy.should_retry(0));
    assert!(policy.should_retry(1));
    assert!(!policy.should_retry(2));
}

#[test]
fn unjittered_delay_grows_exponentially() {
    let policy = BackoffPolicy { base_delay_ms: 100, multiplier: 2.0, max_delay_ms: 100_000, jitter: 0.0, ..Default::default() };
    assert_eq!(policy.unjittered_delay_ms(0), 100);
    assert_eq!(policy.unjittered_delay_ms(1), 200);
    assert_eq!(policy.unjittered_delay_ms(2), 400);
}

#[test]
fn unjittered_delay_is_capped_at_max_delay() {
    let policy = BackoffPolicy { base_delay_ms: 1_000, multiplier: 10.0, max_delay_ms: 5_000, jitter: 0.0, ..Default::default() };
    assert_eq!(policy.unjittered_delay_ms(5), 5_000);
}

#[test]
fn zero_jitter_is_deterministic() {
    let policy = BackoffPolicy { jitter: 0.0, ..Default::default() };
    assert_eq!(policy.delay(1).as_millis() as u64, policy.unjittered_delay_ms(1));
}

#[test]
fn jitter_stays_within_bounds() {
    let policy = BackoffPolicy { base_delay_ms: 1_000, multiplier: 1.0, max_delay_ms: 10_000, jitter: 0.5, ..Default::default() };
    for _ in 0..100 {
        let delay = policy.delay(0).as_millis() as u64;
        assert!(delay >= 500 && delay <= 1_500, "delay {delay} out of jitter bounds");
    }
}
