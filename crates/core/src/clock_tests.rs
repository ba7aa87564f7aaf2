// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn fake_clock_advances_by_duration() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock = FakeClock::new(start);
    assert_eq!(clock.now(), start);

    clock.advance(chrono::Duration::seconds(30));
    assert_eq!(clock.now(), start + chrono::Duration::seconds(30));
}

#[test]
fn fake_clock_set_jumps_directly() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let target = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
    let clock = FakeClock::new(start);
    clock.set(target);
    assert_eq!(clock.now(), target);
}

#[test]
fn stepped_and_jumped_advance_agree() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let stepped = FakeClock::new(start);
    for _ in 0..10 {
        stepped.advance(chrono::Duration::seconds(6));
    }
    let jumped = FakeClock::new(start);
    jumped.advance(chrono::Duration::seconds(60));
    assert_eq!(stepped.now(), jumped.now());
}
