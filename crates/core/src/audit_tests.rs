// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn chained_event_verifies() {
    let mut event = AuditEvent::builder().build();
    event.chain(None);
    assert!(event.verify());
}

#[test]
fn tampering_with_detail_breaks_verification() {
    let mut event = AuditEvent::builder().build();
    event.chain(None);
    event.detail = serde_json::json!({"tampered": true});
    assert!(!event.verify());
}

#[test]
fn chain_links_prev_hash_to_next_event() {
    let mut first = AuditEvent::builder().action("created").build();
    first.chain(None);
    let mut second = AuditEvent::builder().action("claimed").build();
    second.chain(first.hash.clone());

    assert_eq!(second.prev_hash, first.hash);
    assert!(verify_chain(&[first, second]).is_ok());
}

#[test]
fn verify_chain_detects_reordering() {
    let mut first = AuditEvent::builder().action("created").build();
    first.chain(None);
    let mut second = AuditEvent::builder().action("claimed").build();
    second.chain(first.hash.clone());

    assert_eq!(verify_chain(&[second, first]), Err(0));
}

#[test]
fn merkle_root_is_stable_for_same_events() {
    let mut first = AuditEvent::builder().build();
    first.chain(None);
    let mut second = AuditEvent::builder().build();
    second.chain(first.hash.clone());

    let events = vec![first, second];
    let root_a = merkle_root(&events);
    let root_b = merkle_root(&events);
    assert_eq!(root_a, root_b);
    assert!(root_a.is_some());
}

#[test]
fn merkle_root_none_for_unchained_events() {
    let event = AuditEvent::builder().build();
    assert!(merkle_root(&[event]).is_none());
}
