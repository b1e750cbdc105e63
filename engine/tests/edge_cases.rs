//! Edge case tests for quotesync-engine
//!
//! These tests cover boundary conditions and unusual inputs.

use quotesync_engine::{
    apply, classify, map_snapshot, normalize, normalize_batch, Collection, IdentityCache,
    RawRecord, Record, RemoteItem, Resolution, SequentialMinter, DEFAULT_CATEGORY,
    DEFAULT_FETCH_CAP, REMOTE_CATEGORY,
};

fn raw(text: &str) -> RawRecord {
    RawRecord {
        id: None,
        text: Some(text.to_string()),
        category: None,
        updated_at: None,
    }
}

// ============================================================================
// String Edge Cases
// ============================================================================

#[test]
fn unicode_text_survives_normalization() {
    let mut minter = SequentialMinter::new();
    let record = normalize(raw("千里之行，始于足下"), 1000, &mut minter).unwrap();

    assert_eq!(record.text, "千里之行，始于足下");
    assert_eq!(record.category, DEFAULT_CATEGORY);
}

#[test]
fn unicode_whitespace_only_is_discarded() {
    let mut minter = SequentialMinter::new();
    // Various whitespace the trim must handle
    let (records, discarded) = normalize_batch(
        vec![raw("\t\n  "), raw("\u{00a0}real text")],
        1000,
        &mut minter,
    );

    assert_eq!(discarded, 1);
    assert_eq!(records.len(), 1);
}

#[test]
fn very_long_text_is_kept_verbatim() {
    let mut minter = SequentialMinter::new();
    let long = "x".repeat(10_000);
    let record = normalize(raw(&long), 1000, &mut minter).unwrap();

    assert_eq!(record.text.len(), 10_000);
}

#[test]
fn conflicting_unicode_content_detected() {
    let (local, _) = Collection::from_records(vec![Record::new("srv_1", "café", "Server", 100)]);
    let remote = vec![Record::new("srv_1", "cafe\u{0301}", "Server", 100)];

    // NFC vs NFD are different strings; no normalization is attempted
    let diff = classify(&local, &remote);
    assert_eq!(diff.conflicts.len(), 1);
}

// ============================================================================
// Snapshot Boundaries
// ============================================================================

#[test]
fn empty_remote_snapshot_is_a_no_op() {
    let (mut local, _) = Collection::from_records(vec![Record::new("q_1", "Q1", "Gen", 100)]);

    let diff = classify(&local, &[]);
    assert!(diff.is_empty());

    let report = apply(&mut local, diff, &[], 200).unwrap();
    assert!(!report.changed);
    assert_eq!(local.len(), 1);
}

#[test]
fn empty_local_collection_admits_whole_snapshot() {
    let mut local = Collection::new();
    let mut cache = IdentityCache::new();
    let items: Vec<_> = (1..=3).map(|i| RemoteItem::new(i, format!("T{i}"))).collect();

    let snapshot = map_snapshot(&items, &mut cache, 1000, DEFAULT_FETCH_CAP);
    let diff = classify(&local, &snapshot);
    let report = apply(&mut local, diff, &[], 1000).unwrap();

    assert_eq!(report.appended, 3);
    assert_eq!(local.len(), 3);
}

#[test]
fn cap_of_zero_yields_empty_snapshot() {
    let mut cache = IdentityCache::new();
    let items = vec![RemoteItem::new(1, "One")];

    let snapshot = map_snapshot(&items, &mut cache, 1000, 0);

    assert!(snapshot.is_empty());
    assert!(cache.is_empty());
}

#[test]
fn cap_exactly_at_list_length() {
    let mut cache = IdentityCache::new();
    let items: Vec<_> = (0..5).map(|i| RemoteItem::new(i, format!("T{i}"))).collect();

    let snapshot = map_snapshot(&items, &mut cache, 1000, 5);

    assert_eq!(snapshot.len(), 5);
}

#[test]
fn duplicate_native_ids_in_one_fetch() {
    let mut cache = IdentityCache::new();
    let items = vec![RemoteItem::new(7, "First"), RemoteItem::new(7, "Second")];

    let snapshot = map_snapshot(&items, &mut cache, 1000, DEFAULT_FETCH_CAP);

    // Both map to srv_7; the collection rejects the duplicate on append
    assert_eq!(snapshot.len(), 2);
    let mut local = Collection::new();
    let diff = classify(&local, &snapshot);
    let report = apply(&mut local, diff, &[], 1000).unwrap();
    assert_eq!(report.appended, 1);
    assert_eq!(local.get("srv_7").unwrap().text, "First");
}

// ============================================================================
// Identity Stability Across Cycles
// ============================================================================

#[test]
fn identity_and_timestamp_stable_across_fetches() {
    let mut cache = IdentityCache::new();
    let items = vec![RemoteItem::new(7, "Hello")];

    let first = map_snapshot(&items, &mut cache, 1000, DEFAULT_FETCH_CAP);

    // Round-trip the cache through JSON, as a host restarting would
    let cache_json = cache.to_json().unwrap();
    let mut restored = IdentityCache::from_json(&cache_json).unwrap();

    let second = map_snapshot(&items, &mut restored, 9999, DEFAULT_FETCH_CAP);

    assert_eq!(first[0].id, second[0].id);
    assert_eq!(first[0].updated_at, second[0].updated_at);
}

// ============================================================================
// Full Merge Scenarios
// ============================================================================

#[test]
fn scenario_local_plus_remote_item() {
    // local = [{id:"q_1", text:"Q1", category:"Gen"}]; remote native id 7,
    // title "Hello"; after one merge the collection holds both.
    let (mut local, _) = Collection::from_records(vec![Record::new("q_1", "Q1", "Gen", 100)]);
    let mut cache = IdentityCache::new();

    let snapshot = map_snapshot(
        &[RemoteItem::new(7, "Hello")],
        &mut cache,
        2000,
        DEFAULT_FETCH_CAP,
    );
    let diff = classify(&local, &snapshot);
    apply(&mut local, diff, &[], 2000).unwrap();

    assert_eq!(local.len(), 2);
    let added = local.get("srv_7").unwrap();
    assert_eq!(added.text, "Hello");
    assert_eq!(added.category, REMOTE_CATEGORY);
}

#[test]
fn mixed_diff_resolved_both_ways() {
    let (mut local, _) = Collection::from_records(vec![
        Record::new("srv_1", "Local A", "Server", 100),
        Record::new("srv_2", "Local B", "Server", 100),
        Record::new("q_9", "Mine", "Gen", 100),
    ]);
    let remote = vec![
        Record::new("srv_1", "Remote A", "Server", 50),
        Record::new("srv_2", "Remote B", "Server", 50),
        Record::new("srv_3", "New", "Server", 50),
    ];

    let diff = classify(&local, &remote);
    assert_eq!(diff.conflicts.len(), 2);
    assert_eq!(diff.fresh.len(), 1);

    let report = apply(
        &mut local,
        diff,
        &[
            Resolution::KeepRemote,
            Resolution::KeepLocal {
                push_upstream: true,
            },
        ],
        5000,
    )
    .unwrap();

    assert_eq!(report.appended, 1);
    assert_eq!(report.remote_wins, 1);
    assert_eq!(report.push_upstream.len(), 1);
    assert_eq!(local.get("srv_1").unwrap().text, "Remote A");
    assert_eq!(local.get("srv_2").unwrap().text, "Local B");
    assert_eq!(local.get("q_9").unwrap().text, "Mine");
    assert_eq!(local.len(), 4);
}
