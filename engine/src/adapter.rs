//! Remote payload mapping.
//!
//! Turns one fetched remote list into a snapshot of [`Record`]s with stable
//! identities. The snapshot is transient: it lives for one sync cycle and is
//! never mutated.

use crate::{IdentityCache, NativeId, Record, Timestamp, REMOTE_ID_PREFIX};
use serde::{Deserialize, Serialize};

/// Category assigned to remote-derived records.
pub const REMOTE_CATEGORY: &str = "Server";

/// Default bound on how many remote items one cycle considers.
///
/// Keeps per-cycle cost independent of remote collection growth.
pub const DEFAULT_FETCH_CAP: usize = 10;

/// One entry of the remote list, as fetched.
///
/// Unknown fields are ignored so the wire format can grow without breaking
/// the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteItem {
    /// Native identifier in the remote namespace
    pub id: NativeId,
    /// Title-like field carrying the quote text
    pub title: String,
    /// Body text, unused by the mapping but present on the wire
    #[serde(default)]
    pub body: String,
}

impl RemoteItem {
    /// Create a remote item with an empty body.
    pub fn new(id: NativeId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: String::new(),
        }
    }
}

/// Map a fetched remote list into a record snapshot.
///
/// Only the first `cap` items are considered. Each surviving item gets its
/// synthetic id and first-seen timestamp from the identity cache, the
/// trimmed title as text, and [`REMOTE_CATEGORY`] as category. Items with a
/// blank title are skipped. Output order follows input order.
pub fn map_snapshot(
    items: &[RemoteItem],
    cache: &mut IdentityCache,
    now: Timestamp,
    cap: usize,
) -> Vec<Record> {
    let mut records = Vec::with_capacity(items.len().min(cap));
    for item in items.iter().take(cap) {
        let text = item.title.trim();
        if text.is_empty() {
            continue;
        }
        let (id, first_seen) = cache.observe(item.id, now);
        debug_assert!(id.starts_with(REMOTE_ID_PREFIX));
        records.push(Record::new(id, text, REMOTE_CATEGORY, first_seen));
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_title_and_category() {
        let mut cache = IdentityCache::new();
        let items = vec![RemoteItem::new(7, "Hello")];

        let snapshot = map_snapshot(&items, &mut cache, 1000, DEFAULT_FETCH_CAP);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "srv_7");
        assert_eq!(snapshot[0].text, "Hello");
        assert_eq!(snapshot[0].category, REMOTE_CATEGORY);
        assert_eq!(snapshot[0].updated_at, 1000);
    }

    #[test]
    fn repeated_fetch_reuses_timestamp() {
        let mut cache = IdentityCache::new();
        let items = vec![RemoteItem::new(7, "Hello")];

        let first = map_snapshot(&items, &mut cache, 1000, DEFAULT_FETCH_CAP);
        let second = map_snapshot(&items, &mut cache, 5000, DEFAULT_FETCH_CAP);

        assert_eq!(first[0].updated_at, 1000);
        assert_eq!(second[0].updated_at, 1000);
        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn cap_bounds_the_snapshot() {
        let mut cache = IdentityCache::new();
        let items: Vec<_> = (0..25)
            .map(|i| RemoteItem::new(i, format!("Quote {i}")))
            .collect();

        let snapshot = map_snapshot(&items, &mut cache, 1000, 10);

        assert_eq!(snapshot.len(), 10);
        assert_eq!(snapshot[9].id, "srv_9");
        // Items beyond the cap were never observed
        assert_eq!(cache.len(), 10);
    }

    #[test]
    fn blank_titles_skipped() {
        let mut cache = IdentityCache::new();
        let items = vec![
            RemoteItem::new(1, "  "),
            RemoteItem::new(2, "Kept"),
            RemoteItem::new(3, ""),
        ];

        let snapshot = map_snapshot(&items, &mut cache, 1000, DEFAULT_FETCH_CAP);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "srv_2");
    }

    #[test]
    fn title_whitespace_trimmed() {
        let mut cache = IdentityCache::new();
        let items = vec![RemoteItem::new(1, "  spaced  ")];

        let snapshot = map_snapshot(&items, &mut cache, 1000, DEFAULT_FETCH_CAP);

        assert_eq!(snapshot[0].text, "spaced");
    }

    #[test]
    fn input_order_preserved() {
        let mut cache = IdentityCache::new();
        let items = vec![
            RemoteItem::new(9, "Nine"),
            RemoteItem::new(1, "One"),
            RemoteItem::new(5, "Five"),
        ];

        let snapshot = map_snapshot(&items, &mut cache, 1000, DEFAULT_FETCH_CAP);

        let ids: Vec<_> = snapshot.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["srv_9", "srv_1", "srv_5"]);
    }

    #[test]
    fn wire_format_ignores_unknown_fields() {
        let json = r#"{"id": 7, "title": "Hello", "body": "b", "userId": 1}"#;
        let item: RemoteItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.title, "Hello");
    }

    #[test]
    fn wire_format_body_optional() {
        let json = r#"{"id": 7, "title": "Hello"}"#;
        let item: RemoteItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.body, "");
    }
}
