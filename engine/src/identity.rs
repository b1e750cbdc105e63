//! Identity mapping between remote native ids and local record ids.
//!
//! The cache survives across sync cycles so that the same remote item always
//! maps to the same local identity and keeps its originally assigned
//! timestamp. Without it, every poll would re-mint timestamps and force
//! unchanged items through conflict resolution.

use crate::{error::Result, Error, NativeId, RecordId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix for remote-derived synthetic record ids.
pub const REMOTE_ID_PREFIX: &str = "srv_";

/// Synthetic record id for a remote native id.
pub fn synthetic_id(native: NativeId) -> RecordId {
    format!("{}{}", REMOTE_ID_PREFIX, native)
}

/// Persistent mapping from remote native ids to local identities.
///
/// Grows monotonically and is never pruned; remote deletions are not
/// tombstoned. Uses `BTreeMap` for deterministic serialization order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityCache {
    /// Native id -> synthetic record id
    ids: BTreeMap<NativeId, RecordId>,
    /// Synthetic record id -> first-seen timestamp
    first_seen: BTreeMap<RecordId, Timestamp>,
}

impl IdentityCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting of a remote native id.
    ///
    /// First sighting mints the synthetic id and stores `now` as the
    /// first-seen timestamp. Every later sighting returns the cached pair
    /// unchanged.
    pub fn observe(&mut self, native: NativeId, now: Timestamp) -> (RecordId, Timestamp) {
        let id = self
            .ids
            .entry(native)
            .or_insert_with(|| synthetic_id(native))
            .clone();
        let seen = *self.first_seen.entry(id.clone()).or_insert(now);
        (id, seen)
    }

    /// Look up the synthetic id for a native id, if ever observed.
    pub fn get(&self, native: NativeId) -> Option<&RecordId> {
        self.ids.get(&native)
    }

    /// First-seen timestamp for a synthetic id, if known.
    pub fn first_seen(&self, id: &str) -> Option<Timestamp> {
        self.first_seen.get(id).copied()
    }

    /// Number of mapped native ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the cache has no entries.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Serialize to JSON with deterministic ordering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidCache(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidCache(e.to_string()))
    }
}
