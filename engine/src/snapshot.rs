//! Snapshot type for persisting and restoring the collection.
//!
//! The snapshot is the bridge between the in-memory [`Collection`] and
//! persistent storage. Serialization is deterministic so that an unchanged
//! collection persists to byte-identical output.

use crate::{error::Result, Collection, Error, Record, Timestamp};
use serde::{Deserialize, Serialize};

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time snapshot of the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSnapshot {
    /// Snapshot format version
    pub format_version: u32,
    /// When the snapshot was taken (milliseconds since epoch)
    pub saved_at: Timestamp,
    /// Records in collection order
    pub records: Vec<Record>,
}

impl CollectionSnapshot {
    /// Snapshot a collection at the given time.
    pub fn capture(collection: &Collection, saved_at: Timestamp) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            saved_at,
            records: collection.records().to_vec(),
        }
    }

    /// Restore the collection, deduplicating by id.
    ///
    /// Returns the collection and the number of duplicate records dropped.
    pub fn restore(self) -> (Collection, usize) {
        Collection::from_records(self.records)
    }

    /// Number of records in the snapshot.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;

        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        Ok(snapshot)
    }
}
