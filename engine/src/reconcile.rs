//! Reconciliation of the local collection against a remote snapshot.
//!
//! This is the core of the sync engine. Classification is by identity, not
//! content: a remote record either introduces a new id, matches the local
//! content for an existing id, or conflicts with it.
//!
//! # Algorithm
//!
//! 1. For each remote record, look up the local record with the same id
//! 2. Absent locally: classify as fresh, scheduled for append
//! 3. Present with equal content: classify as unchanged, no action
//! 4. Present with differing content: classify as a conflicting pair
//! 5. The caller resolves each pair, then [`apply`] folds the decisions in
//!
//! Local records absent from the snapshot are never touched; deletion does
//! not propagate.

use crate::{error::Result, Collection, Error, Record, Timestamp};
use serde::{Deserialize, Serialize};

/// A pair of records sharing an id with differing content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictPair {
    /// The local version
    pub local: Record,
    /// The remote version
    pub remote: Record,
}

/// Result of classifying a remote snapshot against the local collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Remote records with no local counterpart, in snapshot order
    pub fresh: Vec<Record>,
    /// Pairs needing a resolution, in snapshot order
    pub conflicts: Vec<ConflictPair>,
    /// Count of remote records whose local content already matched
    pub unchanged: usize,
}

impl Diff {
    /// True when nothing is to append and nothing conflicts.
    pub fn is_empty(&self) -> bool {
        self.fresh.is_empty() && self.conflicts.is_empty()
    }
}

/// Outcome of one conflicting pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolution {
    /// Remote content overwrites the local record, identity preserved
    KeepRemote,
    /// Local record stays as is; optionally emitted back upstream
    KeepLocal {
        /// Whether the surviving local version should be pushed upstream
        push_upstream: bool,
    },
}

/// Result of applying resolutions to the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Records appended
    pub appended: usize,
    /// Conflicts resolved in favor of the remote side
    pub remote_wins: usize,
    /// Whether the collection content changed at all
    pub changed: bool,
    /// Local records to emit upstream, best effort
    pub push_upstream: Vec<Record>,
}

/// Classify every remote record against the local collection by id.
pub fn classify(local: &Collection, remote: &[Record]) -> Diff {
    let mut diff = Diff::default();
    for record in remote {
        match local.get(&record.id) {
            None => diff.fresh.push(record.clone()),
            Some(existing) if existing.content_equals(record) => diff.unchanged += 1,
            Some(existing) => diff.conflicts.push(ConflictPair {
                local: existing.clone(),
                remote: record.clone(),
            }),
        }
    }
    diff
}

/// Fold a classified diff and its resolutions into the collection.
///
/// Requires exactly one resolution per conflict, in the diff's conflict
/// order. Fresh records are appended in snapshot order; `KeepRemote`
/// overwrites content in place and stamps `now`; `KeepLocal` leaves the
/// record untouched and optionally queues it for upstream push.
pub fn apply(
    collection: &mut Collection,
    diff: Diff,
    resolutions: &[Resolution],
    now: Timestamp,
) -> Result<MergeReport> {
    if resolutions.len() != diff.conflicts.len() {
        return Err(Error::ResolutionCountMismatch {
            conflicts: diff.conflicts.len(),
            resolutions: resolutions.len(),
        });
    }

    let mut report = MergeReport::default();

    for record in diff.fresh {
        if collection.push(record) {
            report.appended += 1;
        }
    }

    for (pair, resolution) in diff.conflicts.into_iter().zip(resolutions) {
        match resolution {
            Resolution::KeepRemote => {
                if let Some(local) = collection.get_mut(&pair.local.id) {
                    local.overwrite_content(&pair.remote, now);
                    report.remote_wins += 1;
                }
            }
            Resolution::KeepLocal { push_upstream } => {
                if *push_upstream {
                    report.push_upstream.push(pair.local);
                }
            }
        }
    }

    report.changed = report.appended > 0 || report.remote_wins > 0;
    Ok(report)
}
