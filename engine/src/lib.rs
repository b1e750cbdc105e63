//! # QuoteSync Engine
//!
//! The deterministic reconciliation core for QuoteSync.
//!
//! This crate contains the logic that keeps a local quote collection in step
//! with a remote one: normalizing loosely-typed input into records, mapping
//! remote payloads onto stable local identities, classifying the two sides
//! into new / unchanged / conflicting records, and applying conflict
//! resolutions into a merged collection.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine never touches files, the network, or a clock.
//!   Timestamps and freshly minted identifiers are passed in by the caller.
//! - **Deterministic**: the same inputs always produce the same outputs,
//!   including serialized forms (ordered maps throughout).
//! - **Testable**: pure logic, no mocks needed.
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] is one quote: an identifier, the quote text, a category tag,
//! and a last-updated timestamp. Identity is the `id`; content equality
//! ([`Record::content_equals`]) compares only `text` and `category`, so two
//! records can share an identity while disagreeing on content. That is
//! exactly the conflict case.
//!
//! ### Identity mapping
//!
//! Remote items arrive with native identifiers from another namespace. The
//! [`IdentityCache`] maps each native id to a synthetic record id (prefixed
//! so it can never collide with locally minted ids) and remembers the
//! timestamp of the first sighting, so an unchanged remote item never
//! masquerades as a fresh update on later fetches.
//!
//! ### Reconciliation
//!
//! [`classify`] splits a remote snapshot against the local [`Collection`]
//! into fresh records, unchanged records, and [`ConflictPair`]s. The caller
//! decides each conflict (see [`Resolution`]) and [`apply`] folds the
//! decisions back into the collection, reporting what changed.
//!
//! ## Quick Start
//!
//! ```rust
//! use quotesync_engine::{
//!     classify, apply, map_snapshot, Collection, IdentityCache, Record,
//!     RemoteItem, Resolution, DEFAULT_FETCH_CAP,
//! };
//!
//! let mut collection = Collection::new();
//! collection.push(Record::new("q_1", "Stay hungry.", "Motivation", 1_000));
//!
//! // One fetched remote item, normalized against the identity cache.
//! let items = vec![RemoteItem::new(7, "Hello")];
//! let mut cache = IdentityCache::new();
//! let snapshot = map_snapshot(&items, &mut cache, 2_000, DEFAULT_FETCH_CAP);
//!
//! let diff = classify(&collection, &snapshot);
//! assert_eq!(diff.fresh.len(), 1);
//!
//! let report = apply(&mut collection, diff, &[], 2_000).unwrap();
//! assert!(report.changed);
//! assert_eq!(collection.len(), 2);
//! # let _ = Resolution::KeepRemote;
//! ```
//!
//! ## Persistence
//!
//! The engine defines the shapes that cross the persistence boundary:
//! [`CollectionSnapshot`] for the collection and the JSON form of
//! [`IdentityCache`]. Reading and writing them is the host's job.

pub mod adapter;
pub mod collection;
pub mod error;
pub mod identity;
pub mod reconcile;
pub mod record;
pub mod snapshot;

// Re-export main types at crate root
pub use adapter::{map_snapshot, RemoteItem, DEFAULT_FETCH_CAP, REMOTE_CATEGORY};
pub use collection::Collection;
pub use error::Error;
pub use identity::{synthetic_id, IdentityCache, REMOTE_ID_PREFIX};
pub use reconcile::{apply, classify, ConflictPair, Diff, MergeReport, Resolution};
pub use record::{
    normalize, normalize_batch, IdMinter, RawRecord, Record, SequentialMinter, DEFAULT_CATEGORY,
    LOCAL_ID_PREFIX,
};
pub use snapshot::{CollectionSnapshot, SNAPSHOT_FORMAT_VERSION};

/// Type aliases for clarity
pub type RecordId = String;
pub type NativeId = u64;
pub type Timestamp = u64;
