//! Record types and normalization of loosely-typed input.

use crate::{error::Result, Error, RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// Category assigned when input carries none.
pub const DEFAULT_CATEGORY: &str = "General";

/// Prefix for locally minted record ids.
///
/// Remote-derived ids use [`crate::REMOTE_ID_PREFIX`]; the two shapes never
/// collide.
pub const LOCAL_ID_PREFIX: &str = "q_";

/// A quote record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier within a collection
    pub id: RecordId,
    /// The quote text, non-empty after trimming
    pub text: String,
    /// Category tag
    pub category: String,
    /// When the record was last updated (milliseconds since epoch)
    pub updated_at: Timestamp,
}

impl Record {
    /// Create a new record.
    pub fn new(
        id: impl Into<RecordId>,
        text: impl Into<String>,
        category: impl Into<String>,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: category.into(),
            updated_at,
        }
    }

    /// Content equality: `text` and `category` match exactly.
    ///
    /// Identity and timestamp are excluded. Two records with the same id but
    /// unequal content are a conflicting pair.
    pub fn content_equals(&self, other: &Record) -> bool {
        self.text == other.text && self.category == other.category
    }

    /// Overwrite content from another record, preserving identity.
    pub fn overwrite_content(&mut self, other: &Record, updated_at: Timestamp) {
        self.text = other.text.clone();
        self.category = other.category.clone();
        self.updated_at = updated_at;
    }

    /// Short human-readable rendering for prompts and logs.
    pub fn summary(&self) -> String {
        format!("\"{}\" — {}", self.text, self.category)
    }
}

/// Source of freshly minted record ids.
///
/// The engine never generates ids itself; hosts inject a minter (random in
/// production, sequential in tests) so normalization stays deterministic.
pub trait IdMinter {
    /// Produce a new unique record id.
    fn mint(&mut self) -> RecordId;
}

/// Deterministic minter producing `q_1`, `q_2`, ... in order.
#[derive(Debug, Default)]
pub struct SequentialMinter {
    counter: u64,
}

impl SequentialMinter {
    /// Create a minter starting at 1.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdMinter for SequentialMinter {
    fn mint(&mut self) -> RecordId {
        self.counter += 1;
        format!("{}{}", LOCAL_ID_PREFIX, self.counter)
    }
}

/// Loosely-typed record input, as found in imported or persisted payloads.
///
/// Every field is optional; [`normalize`] decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Coerce a loosely-typed entry into a [`Record`].
///
/// Trims the text and discards the entry with [`Error::EmptyText`] when
/// nothing remains. A missing or blank category becomes
/// [`DEFAULT_CATEGORY`], a missing id is minted, a missing timestamp takes
/// the supplied `now`.
pub fn normalize(raw: RawRecord, now: Timestamp, minter: &mut dyn IdMinter) -> Result<Record> {
    let text = raw.text.as_deref().unwrap_or("").trim().to_string();
    if text.is_empty() {
        return Err(Error::EmptyText);
    }

    let category = match raw.category.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    };

    let id = match raw.id {
        Some(id) if !id.is_empty() => id,
        _ => minter.mint(),
    };

    Ok(Record {
        id,
        text,
        category,
        updated_at: raw.updated_at.unwrap_or(now),
    })
}

/// Normalize a batch, skipping discarded entries.
///
/// Returns the surviving records in input order and the count of discards.
pub fn normalize_batch(
    raws: Vec<RawRecord>,
    now: Timestamp,
    minter: &mut dyn IdMinter,
) -> (Vec<Record>, usize) {
    let mut records = Vec::with_capacity(raws.len());
    let mut discarded = 0;
    for raw in raws {
        match normalize(raw, now, minter) {
            Ok(record) => records.push(record),
            Err(_) => discarded += 1,
        }
    }
    (records, discarded)
}
