//! Typed identifiers for ledger records.
//!
//! Every record key is a UUID v7, so ids sort by creation time. The kind
//! parameter keeps an account id from being passed where a journal entry id
//! is expected.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Names the record an [`Id`] points at.
pub trait IdKind {
    /// Used in `Debug` output.
    const NAME: &'static str;
}

/// Kind marker for chart of accounts entries.
#[derive(Debug, Clone, Copy)]
pub enum AccountKind {}

/// Kind marker for journal entry headers.
#[derive(Debug, Clone, Copy)]
pub enum JournalEntryKind {}

/// Kind marker for journal lines.
#[derive(Debug, Clone, Copy)]
pub enum JournalLineKind {}

impl IdKind for AccountKind {
    const NAME: &'static str = "AccountId";
}

impl IdKind for JournalEntryKind {
    const NAME: &'static str = "JournalEntryId";
}

impl IdKind for JournalLineKind {
    const NAME: &'static str = "JournalLineId";
}

/// Identifier of a chart of accounts entry.
pub type AccountId = Id<AccountKind>;
/// Identifier of a journal entry.
pub type JournalEntryId = Id<JournalEntryKind>;
/// Identifier of one line of a journal entry.
pub type JournalLineId = Id<JournalLineKind>;

/// A UUID tagged with the kind of record it identifies.
pub struct Id<K> {
    uuid: Uuid,
    kind: PhantomData<fn() -> K>,
}

impl<K> Id<K> {
    /// Generates a fresh time-ordered id.
    #[must_use]
    pub fn new() -> Self {
        Self::from_uuid(Uuid::now_v7())
    }

    /// Wraps a stored UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            kind: PhantomData,
        }
    }

    /// Unwraps to the stored UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.uuid
    }
}

impl<K> Default for Id<K> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impls so the bounds do not leak onto `K`.

impl<K> Clone for Id<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Id<K> {}

impl<K> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<K> Eq for Id<K> {}

impl<K> PartialOrd for Id<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Id<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uuid.cmp(&other.uuid)
    }
}

impl<K> Hash for Id<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl<K: IdKind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", K::NAME, self.uuid)
    }
}

impl<K> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.uuid, f)
    }
}

impl<K> FromStr for Id<K> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self::from_uuid)
    }
}

impl<K> From<Uuid> for Id<K> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<K> From<Id<K>> for Uuid {
    fn from(id: Id<K>) -> Self {
        id.uuid
    }
}

impl<K> Serialize for Id<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.uuid.serialize(serializer)
    }
}

impl<'de, K> Deserialize<'de> for Id<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
