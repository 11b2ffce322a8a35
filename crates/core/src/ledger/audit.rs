//! Audit hook for ledger lifecycle events.
//!
//! Storage calls the observer after a write has committed, so an observer
//! never sees an event for a rolled back change.

use serde::Serialize;
use tally_shared::types::JournalEntryId;

use super::status::EntryStatus;

/// A committed change to a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Entry was created.
    Created {
        /// Entry ID.
        entry_id: JournalEntryId,
        /// Initial status.
        status: EntryStatus,
    },
    /// Entry was posted.
    Posted {
        /// Entry ID.
        entry_id: JournalEntryId,
    },
    /// Entry was voided.
    Voided {
        /// Entry ID.
        entry_id: JournalEntryId,
        /// Status before voiding.
        previous: EntryStatus,
    },
    /// Posted entry was returned to draft.
    Unposted {
        /// Entry ID.
        entry_id: JournalEntryId,
    },
    /// Entry was deleted.
    Deleted {
        /// Entry ID.
        entry_id: JournalEntryId,
    },
}

impl LedgerEvent {
    /// Builds the event for a committed status flip.
    #[must_use]
    pub const fn transition(entry_id: JournalEntryId, from: EntryStatus, to: EntryStatus) -> Self {
        match to {
            EntryStatus::Posted => Self::Posted { entry_id },
            EntryStatus::Voided => Self::Voided {
                entry_id,
                previous: from,
            },
            EntryStatus::Draft => Self::Unposted { entry_id },
        }
    }

    /// Returns the affected entry.
    #[must_use]
    pub const fn entry_id(&self) -> JournalEntryId {
        match self {
            Self::Created { entry_id, .. }
            | Self::Posted { entry_id }
            | Self::Voided { entry_id, .. }
            | Self::Unposted { entry_id }
            | Self::Deleted { entry_id } => *entry_id,
        }
    }

    /// Returns a short event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Posted { .. } => "posted",
            Self::Voided { .. } => "voided",
            Self::Unposted { .. } => "unposted",
            Self::Deleted { .. } => "deleted",
        }
    }
}

/// Receives ledger events after commit.
pub trait LedgerObserver: Send + Sync {
    /// Records one event. Must not fail or block for long.
    fn record(&self, event: &LedgerEvent);
}
