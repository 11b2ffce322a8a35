//! Double-entry bookkeeping logic.
//!
//! This module implements the journal ledger:
//! - Journal entries and lines (debits and credits)
//! - The Draft → Posted → Voided lifecycle
//! - Line and balance validation
//! - Domain types for entry creation, updates, and listing
//! - Error types for ledger operations
//! - Ledger service deciding every write before it happens
//! - Audit observer hook

pub mod audit;
pub mod entry;
pub mod error;
pub mod service;
pub mod status;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use audit::{LedgerEvent, LedgerObserver};
pub use entry::{EntryType, JournalEntry, JournalLine};
pub use error::LedgerError;
pub use service::LedgerService;
pub use status::{EntryStatus, TransitionDecision};
pub use types::{
    CreateJournalEntryInput, JournalEntryFilter, JournalLineInput, LineAccountInfo, LineChanges,
    NewJournalEntry, UpdateJournalEntryInput, UpdatePlan, ValidatedLine,
};
pub use validation::LineTotals;
