//! Journal entry lifecycle.
//!
//! ```text
//! Draft ──post──▶ Posted ──void──▶ Voided
//!   ▲               │
//!   └────unpost─────┘
//! Draft ──void──▶ Voided
//! ```
//!
//! Voided is terminal. Moving to the current status is always a no-op.

use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Journal entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Editable, no effect on balances.
    Draft,
    /// Counted in balances and reports. Lines are frozen.
    Posted,
    /// Cancelled. Terminal.
    Voided,
}

impl EntryStatus {
    /// Returns true if the entry may move from `self` to `to`.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Draft | Self::Posted, _) | (Self::Voided, Self::Voided)
        )
    }

    /// Returns an error unless the move from `self` to `to` is allowed.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidTransition` for any move out of `Voided`.
    pub fn ensure_transition(self, to: Self) -> Result<(), LedgerError> {
        if self.can_transition_to(to) {
            Ok(())
        } else {
            Err(LedgerError::InvalidTransition { from: self, to })
        }
    }

    /// Returns true if lines and date may still change.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Voided)
    }

    /// Returns the lowercase storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Voided => "voided",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "posted" => Ok(Self::Posted),
            "voided" => Ok(Self::Voided),
            _ => Err(LedgerError::InvalidStatus(s.to_string())),
        }
    }
}

/// Outcome of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    /// Entry is already in the requested status.
    Unchanged,
    /// Status must be flipped from `from` to `to`.
    Apply {
        /// Status expected in storage.
        from: EntryStatus,
        /// Status to write.
        to: EntryStatus,
    },
}

impl TransitionDecision {
    /// Decides a transition from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidTransition` if the move is not allowed.
    pub fn between(from: EntryStatus, to: EntryStatus) -> Result<Self, LedgerError> {
        from.ensure_transition(to)?;
        if from == to {
            Ok(Self::Unchanged)
        } else {
            Ok(Self::Apply { from, to })
        }
    }

    /// Returns the target status if a write is needed.
    #[must_use]
    pub const fn target(self) -> Option<EntryStatus> {
        match self {
            Self::Unchanged => None,
            Self::Apply { to, .. } => Some(to),
        }
    }
}
