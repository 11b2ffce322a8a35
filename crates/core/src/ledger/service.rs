//! Ledger service for journal entry validation and lifecycle decisions.
//!
//! Every write operation is decided here before storage is touched: the
//! repository loads the current state, asks the service for a plan, and
//! applies the plan inside one transaction. Account lookups are injected as
//! closures that return `None` for missing or deleted accounts.

use std::collections::HashSet;

use chrono::NaiveDate;
use tally_shared::types::{AccountId, CurrencyCode, JournalEntryId};

use super::entry::JournalEntry;
use super::error::LedgerError;
use super::status::{EntryStatus, TransitionDecision};
use super::types::{
    CreateJournalEntryInput, JournalLineInput, LineAccountInfo, LineChanges, NewJournalEntry,
    UpdateJournalEntryInput, UpdatePlan, ValidatedLine,
};
use super::validation::{LineTotals, totals_of, validate_lines};

/// Ledger service for journal entry validation.
///
/// This service contains pure business logic with no database dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Validates a create request and builds the entry to insert.
    ///
    /// 1. Rejects `Voided` as an initial status
    /// 2. Validates each line (amount, precision, currency, account)
    /// 3. Requires debits to equal credits
    /// 4. Requires at least one line when created as `Posted`
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails.
    pub fn prepare_create<A>(
        input: CreateJournalEntryInput,
        today: NaiveDate,
        account_lookup: A,
    ) -> Result<NewJournalEntry, LedgerError>
    where
        A: Fn(AccountId) -> Option<LineAccountInfo>,
    {
        let status = input.status.unwrap_or(EntryStatus::Draft);
        if status == EntryStatus::Voided {
            return Err(LedgerError::InvalidCreateStatus(status));
        }

        let lines: Vec<ValidatedLine> = validate_lines(&input.lines, &account_lookup)?
            .into_iter()
            .map(|line| ValidatedLine { id: None, ..line })
            .collect();

        let totals = totals_of(&lines);
        totals.ensure_balanced()?;

        if status == EntryStatus::Posted && lines.is_empty() {
            return Err(LedgerError::EmptyEntry);
        }

        Ok(NewJournalEntry {
            id: JournalEntryId::new(),
            entry_date: input.entry_date.unwrap_or(today),
            description: input.description.trim().to_string(),
            reference: normalize_reference(input.reference),
            status,
            lines,
            totals,
        })
    }

    /// Validates an update of `current` and returns what to write.
    ///
    /// Posted and voided entries only accept description and reference
    /// changes plus a status transition. Draft entries accept everything;
    /// `lines` is the desired final set.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the patch violates a rule. Nothing in the
    /// returned plan is partial.
    pub fn prepare_update<A>(
        current: &JournalEntry,
        patch: UpdateJournalEntryInput,
        account_lookup: A,
    ) -> Result<UpdatePlan, LedgerError>
    where
        A: Fn(AccountId) -> Option<LineAccountInfo>,
    {
        let target = patch.status.unwrap_or(current.status);
        let transition = TransitionDecision::between(current.status, target)?;
        let description = patch.description.map(|d| d.trim().to_string());
        let reference = patch.reference.map(normalize_reference);

        if !current.status.is_editable() {
            if patch.entry_date.is_some_and(|date| date != current.entry_date) {
                return Err(LedgerError::ImmutableEntry {
                    status: current.status,
                    field: "entry_date",
                });
            }
            if patch
                .lines
                .as_deref()
                .is_some_and(|lines| !same_lines(current, lines))
            {
                return Err(LedgerError::ImmutableEntry {
                    status: current.status,
                    field: "lines",
                });
            }
            return Ok(UpdatePlan {
                entry_date: None,
                description,
                reference,
                line_changes: None,
                transition,
            });
        }

        let line_changes = patch
            .lines
            .as_deref()
            .map(|inputs| Self::plan_line_changes(current, inputs, &account_lookup))
            .transpose()?;

        if transition.target() == Some(EntryStatus::Posted) {
            match &line_changes {
                Some(changes) => Self::check_postable(
                    changes.lines.iter().map(|l| l.account_id),
                    totals_of(&changes.lines),
                    &account_lookup,
                )?,
                None => Self::check_postable(
                    current.lines.iter().map(|l| l.account_id),
                    current.totals(),
                    &account_lookup,
                )?,
            }
        }

        Ok(UpdatePlan {
            entry_date: patch.entry_date,
            description,
            reference,
            line_changes,
            transition,
        })
    }

    /// Decides a post of `entry`.
    ///
    /// Already posted entries are left alone. Drafts must be non-empty and
    /// balanced, and every line account must still exist and be active.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if the entry is voided
    /// - `EmptyEntry` / `UnbalancedEntry` if the lines do not qualify
    /// - `MissingAccountAtPost` / `InactiveAccountAtPost` naming the first
    ///   offending account by line order
    pub fn prepare_post<A>(
        entry: &JournalEntry,
        account_lookup: A,
    ) -> Result<TransitionDecision, LedgerError>
    where
        A: Fn(AccountId) -> Option<LineAccountInfo>,
    {
        match entry.status {
            EntryStatus::Posted => Ok(TransitionDecision::Unchanged),
            EntryStatus::Voided => Err(LedgerError::InvalidTransition {
                from: EntryStatus::Voided,
                to: EntryStatus::Posted,
            }),
            EntryStatus::Draft => {
                Self::check_postable(
                    entry.lines.iter().map(|l| l.account_id),
                    entry.totals(),
                    &account_lookup,
                )?;
                Ok(TransitionDecision::Apply {
                    from: EntryStatus::Draft,
                    to: EntryStatus::Posted,
                })
            }
        }
    }

    /// Decides a void. Voiding a voided entry is a no-op.
    ///
    /// # Errors
    ///
    /// Every status may move to `Voided`, so this currently always succeeds.
    pub fn prepare_void(status: EntryStatus) -> Result<TransitionDecision, LedgerError> {
        TransitionDecision::between(status, EntryStatus::Voided)
    }

    /// Decides an un-post. Un-posting a draft is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for voided entries.
    pub fn prepare_unpost(status: EntryStatus) -> Result<TransitionDecision, LedgerError> {
        TransitionDecision::between(status, EntryStatus::Draft)
    }

    /// Validates that an entry can be deleted.
    ///
    /// # Errors
    ///
    /// Returns `CannotDeletePosted` for posted entries.
    pub fn ensure_deletable(status: EntryStatus) -> Result<(), LedgerError> {
        if status == EntryStatus::Posted {
            return Err(LedgerError::CannotDeletePosted);
        }
        Ok(())
    }

    fn plan_line_changes<A>(
        current: &JournalEntry,
        inputs: &[JournalLineInput],
        account_lookup: &A,
    ) -> Result<LineChanges, LedgerError>
    where
        A: Fn(AccountId) -> Option<LineAccountInfo>,
    {
        let mut kept = HashSet::with_capacity(inputs.len());
        for (line, input) in inputs.iter().enumerate() {
            let Some(line_id) = input.id else { continue };
            if current.line(line_id).is_none() {
                return Err(LedgerError::LineNotInEntry { line, line_id });
            }
            if !kept.insert(line_id) {
                return Err(LedgerError::DuplicateLine { line, line_id });
            }
        }

        let lines = validate_lines(inputs, account_lookup)?;
        totals_of(&lines).ensure_balanced()?;

        let removed = current
            .lines
            .iter()
            .map(|l| l.id)
            .filter(|id| !kept.contains(id))
            .collect();

        Ok(LineChanges { lines, removed })
    }

    fn check_postable<A>(
        accounts: impl ExactSizeIterator<Item = AccountId>,
        totals: LineTotals,
        account_lookup: &A,
    ) -> Result<(), LedgerError>
    where
        A: Fn(AccountId) -> Option<LineAccountInfo>,
    {
        if accounts.len() == 0 {
            return Err(LedgerError::EmptyEntry);
        }
        totals.ensure_balanced()?;

        for account_id in accounts {
            let account =
                account_lookup(account_id).ok_or(LedgerError::MissingAccountAtPost { account_id })?;
            if !account.is_active {
                return Err(LedgerError::InactiveAccountAtPost {
                    account_id,
                    code: account.code,
                });
            }
        }
        Ok(())
    }
}

fn normalize_reference(reference: Option<String>) -> Option<String> {
    reference
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
}

/// Returns true if `inputs` describes exactly the current lines, in order.
fn same_lines(current: &JournalEntry, inputs: &[JournalLineInput]) -> bool {
    current.lines.len() == inputs.len()
        && current.lines.iter().zip(inputs).all(|(line, input)| {
            let currency = match input.currency.as_deref() {
                None => Ok(CurrencyCode::default()),
                Some(code) => CurrencyCode::parse(code),
            };
            input.id == Some(line.id)
                && input.account_id == line.account_id
                && input.amount == line.amount
                && input.entry_type == line.entry_type
                && currency.is_ok_and(|c| c == line.currency)
        })
}
