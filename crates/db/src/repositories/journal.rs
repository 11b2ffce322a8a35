//! Journal repository for journal entry database operations.
//!
//! Each operation loads the current state inside a transaction, asks
//! `LedgerService` for a plan, and writes the plan before committing.
//! Status flips are compare-and-set on the prior status.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tally_core::ledger::{
    CreateJournalEntryInput, EntryType, JournalEntry, JournalEntryFilter, JournalLine,
    LedgerError, LedgerEvent, LedgerObserver, LedgerService, TransitionDecision,
    UpdateJournalEntryInput, UpdatePlan, ValidatedLine,
};
use tally_shared::AppError;
use tally_shared::types::{
    AccountId, CurrencyCode, JournalEntryId, JournalLineId, PageRequest, PageResponse,
    from_minor_units,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::account::line_accounts;
use super::contains_ci;
use crate::audit::TracingObserver;
use crate::entities::{journal_entries, journal_lines, sea_orm_active_enums::EntryStatus};

/// Error types for journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A stored row cannot be read back.
    #[error("Corrupt journal row: {0}")]
    Corrupt(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::Ledger(ledger) => ledger.into(),
            JournalError::Corrupt(message) => {
                error!(%message, "corrupt journal row");
                Self::internal(message)
            }
            JournalError::Database(db) => {
                error!(error = %db, "journal storage failure");
                Self::internal_with("database error", db)
            }
        }
    }
}

/// Journal repository for entry lifecycle operations.
#[derive(Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    observer: Arc<dyn LedgerObserver>,
}

impl JournalRepository {
    /// Creates a new journal repository that audits to `tracing`.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the audit observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn LedgerObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Creates a journal entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A line has a non-positive amount, too many decimals, or a bad currency
    /// - A line references a missing, deleted, or inactive account
    /// - Debits do not equal credits
    /// - The requested status is `Voided`, or `Posted` with no lines
    pub async fn create(&self, input: CreateJournalEntryInput) -> Result<JournalEntry, JournalError> {
        let txn = self.db.begin().await?;

        let accounts = line_accounts(&txn, input.lines.iter().map(|l| l.account_id)).await?;
        let new_entry = LedgerService::prepare_create(input, Utc::now().date_naive(), |id| {
            accounts.get(&id).cloned()
        })?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        journal_entries::ActiveModel {
            id: Set(new_entry.id.into_inner()),
            entry_date: Set(new_entry.entry_date),
            description: Set(new_entry.description),
            reference: Set(new_entry.reference),
            status: Set(new_entry.status.into()),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        insert_lines(&txn, new_entry.id, &new_entry.lines, now).await?;

        let entry = load_entry(&txn, new_entry.id)
            .await?
            .ok_or(LedgerError::EntryNotFound(new_entry.id))?;
        txn.commit().await?;

        info!(
            entry_id = %entry.id,
            status = %entry.status,
            lines = entry.lines.len(),
            "journal entry created"
        );
        self.observer.record(&LedgerEvent::Created {
            entry_id: entry.id,
            status: entry.status,
        });
        Ok(entry)
    }

    /// Gets an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist or was deleted.
    pub async fn get(&self, id: JournalEntryId) -> Result<JournalEntry, JournalError> {
        load_entry(&self.db, id)
            .await?
            .ok_or(JournalError::Ledger(LedgerError::EntryNotFound(id)))
    }

    /// Applies a partial update, including an optional status transition.
    ///
    /// For drafts, `lines` is the desired final line set.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Entry does not exist
    /// - Lines or date change on a posted or voided entry
    /// - The transition is not allowed, or the post checks fail
    /// - Line ids do not belong to the entry, or the result is unbalanced
    /// - Another writer changed the status first
    pub async fn update(
        &self,
        id: JournalEntryId,
        patch: UpdateJournalEntryInput,
    ) -> Result<JournalEntry, JournalError> {
        let txn = self.db.begin().await?;

        let current = load_entry(&txn, id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;

        let referenced = current
            .lines
            .iter()
            .map(|l| l.account_id)
            .chain(patch.lines.iter().flatten().map(|l| l.account_id));
        let accounts = line_accounts(&txn, referenced).await?;
        let plan =
            LedgerService::prepare_update(&current, patch, |aid| accounts.get(&aid).cloned())?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let event = apply_plan(&txn, id, current.status, plan, now).await?;

        let entry = load_entry(&txn, id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        txn.commit().await?;

        info!(entry_id = %id, status = %entry.status, "journal entry updated");
        if let Some(event) = event {
            self.observer.record(&event);
        }
        Ok(entry)
    }

    /// Posts a draft entry. Posting a posted entry returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Entry does not exist
    /// - Entry is voided
    /// - Entry has no lines or is unbalanced
    /// - A line account was deleted or deactivated since the line was written
    pub async fn post(&self, id: JournalEntryId) -> Result<JournalEntry, JournalError> {
        let txn = self.db.begin().await?;

        let entry = load_entry(&txn, id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        let accounts = line_accounts(&txn, entry.lines.iter().map(|l| l.account_id)).await?;
        let decision = LedgerService::prepare_post(&entry, |aid| accounts.get(&aid).cloned())?;

        self.finish_transition(txn, entry, decision).await
    }

    /// Voids an entry. Voiding a voided entry returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist, or
    /// `ConcurrentModification` if another writer changed the status first.
    pub async fn void(&self, id: JournalEntryId) -> Result<JournalEntry, JournalError> {
        let txn = self.db.begin().await?;

        let entry = load_entry(&txn, id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        let decision = LedgerService::prepare_void(entry.status)?;

        self.finish_transition(txn, entry, decision).await
    }

    /// Returns a posted entry to draft. A draft is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist, or
    /// `InvalidTransition` if it is voided.
    pub async fn unpost(&self, id: JournalEntryId) -> Result<JournalEntry, JournalError> {
        let txn = self.db.begin().await?;

        let entry = load_entry(&txn, id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        let decision = LedgerService::prepare_unpost(entry.status)?;

        self.finish_transition(txn, entry, decision).await
    }

    /// Deletes a draft or voided entry: the header is logically deleted and
    /// its lines are removed.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist, or
    /// `CannotDeletePosted` if it is posted.
    pub async fn delete(&self, id: JournalEntryId) -> Result<(), JournalError> {
        let txn = self.db.begin().await?;

        let header = find_header(&txn, id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        LedgerService::ensure_deletable(header.status.into())?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = journal_entries::Entity::update_many()
            .col_expr(journal_entries::Column::DeletedAt, Expr::value(Some(now)))
            .col_expr(journal_entries::Column::UpdatedAt, Expr::value(now))
            .filter(journal_entries::Column::Id.eq(id.into_inner()))
            .filter(journal_entries::Column::Status.eq(header.status))
            .filter(journal_entries::Column::DeletedAt.is_null())
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            warn!(entry_id = %id, "delete lost a race");
            return Err(LedgerError::ConcurrentModification.into());
        }

        journal_lines::Entity::delete_many()
            .filter(journal_lines::Column::EntryId.eq(id.into_inner()))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(entry_id = %id, "journal entry deleted");
        self.observer.record(&LedgerEvent::Deleted { entry_id: id });
        Ok(())
    }

    /// Lists entries, newest first, with their lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a row is corrupt.
    pub async fn list(
        &self,
        filter: &JournalEntryFilter,
        page: PageRequest,
    ) -> Result<PageResponse<JournalEntry>, JournalError> {
        let page = page.normalized();

        let mut query =
            journal_entries::Entity::find().filter(journal_entries::Column::DeletedAt.is_null());

        if let Some(text) = filter.description_contains.as_deref() {
            query = query.filter(contains_ci(journal_entries::Column::Description, text));
        }
        if let Some(text) = filter.reference_contains.as_deref() {
            query = query.filter(contains_ci(journal_entries::Column::Reference, text));
        }
        if let Some(status) = filter.status {
            query = query.filter(journal_entries::Column::Status.eq(EntryStatus::from(status)));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }
        if let Some(account_id) = filter.account_id {
            query = query.filter(
                journal_entries::Column::Id.in_subquery(
                    Query::select()
                        .column(journal_lines::Column::EntryId)
                        .from(journal_lines::Entity)
                        .and_where(journal_lines::Column::AccountId.eq(account_id.into_inner()))
                        .to_owned(),
                ),
            );
        }

        let paginator = query
            .order_by_desc(journal_entries::Column::EntryDate)
            .order_by_desc(journal_entries::Column::CreatedAt)
            .order_by_desc(journal_entries::Column::Id)
            .paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let headers = paginator.fetch_page(page.index()).await?;

        let mut lines_by_entry = load_lines(&self.db, headers.iter().map(|h| h.id)).await?;
        let entries = headers
            .into_iter()
            .map(|header| {
                let lines = lines_by_entry.remove(&header.id).unwrap_or_default();
                to_entry(header, lines)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(entries, page, total))
    }

    async fn finish_transition(
        &self,
        txn: sea_orm::DatabaseTransaction,
        entry: JournalEntry,
        decision: TransitionDecision,
    ) -> Result<JournalEntry, JournalError> {
        let TransitionDecision::Apply { from, to } = decision else {
            txn.commit().await?;
            return Ok(entry);
        };

        let now: DateTimeWithTimeZone = Utc::now().into();
        let event = flip_status(&txn, entry.id, from, to, now).await?;
        let entry = load_entry(&txn, entry.id)
            .await?
            .ok_or(LedgerError::EntryNotFound(entry.id))?;
        txn.commit().await?;

        info!(entry_id = %entry.id, %from, %to, "journal entry status changed");
        self.observer.record(&event);
        Ok(entry)
    }
}

/// Writes an update plan computed against an entry in `status`.
/// Returns the transition event, if any.
///
/// The header write is guarded on `status`, so a plan made from a stale
/// snapshot fails instead of rewriting the lines of an entry that another
/// writer posted in the meantime.
async fn apply_plan<C>(
    conn: &C,
    id: JournalEntryId,
    status: tally_core::ledger::EntryStatus,
    plan: UpdatePlan,
    now: DateTimeWithTimeZone,
) -> Result<Option<LedgerEvent>, JournalError>
where
    C: ConnectionTrait,
{
    let touches_header = plan.touches_header();
    let touches_lines = plan.line_changes.is_some();

    if touches_header || touches_lines {
        let mut update = journal_entries::Entity::update_many()
            .col_expr(journal_entries::Column::UpdatedAt, Expr::value(now))
            .filter(journal_entries::Column::Id.eq(id.into_inner()))
            .filter(journal_entries::Column::Status.eq(EntryStatus::from(status)))
            .filter(journal_entries::Column::DeletedAt.is_null());
        if let Some(entry_date) = plan.entry_date {
            update = update.col_expr(journal_entries::Column::EntryDate, Expr::value(entry_date));
        }
        if let Some(description) = plan.description {
            update = update.col_expr(journal_entries::Column::Description, Expr::value(description));
        }
        if let Some(reference) = plan.reference {
            update = update.col_expr(journal_entries::Column::Reference, Expr::value(reference));
        }
        if update.exec(conn).await?.rows_affected == 0 {
            warn!(entry_id = %id, %status, "update lost a race");
            return Err(LedgerError::ConcurrentModification.into());
        }
    }

    if let Some(changes) = plan.line_changes {
        if !changes.removed.is_empty() {
            journal_lines::Entity::delete_many()
                .filter(journal_lines::Column::EntryId.eq(id.into_inner()))
                .filter(
                    journal_lines::Column::Id
                        .is_in(changes.removed.iter().map(|l| l.into_inner())),
                )
                .exec(conn)
                .await?;
        }

        let (existing, inserted): (Vec<_>, Vec<_>) =
            changes.lines.into_iter().partition(|l| l.id.is_some());
        for line in existing {
            let Some(line_id) = line.id else { continue };
            journal_lines::Entity::update_many()
                .col_expr(
                    journal_lines::Column::AccountId,
                    Expr::value(line.account_id.into_inner()),
                )
                .col_expr(journal_lines::Column::AmountMinor, Expr::value(line.amount_minor))
                .col_expr(
                    journal_lines::Column::Currency,
                    Expr::value(line.currency.as_str().to_string()),
                )
                .col_expr(
                    journal_lines::Column::IsDebit,
                    Expr::value(line.entry_type.is_debit()),
                )
                .col_expr(journal_lines::Column::Position, Expr::value(line.position))
                .filter(journal_lines::Column::Id.eq(line_id.into_inner()))
                .filter(journal_lines::Column::EntryId.eq(id.into_inner()))
                .exec(conn)
                .await?;
        }
        insert_lines(conn, id, &inserted, now).await?;
    }

    match plan.transition {
        TransitionDecision::Unchanged => Ok(None),
        TransitionDecision::Apply { from, to } => {
            flip_status(conn, id, from, to, now).await.map(Some)
        }
    }
}

/// Compare-and-set of the entry status.
async fn flip_status<C>(
    conn: &C,
    id: JournalEntryId,
    from: tally_core::ledger::EntryStatus,
    to: tally_core::ledger::EntryStatus,
    now: DateTimeWithTimeZone,
) -> Result<LedgerEvent, JournalError>
where
    C: ConnectionTrait,
{
    let result = journal_entries::Entity::update_many()
        .col_expr(journal_entries::Column::Status, Expr::value(EntryStatus::from(to)))
        .col_expr(journal_entries::Column::UpdatedAt, Expr::value(now))
        .filter(journal_entries::Column::Id.eq(id.into_inner()))
        .filter(journal_entries::Column::Status.eq(EntryStatus::from(from)))
        .filter(journal_entries::Column::DeletedAt.is_null())
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        warn!(entry_id = %id, %from, %to, "status flip lost a race");
        return Err(LedgerError::ConcurrentModification.into());
    }
    Ok(LedgerEvent::transition(id, from, to))
}

async fn insert_lines<C>(
    conn: &C,
    entry_id: JournalEntryId,
    lines: &[ValidatedLine],
    now: DateTimeWithTimeZone,
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if lines.is_empty() {
        return Ok(());
    }

    let models = lines.iter().map(|line| journal_lines::ActiveModel {
        id: Set(JournalLineId::new().into_inner()),
        entry_id: Set(entry_id.into_inner()),
        account_id: Set(line.account_id.into_inner()),
        amount_minor: Set(line.amount_minor),
        currency: Set(line.currency.as_str().to_string()),
        is_debit: Set(line.entry_type.is_debit()),
        position: Set(line.position),
        created_at: Set(now),
    });
    journal_lines::Entity::insert_many(models).exec(conn).await?;
    Ok(())
}

async fn find_header<C>(
    conn: &C,
    id: JournalEntryId,
) -> Result<Option<journal_entries::Model>, DbErr>
where
    C: ConnectionTrait,
{
    journal_entries::Entity::find_by_id(id.into_inner())
        .filter(journal_entries::Column::DeletedAt.is_null())
        .one(conn)
        .await
}

async fn load_entry<C>(conn: &C, id: JournalEntryId) -> Result<Option<JournalEntry>, JournalError>
where
    C: ConnectionTrait,
{
    let Some(header) = find_header(conn, id).await? else {
        return Ok(None);
    };
    let mut lines = load_lines(conn, [header.id]).await?;
    let lines = lines.remove(&header.id).unwrap_or_default();
    to_entry(header, lines).map(Some)
}

/// Loads the lines of the given entries, grouped by entry and ordered by position.
async fn load_lines<C>(
    conn: &C,
    entry_ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, Vec<journal_lines::Model>>, DbErr>
where
    C: ConnectionTrait,
{
    let entry_ids: Vec<Uuid> = entry_ids.into_iter().collect();
    if entry_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = journal_lines::Entity::find()
        .filter(journal_lines::Column::EntryId.is_in(entry_ids))
        .order_by_asc(journal_lines::Column::EntryId)
        .order_by_asc(journal_lines::Column::Position)
        .all(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<journal_lines::Model>> = HashMap::new();
    for model in models {
        grouped.entry(model.entry_id).or_default().push(model);
    }
    Ok(grouped)
}

fn to_entry(
    header: journal_entries::Model,
    lines: Vec<journal_lines::Model>,
) -> Result<JournalEntry, JournalError> {
    let lines = lines
        .into_iter()
        .map(to_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(JournalEntry {
        id: JournalEntryId::from_uuid(header.id),
        entry_date: header.entry_date,
        description: header.description,
        reference: header.reference,
        status: header.status.into(),
        lines,
        created_at: header.created_at.with_timezone(&Utc),
        updated_at: header.updated_at.with_timezone(&Utc),
    })
}

fn to_line(model: journal_lines::Model) -> Result<JournalLine, JournalError> {
    let currency = CurrencyCode::parse(&model.currency)
        .map_err(|e| JournalError::Corrupt(format!("line {}: {e}", model.id)))?;

    Ok(JournalLine {
        id: JournalLineId::from_uuid(model.id),
        entry_id: JournalEntryId::from_uuid(model.entry_id),
        account_id: AccountId::from_uuid(model.account_id),
        amount: from_minor_units(model.amount_minor),
        currency,
        entry_type: EntryType::from_is_debit(model.is_debit),
        position: model.position,
    })
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
