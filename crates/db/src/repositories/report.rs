//! Report repository for trial balance and account balance queries.
//!
//! Reads run in one transaction so a report never sees part of an entry.
//! On PostgreSQL the transaction is repeatable-read and read-only.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    AccessMode, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend,
    DbErr, EntityTrait, IsolationLevel, JoinType, QueryFilter, QuerySelect, RelationTrait,
    TransactionTrait,
};
use tally_core::ledger::EntryType;
use tally_core::reports::{
    AccountSnapshot, PostedLine, ReportRuleError, ReportService, TrialBalanceOptions,
    TrialBalanceReport,
};
use tally_shared::AppError;
use tally_shared::types::{AccountId, from_minor_units};
use tracing::{error, info, warn};

use crate::entities::{accounts, journal_entries, journal_lines, sea_orm_active_enums::EntryStatus};

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// No account row has the id.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// A report rule failed.
    #[error(transparent)]
    Rule(#[from] ReportRuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::AccountNotFound(id) => Self::not_found("account", id),
            ReportError::Rule(rule) => rule.into(),
            ReportError::Database(db) => {
                error!(error = %db, "report storage failure");
                Self::internal_with("database error", db)
            }
        }
    }
}

/// Report repository for ledger aggregation.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Generates a trial balance over posted entries.
    ///
    /// Only accounts active at generation time appear in the report.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `start_date` is after `end_date`
    /// - The columns do not balance (logged at error level)
    /// - The database query fails
    pub async fn generate_trial_balance(
        &self,
        options: TrialBalanceOptions,
    ) -> Result<TrialBalanceReport, ReportError> {
        ReportService::validate_range(&options)?;

        let txn = self.begin_read().await?;
        let lines = posted_lines(&txn, None, options.start_date, options.end_date).await?;
        let accounts = active_accounts(&txn).await?;
        txn.commit().await?;

        let balances = ReportService::accumulate(&lines);
        let excluded = ReportService::excluded_balances(&accounts, &balances);
        for (account_id, balance) in &excluded {
            warn!(%account_id, %balance, "balance on an inactive or deleted account left out of trial balance");
        }

        let report = ReportService::build_trial_balance(&options, accounts, &balances)
            .inspect_err(|err| {
                if let ReportRuleError::OutOfBalance { debits, credits } = err {
                    error!(
                        %debits,
                        %credits,
                        excluded_accounts = excluded.len(),
                        report_date = %options.end_date,
                        "trial balance out of balance"
                    );
                }
            })?;

        info!(
            report_date = %report.report_date,
            accounts = report.lines.len(),
            total = %report.total_debits,
            "trial balance generated"
        );
        Ok(report)
    }

    /// Returns the raw signed balance (debits minus credits) of one account
    /// over posted entries dated on or before `as_of`.
    ///
    /// Logically deleted accounts keep their history and still answer.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account row has the id.
    pub async fn balance_as_of(
        &self,
        account_id: AccountId,
        as_of: NaiveDate,
    ) -> Result<Decimal, ReportError> {
        let txn = self.begin_read().await?;

        let known = accounts::Entity::find_by_id(account_id.into_inner())
            .one(&txn)
            .await?;
        if known.is_none() {
            return Err(ReportError::AccountNotFound(account_id));
        }
        let lines = posted_lines(&txn, Some(account_id), None, as_of).await?;
        txn.commit().await?;

        Ok(ReportService::net_balance(&lines))
    }

    async fn begin_read(&self) -> Result<DatabaseTransaction, DbErr> {
        match self.db.get_database_backend() {
            DbBackend::Postgres => {
                self.db
                    .begin_with_config(
                        Some(IsolationLevel::RepeatableRead),
                        Some(AccessMode::ReadOnly),
                    )
                    .await
            }
            _ => self.db.begin().await,
        }
    }
}

/// Lines of posted, live entries dated within `[start, end]`.
async fn posted_lines<C>(
    conn: &C,
    account_id: Option<AccountId>,
    start: Option<NaiveDate>,
    end: NaiveDate,
) -> Result<Vec<PostedLine>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query = journal_lines::Entity::find()
        .join(JoinType::InnerJoin, journal_lines::Relation::JournalEntries.def())
        .filter(journal_entries::Column::Status.eq(EntryStatus::Posted))
        .filter(journal_entries::Column::DeletedAt.is_null())
        .filter(journal_entries::Column::EntryDate.lte(end));

    if let Some(start) = start {
        query = query.filter(journal_entries::Column::EntryDate.gte(start));
    }
    if let Some(account_id) = account_id {
        query = query.filter(journal_lines::Column::AccountId.eq(account_id.into_inner()));
    }

    let models = query.all(conn).await?;
    Ok(models
        .into_iter()
        .map(|m| PostedLine {
            account_id: AccountId::from_uuid(m.account_id),
            amount: from_minor_units(m.amount_minor),
            entry_type: EntryType::from_is_debit(m.is_debit),
        })
        .collect())
}

async fn active_accounts<C>(conn: &C) -> Result<Vec<AccountSnapshot>, DbErr>
where
    C: ConnectionTrait,
{
    let models = accounts::Entity::find()
        .filter(accounts::Column::IsActive.eq(true))
        .filter(accounts::Column::DeletedAt.is_null())
        .all(conn)
        .await?;

    Ok(models
        .into_iter()
        .map(|m| AccountSnapshot {
            id: AccountId::from_uuid(m.id),
            code: m.code,
            name: m.name,
            account_type: m.account_type.into(),
        })
        .collect())
}
