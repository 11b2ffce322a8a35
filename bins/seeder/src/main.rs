//! Database seeder for Tally development and testing.
//!
//! Seeds a small chart of accounts and a few posted entries, then logs the
//! resulting trial balance. Running it twice leaves the data unchanged.
//!
//! Usage: cargo run --bin seeder

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm_migration::MigratorTrait;
use tally_core::account::{Account, AccountType, CreateAccountInput};
use tally_core::ledger::{CreateJournalEntryInput, JournalEntryFilter, JournalLineInput};
use tally_core::reports::TrialBalanceOptions;
use tally_db::migration::Migrator;
use tally_db::repositories::AccountError;
use tally_db::{AccountRepository, JournalRepository, ReportRepository};
use tally_shared::AppConfig;
use tally_shared::telemetry::init_tracing;
use tally_shared::types::PageRequest;
use tracing::info;

/// Demo chart of accounts: code, name, type.
const CHART: [(&str, &str, AccountType); 5] = [
    ("1000", "Cash", AccountType::Asset),
    ("2000", "Accounts Payable", AccountType::Liability),
    ("3000", "Owner's Equity", AccountType::Equity),
    ("4000", "Revenue", AccountType::Revenue),
    ("5000", "Expense", AccountType::Expense),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.log)?;

    let db = tally_db::connect(&config.database).await?;
    Migrator::up(&db, None).await?;

    let accounts = AccountRepository::new(db.clone());
    let journal = JournalRepository::new(db.clone());
    let reports = ReportRepository::new(db);

    info!("seeding chart of accounts");
    let mut chart = Vec::with_capacity(CHART.len());
    for (code, name, account_type) in CHART {
        chart.push(seed_account(&accounts, code, name, account_type).await?);
    }
    let [cash, _payable, equity, revenue, expense] = <[Account; 5]>::try_from(chart)
        .map_err(|_| anyhow::anyhow!("chart of accounts is incomplete"))?;

    let existing = journal
        .list(&JournalEntryFilter::default(), PageRequest::new(1, 1))
        .await?;
    if existing.meta.total > 0 {
        info!(entries = existing.meta.total, "journal already seeded, skipping entries");
    } else {
        info!("seeding journal entries");
        let entries = [
            ("Owner investment", date(2023, 10, 1)?, &cash, &equity, dec!(10000.00)),
            ("Cash sale", date(2023, 10, 15)?, &cash, &revenue, dec!(500.00)),
            ("Office supplies", date(2023, 10, 16)?, &expense, &cash, dec!(100.00)),
        ];
        for (description, on, debit, credit, amount) in entries {
            post_entry(&journal, description, on, debit, credit, amount).await?;
        }
    }

    let report = reports
        .generate_trial_balance(TrialBalanceOptions::as_of(date(2023, 10, 31)?))
        .await?;
    for line in &report.lines {
        info!(
            code = %line.code,
            name = %line.name,
            debit = %line.debit,
            credit = %line.credit,
            abnormal = line.abnormal,
            "trial balance line"
        );
    }
    info!(
        total_debits = %report.total_debits,
        total_credits = %report.total_credits,
        "seeding complete"
    );
    Ok(())
}

/// Returns the account with `code`, creating it when missing.
async fn seed_account(
    accounts: &AccountRepository,
    code: &str,
    name: &str,
    account_type: AccountType,
) -> anyhow::Result<Account> {
    match accounts.get_by_code(code).await {
        Ok(account) => {
            info!(%code, "account already exists, skipping");
            Ok(account)
        }
        Err(AccountError::CodeNotFound(_)) => Ok(accounts
            .create(CreateAccountInput::new(code, name, account_type))
            .await?),
        Err(err) => Err(err.into()),
    }
}

async fn post_entry(
    journal: &JournalRepository,
    description: &str,
    on: NaiveDate,
    debit: &Account,
    credit: &Account,
    amount: Decimal,
) -> anyhow::Result<()> {
    let entry = journal
        .create(
            CreateJournalEntryInput::new(
                description,
                vec![
                    JournalLineInput::debit(debit.id, amount),
                    JournalLineInput::credit(credit.id, amount),
                ],
            )
            .on(on),
        )
        .await?;
    journal.post(entry.id).await?;
    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow::anyhow!("invalid seed date {year}-{month}-{day}"))
}
