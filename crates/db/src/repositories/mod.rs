//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every write runs in one transaction; rule checks come from `tally-core`.

pub mod account;
pub mod journal;
pub mod report;

pub use account::{AccountError, AccountRepository};
pub use journal::{JournalError, JournalRepository};
pub use report::{ReportError, ReportRepository};

use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};

/// Case-insensitive substring match on a text column.
pub(crate) fn contains_ci(column: impl IntoColumnRef, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", needle.to_lowercase()))
}
