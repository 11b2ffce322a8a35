//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` in memory and integer
//! ten-thousandths in storage.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Maximum number of fractional digits an amount may carry.
pub const AMOUNT_SCALE: u32 = 4;

/// Storage units per major currency unit (10^`AMOUNT_SCALE`).
pub const MINOR_UNITS_PER_MAJOR: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Largest difference between two totals still considered equal (1e-9).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Returns true when `a` and `b` differ by at most [`BALANCE_TOLERANCE`].
#[must_use]
pub fn is_within_tolerance(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= BALANCE_TOLERANCE
}

/// Converts an amount into integer ten-thousandths.
///
/// Returns `None` when the amount has more than [`AMOUNT_SCALE`] fractional
/// digits or does not fit in an `i64`.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    if amount.normalize().scale() > AMOUNT_SCALE {
        return None;
    }
    amount.checked_mul(MINOR_UNITS_PER_MAJOR)?.to_i64()
}

/// Converts integer ten-thousandths back into a decimal amount.
///
/// The result keeps at least two fractional digits so `100` reads back as
/// `100.00`.
#[must_use]
pub fn from_minor_units(minor: i64) -> Decimal {
    let mut amount = Decimal::new(minor, AMOUNT_SCALE).normalize();
    if amount.scale() < 2 {
        amount.rescale(2);
    }
    amount
}

/// Three-letter uppercase currency code (e.g. "USD", "IDR").
///
/// Only the shape is validated; the ledger does no currency conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

/// Error returned for a malformed currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid currency code '{0}': expected three ASCII letters")]
pub struct InvalidCurrencyCode(pub String);

impl CurrencyCode {
    /// Default currency for lines that do not name one.
    pub const DEFAULT: &'static str = "USD";

    /// Parses a code, accepting any letter case.
    pub fn parse(code: &str) -> Result<Self, InvalidCurrencyCode> {
        let trimmed = code.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(InvalidCurrencyCode(code.to_string()))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = InvalidCurrencyCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = InvalidCurrencyCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
