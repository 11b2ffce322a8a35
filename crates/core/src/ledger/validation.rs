//! Business rule validation for journal lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::money::AMOUNT_SCALE;
use tally_shared::types::{AccountId, CurrencyCode, is_within_tolerance, to_minor_units};

use super::entry::EntryType;
use super::error::LedgerError;
use super::types::{JournalLineInput, LineAccountInfo, ValidatedLine};

/// Debit and credit totals of a set of lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTotals {
    /// Sum of debit amounts.
    pub debits: Decimal,
    /// Sum of credit amounts.
    pub credits: Decimal,
}

impl LineTotals {
    /// Sums `(entry_type, amount)` pairs.
    pub fn from_lines(lines: impl IntoIterator<Item = (EntryType, Decimal)>) -> Self {
        lines
            .into_iter()
            .fold(Self::default(), |mut totals, (entry_type, amount)| {
                match entry_type {
                    EntryType::Debit => totals.debits += amount,
                    EntryType::Credit => totals.credits += amount,
                }
                totals
            })
    }

    /// Returns true if debits equal credits within tolerance.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        is_within_tolerance(self.debits, self.credits)
    }

    /// Fails with `UnbalancedEntry` unless balanced.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UnbalancedEntry` carrying both totals.
    pub fn ensure_balanced(&self) -> Result<(), LedgerError> {
        if self.is_balanced() {
            Ok(())
        } else {
            Err(LedgerError::UnbalancedEntry {
                debits: self.debits,
                credits: self.credits,
            })
        }
    }
}

/// Validates a single line at index `line`.
///
/// Checks run in input order: amount, currency, account.
///
/// # Errors
///
/// Returns the first rule the line violates.
pub fn validate_line<A>(
    line: usize,
    input: &JournalLineInput,
    account_lookup: &A,
) -> Result<ValidatedLine, LedgerError>
where
    A: Fn(AccountId) -> Option<LineAccountInfo>,
{
    if input.amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount { line });
    }
    if input.amount.normalize().scale() > AMOUNT_SCALE {
        return Err(LedgerError::ExcessAmountPrecision { line });
    }
    let amount_minor =
        to_minor_units(input.amount).ok_or(LedgerError::AmountOutOfRange { line })?;

    let currency = match input.currency.as_deref() {
        None => CurrencyCode::default(),
        Some(code) => CurrencyCode::parse(code).map_err(|_| LedgerError::InvalidCurrency {
            line,
            code: code.to_string(),
        })?,
    };

    let account = account_lookup(input.account_id).ok_or(LedgerError::UnknownLineAccount {
        line,
        account_id: input.account_id,
    })?;
    if !account.is_active {
        return Err(LedgerError::InactiveLineAccount {
            line,
            account_id: input.account_id,
        });
    }

    Ok(ValidatedLine {
        id: input.id,
        account_id: input.account_id,
        amount: input.amount,
        amount_minor,
        currency,
        entry_type: input.entry_type,
        position: i32::try_from(line).unwrap_or(i32::MAX),
    })
}

/// Validates every line, assigning positions by input order.
///
/// # Errors
///
/// Returns the first violation found, by line order.
pub fn validate_lines<A>(
    lines: &[JournalLineInput],
    account_lookup: &A,
) -> Result<Vec<ValidatedLine>, LedgerError>
where
    A: Fn(AccountId) -> Option<LineAccountInfo>,
{
    lines
        .iter()
        .enumerate()
        .map(|(index, input)| validate_line(index, input, account_lookup))
        .collect()
}

/// Totals of validated lines.
#[must_use]
pub fn totals_of(lines: &[ValidatedLine]) -> LineTotals {
    LineTotals::from_lines(lines.iter().map(|l| (l.entry_type, l.amount)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn active(id: AccountId) -> Option<LineAccountInfo> {
        Some(LineAccountInfo {
            id,
            code: "1000".into(),
            is_active: true,
        })
    }

    #[test]
    fn test_valid_lines_get_positions_and_defaults() {
        let a = AccountId::new();
        let b = AccountId::new();
        let lines = vec![
            JournalLineInput::debit(a, dec!(100)),
            JournalLineInput::credit(b, dec!(100)).with_currency("eur"),
        ];
        let validated = validate_lines(&lines, &active).unwrap();
        assert_eq!(validated[0].position, 0);
        assert_eq!(validated[1].position, 1);
        assert_eq!(validated[0].currency.as_str(), "USD");
        assert_eq!(validated[1].currency.as_str(), "EUR");
        assert_eq!(validated[0].amount_minor, 1_000_000);
        assert!(totals_of(&validated).is_balanced());
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        let a = AccountId::new();
        let lines = vec![
            JournalLineInput::debit(a, dec!(10)),
            JournalLineInput::credit(a, dec!(0)),
        ];
        assert_eq!(
            validate_lines(&lines, &active),
            Err(LedgerError::NonPositiveAmount { line: 1 })
        );

        let lines = vec![JournalLineInput::debit(a, dec!(-5))];
        assert_eq!(
            validate_lines(&lines, &active),
            Err(LedgerError::NonPositiveAmount { line: 0 })
        );
    }

    #[test]
    fn test_precision_limit() {
        let a = AccountId::new();
        assert!(validate_lines(&[JournalLineInput::debit(a, dec!(1.2345))], &active).is_ok());
        assert_eq!(
            validate_lines(&[JournalLineInput::debit(a, dec!(1.23456))], &active),
            Err(LedgerError::ExcessAmountPrecision { line: 0 })
        );
    }

    #[test]
    fn test_invalid_currency() {
        let a = AccountId::new();
        let lines = vec![JournalLineInput::debit(a, dec!(1)).with_currency("DOLLARS")];
        assert!(matches!(
            validate_lines(&lines, &active),
            Err(LedgerError::InvalidCurrency { line: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_and_inactive_accounts() {
        let a = AccountId::new();
        let lines = vec![JournalLineInput::debit(a, dec!(1))];
        assert_eq!(
            validate_lines(&lines, &|_: AccountId| None),
            Err(LedgerError::UnknownLineAccount {
                line: 0,
                account_id: a
            })
        );

        let inactive = |id| {
            Some(LineAccountInfo {
                id,
                code: "9999".into(),
                is_active: false,
            })
        };
        assert_eq!(
            validate_lines(&lines, &inactive),
            Err(LedgerError::InactiveLineAccount {
                line: 0,
                account_id: a
            })
        );
    }

    #[test]
    fn test_totals_and_tolerance() {
        let totals = LineTotals::from_lines([
            (EntryType::Debit, dec!(100)),
            (EntryType::Credit, dec!(99.99)),
        ]);
        assert!(!totals.is_balanced());
        assert_eq!(
            totals.ensure_balanced(),
            Err(LedgerError::UnbalancedEntry {
                debits: dec!(100),
                credits: dec!(99.99)
            })
        );

        let totals = LineTotals::from_lines([
            (EntryType::Debit, dec!(100)),
            (EntryType::Credit, dec!(100.0000000001)),
        ]);
        assert!(totals.is_balanced());
    }
}
