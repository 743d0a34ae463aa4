//! Request validation performed before touching storage.

use gophermart_shared::types::Amount;

use super::LedgerError;
use crate::luhn;

/// Checks that a withdrawal request is well-formed.
///
/// # Errors
///
/// Returns `LedgerError::InvalidNumber` if `number` fails the Luhn check and
/// `LedgerError::InvalidAmount` if `sum` is not positive. The number is
/// checked first.
pub fn validate_withdrawal(number: &str, sum: Amount) -> Result<(), LedgerError> {
    if !luhn::is_valid(number) {
        return Err(LedgerError::InvalidNumber(number.to_string()));
    }
    if !sum.is_positive() {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(())
}
