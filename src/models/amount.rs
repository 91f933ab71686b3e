use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{SaccoError, SaccoResult};

/// Largest amount a single record may carry: 10 digits, 2 of them decimal.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Parse user input such as `"1,500.50"` into a checked, non-negative amount.
pub fn parse_amount(input: &str) -> SaccoResult<Decimal> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(SaccoError::validation("Amount is required"));
    }
    let amount = Decimal::from_str(&cleaned)
        .map_err(|_| SaccoError::validation(format!("'{}' is not a valid amount", input.trim())))?;
    check_amount(amount)
}

/// Non-negative, at most 2 decimal places, at most [`MAX_AMOUNT`].
pub fn check_amount(amount: Decimal) -> SaccoResult<Decimal> {
    if amount < Decimal::ZERO {
        return Err(SaccoError::validation("Amount cannot be negative"));
    }
    if amount.normalize().scale() > 2 {
        return Err(SaccoError::validation(
            "Amount cannot have more than 2 decimal places",
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(SaccoError::validation(format!(
            "Amount cannot exceed {MAX_AMOUNT}"
        )));
    }
    Ok(amount)
}

/// Like [`check_amount`], and zero is rejected too.
pub fn check_positive(amount: Decimal) -> SaccoResult<Decimal> {
    let amount = check_amount(amount)?;
    if amount.is_zero() {
        return Err(SaccoError::validation("Amount must be greater than zero"));
    }
    Ok(amount)
}

/// Read a decimal column written by SQLite, which may come back in exponent form.
/// Unreadable text counts as zero and is logged.
pub(crate) fn decimal_from_sql(text: &str) -> Decimal {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(&text.replace("e+", "e")))
        .unwrap_or_else(|e| {
            log::warn!("Unreadable stored amount '{text}' ({e}), counting it as 0");
            Decimal::ZERO
        })
}
