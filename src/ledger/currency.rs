//! Accounting-style amount parsing.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Parse a printed amount into a signed decimal.
///
/// Parentheses negate, thousands separators and currency symbols are
/// dropped: `"(1,234.56)"` is `-1234.56`, `"$1,234.56"` is `1234.56`.
pub fn currency_to_decimal(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    let (negative, inner) = match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = inner
        .chars()
        .filter(|c| !matches!(c, ',' | '$') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(Error::InvalidAmount(text.to_string()));
    }

    let value = Decimal::from_str(&cleaned).map_err(|_| Error::InvalidAmount(text.to_string()))?;
    Ok(if negative { -value } else { value })
}

/// Parse a printed amount as a float. Prefer [`currency_to_decimal`] for
/// anything that is summed.
pub fn currency_to_float(text: &str) -> Result<f64> {
    currency_to_decimal(text)?
        .to_f64()
        .ok_or_else(|| Error::InvalidAmount(text.to_string()))
}
