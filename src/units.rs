//! Conversion between display amounts and token base units.

use crate::error::Error;
use alloy_primitives::U256;

/// Parses a user-entered amount into base units. Never rounds: an amount with more
/// fractional digits than `decimals` is rejected.
///
/// Accepted syntax is plain decimal digits with an optional leading `+` and at most one
/// `.` (`"1"`, `"1.5"`, `".5"`, `"1."`). Separators, signs other than `+` and exponents
/// are rejected.
pub fn parse_units(text: &str, decimals: u8) -> Result<U256, Error> {
    let invalid = || Error::InvalidAmount(text.to_string());
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(invalid());
    }

    // Trailing zeros carry no precision.
    let fraction = fraction.trim_end_matches('0');
    let scale = usize::from(decimals);
    if fraction.len() > scale {
        return Err(Error::AmountPrecisionError {
            amount: trimmed.to_string(),
            decimals,
        });
    }

    let digits = format!("{}{}{}", whole, fraction, "0".repeat(scale - fraction.len()));
    let value = if digits.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&digits, 10).map_err(|_| invalid())?
    };
    if value.is_zero() {
        return Err(invalid());
    }
    Ok(value)
}

/// Formats base units for display, keeping at least one fractional digit.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return format!("{}.0", digits);
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}
