//! Money Conversion Module
//!
//! Unified handling of monetary amounts. All amounts in the settlement
//! engine are `rust_decimal::Decimal` values carrying exactly 2 fractional
//! digits (rupees and paise). Client input arrives as strings and MUST be
//! parsed through this module; floating point never touches balance math.

use rust_decimal::Decimal;
use thiserror::Error;

/// Fractional digits carried by every ledger amount.
pub const MONEY_SCALE: u32 = 2;

#[derive(Debug, Error, PartialEq)]
pub enum MoneyError {
    #[error("Amount must be positive")]
    NotPositive,

    #[error("Amount supports at most {MONEY_SCALE} decimal places, got {0}")]
    PrecisionOverflow(u32),

    #[error("Invalid amount format: {0}")]
    InvalidFormat(String),
}

/// Parse a client amount string into a 2dp positive Decimal.
///
/// Rejects zero, negatives, and more than 2 fractional digits. The result
/// is always rescaled to exactly 2 digits so that equality and arithmetic
/// stay exact across the engine.
pub fn parse_amount(input: &str) -> Result<Decimal, MoneyError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    let mut amount: Decimal = input
        .parse()
        .map_err(|_| MoneyError::InvalidFormat(input.to_string()))?;

    if amount <= Decimal::ZERO {
        return Err(MoneyError::NotPositive);
    }

    if amount.scale() > MONEY_SCALE {
        return Err(MoneyError::PrecisionOverflow(amount.scale()));
    }

    amount.rescale(MONEY_SCALE);
    Ok(amount)
}

/// Rescale an engine-computed amount back to 2 digits.
///
/// Additions and subtractions of 2dp values stay at 2dp, but this keeps the
/// invariant explicit at the points where rows are written.
pub fn normalize(mut amount: Decimal) -> Decimal {
    amount.rescale(MONEY_SCALE);
    amount
}

/// Render an amount with the rupee sign and en-IN digit grouping
/// (1234567.89 -> "₹12,34,567.89"). Display only, never parsed back.
pub fn format_inr(amount: Decimal) -> String {
    let normalized = normalize(amount.abs());
    let text = normalized.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (text, "00".to_string()),
    };

    // Indian grouping: last three digits, then groups of two.
    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    let n = digits.len();
    for (idx, ch) in digits.iter().enumerate() {
        grouped.push(*ch);
        let remaining = n - idx - 1;
        if remaining == 0 {
            continue;
        }
        if remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0) {
            grouped.push(',');
        }
    }

    let sign = if amount.is_sign_negative() { "-" } else { "" };
    format!("{}₹{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_amount_valid() {
        assert_eq!(parse_amount("100").unwrap(), dec("100.00"));
        assert_eq!(parse_amount("  99.5 ").unwrap(), dec("99.50"));
        assert_eq!(parse_amount("0.01").unwrap(), dec("0.01"));
        assert_eq!(parse_amount("100").unwrap().scale(), MONEY_SCALE);
    }

    #[test]
    fn test_parse_amount_rejects_non_positive() {
        assert_eq!(parse_amount("0").unwrap_err(), MoneyError::NotPositive);
        assert_eq!(parse_amount("-5").unwrap_err(), MoneyError::NotPositive);
        assert_eq!(parse_amount("0.00").unwrap_err(), MoneyError::NotPositive);
    }

    #[test]
    fn test_parse_amount_rejects_excess_precision() {
        assert_eq!(
            parse_amount("10.005").unwrap_err(),
            MoneyError::PrecisionOverflow(3)
        );
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(
            parse_amount("ten rupees"),
            Err(MoneyError::InvalidFormat(_))
        ));
        assert!(matches!(parse_amount(""), Err(MoneyError::InvalidFormat(_))));
    }

    #[test]
    fn test_format_inr_grouping() {
        assert_eq!(format_inr(dec("100")), "₹100.00");
        assert_eq!(format_inr(dec("1234")), "₹1,234.00");
        assert_eq!(format_inr(dec("1234567.89")), "₹12,34,567.89");
        assert_eq!(format_inr(dec("100000")), "₹1,00,000.00");
        assert_eq!(format_inr(dec("-250.5")), "-₹250.50");
    }

    #[test]
    fn test_normalize_keeps_two_digits() {
        let sum = dec("40.00") + dec("60.00");
        assert_eq!(normalize(sum), dec("100.00"));
        assert_eq!(normalize(sum).scale(), MONEY_SCALE);
    }
}
