//! Conversion between smallest-unit integers and whole-unit decimal strings.
//!
//! Formatting trims trailing zeros but keeps one fractional digit
//! (`1000000000000000000` at 18 decimals is `"1.0"`). Parsing refuses any
//! input that would lose precision instead of rounding it away.
//!
//! `alloy_primitives::utils` is not used here: its `parse_units` drops
//! fractional digits beyond the unit, its formatting pads to the full
//! number of decimals, and it only accepts units up to 77.

use alloy_primitives::U256;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid amount: {0}")]
    Malformed(String),

    #[error("Amount must be greater than zero")]
    NotPositive,

    /// More fractional digits than the token supports.
    #[error("Amount has more than {decimals} decimal places")]
    PrecisionExceeded { decimals: u8 },

    #[error("Amount is too large")]
    OutOfRange,
}

/// Format `amount` (smallest unit) as a whole-unit decimal string.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let decimals = decimals as usize;
    let digits = amount.to_string();

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    let frac_part = if frac_part.is_empty() { "0" } else { frac_part };

    format!("{int_part}.{frac_part}")
}

/// Parse a whole-unit decimal string into the smallest unit.
///
/// Accepts plain decimal notation (`"1"`, `"1.5"`, `".5"`). Trailing zeros
/// in the fractional part do not count against `decimals`. Zero, negative
/// and non-numeric input is rejected.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (int_part, frac_part) = amount.split_once('.').unwrap_or((amount, ""));

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(int_part)
        || !is_digits(frac_part)
        || (int_part.is_empty() && frac_part.is_empty())
    {
        return Err(UnitsError::Malformed(amount.to_string()));
    }

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.len() > decimals as usize {
        return Err(UnitsError::PrecisionExceeded { decimals });
    }

    let scaled = format!(
        "{int_part}{frac_part}{}",
        "0".repeat(decimals as usize - frac_part.len())
    );
    let scaled = scaled.trim_start_matches('0');
    if scaled.is_empty() {
        return Err(UnitsError::NotPositive);
    }

    U256::from_str_radix(scaled, 10).map_err(|_| UnitsError::OutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_and_fraction() {
        let wei = U256::from(2_500_000_000_000_000_000u128);
        assert_eq!(format_units(wei, 18), "2.5");
    }

    #[test]
    fn test_format_keeps_one_fraction_digit() {
        let wei = U256::from(1_000_000_000_000_000_000u128);
        assert_eq!(format_units(wei, 18), "1.0");
        assert_eq!(format_units(U256::ZERO, 18), "0.0");
        assert_eq!(format_units(U256::from(42), 0), "42.0");
    }

    #[test]
    fn test_format_small_amount() {
        assert_eq!(format_units(U256::from(1), 18), "0.000000000000000001");
        assert_eq!(format_units(U256::from(150), 2), "1.5");
        assert_eq!(format_units(U256::from(5), 2), "0.05");
    }

    #[test]
    fn test_format_large_decimals() {
        // 10^77 does not fit in 256 bits; formatting must still work.
        let formatted = format_units(U256::from(7), 100);
        assert_eq!(formatted, format!("0.{}7", "0".repeat(99)));
    }

    #[test]
    fn test_parse_large_decimals() {
        let amount = format!("0.{}7", "0".repeat(99));
        assert_eq!(parse_units(&amount, 100).unwrap(), U256::from(7));
    }

    #[test]
    fn test_parse_eighteen_decimals() {
        let parsed = parse_units("1.5", 18).unwrap();
        assert_eq!(parsed, U256::from(1_500_000_000_000_000_000u128));
    }

    #[test]
    fn test_parse_two_decimals() {
        assert_eq!(parse_units("1.5", 2).unwrap(), U256::from(150));
        assert_eq!(parse_units("3", 2).unwrap(), U256::from(300));
        assert_eq!(parse_units(".25", 2).unwrap(), U256::from(25));
        assert_eq!(parse_units("7.", 0).unwrap(), U256::from(7));
    }

    #[test]
    fn test_parse_precision_exceeded() {
        assert_eq!(
            parse_units("1.234", 2),
            Err(UnitsError::PrecisionExceeded { decimals: 2 })
        );
        assert_eq!(
            parse_units("0.5", 0),
            Err(UnitsError::PrecisionExceeded { decimals: 0 })
        );
    }

    #[test]
    fn test_parse_trailing_zeros_allowed() {
        assert_eq!(parse_units("1.500", 1).unwrap(), U256::from(15));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(parse_units("", 18), Err(UnitsError::Empty));
        assert!(matches!(parse_units("abc", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("-1", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("1.2.3", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units(".", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("1e5", 18), Err(UnitsError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_zero() {
        assert_eq!(parse_units("0", 18), Err(UnitsError::NotPositive));
        assert_eq!(parse_units("0.000", 2), Err(UnitsError::NotPositive));
    }

    #[test]
    fn test_parse_out_of_range() {
        let huge = "9".repeat(80);
        assert_eq!(parse_units(&huge, 0), Err(UnitsError::OutOfRange));
    }

    #[test]
    fn test_format_parse_agree_on_display_values() {
        let parsed = parse_units("2.5", 18).unwrap();
        assert_eq!(format_units(parsed, 18), "2.5");
    }
}
