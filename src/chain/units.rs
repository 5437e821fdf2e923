//! Decimal unit scaling and JSON-RPC quantities over [`U256`].
//!
//! Amounts typed in chat are decimal strings; on chain they are base units
//! (`amount * 10^decimals`). Scaling is exact: excess fractional digits are
//! an error, never truncated.

use crate::types::{Error, Result};
use alloy_primitives::U256;

/// Scale a decimal amount (`"1.5"`) to base units for `decimals`.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() || !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(Error::validation(format!("{} is not a decimal amount", amount)));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(Error::validation(format!(
            "{} has more than {} decimal places",
            amount, decimals
        )));
    }
    let mut digits = String::with_capacity(whole.len() + usize::from(decimals));
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(usize::from(decimals) - fraction.len()));
    U256::from_str_radix(&digits, 10)
        .map_err(|_| Error::validation(format!("{} overflows 256 bits", amount)))
}

/// Render base units as a decimal amount with trailing zeros trimmed.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Parse a JSON-RPC hex quantity (`0x1a`, `0x0`) or a 32-byte word.
pub(crate) fn from_hex_quantity(text: &str) -> Result<U256> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    if digits.len() > 64 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::validation(format!("invalid hex quantity: {}", text)));
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| Error::validation(format!("invalid hex quantity {}: {}", text, e)))
}

/// JSON-RPC quantity encoding: `0x` plus hex without leading zeros.
pub(crate) fn to_hex_quantity(value: &U256) -> String {
    format!("0x{:x}", value)
}

/// Big-endian bytes without leading zeros (empty for zero).
pub(crate) fn minimal_be_bytes(value: &U256) -> Vec<u8> {
    let bytes = value.to_be_bytes::<32>();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(32);
    bytes[first..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_units_scales_exactly() {
        assert_eq!(parse_units("5", 0).unwrap(), U256::from(5u64));
        assert_eq!(parse_units("1.5", 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(parse_units("1", 18).unwrap().to_string(), "1000000000000000000");
        assert_eq!(parse_units("0.000000000000000001", 18).unwrap(), U256::from(1u64));
    }

    #[test]
    fn test_parse_units_rejects_excess_precision() {
        assert!(parse_units("1.2345", 2).is_err());
        assert!(parse_units("1.5", 0).is_err());
    }

    #[test]
    fn test_parse_units_rejects_non_digits() {
        assert!(parse_units("1_000", 0).is_err());
        assert!(parse_units("1\u{0663}", 0).is_err());
        assert!(parse_units(".5", 2).is_err());
        assert!(parse_units("", 2).is_err());
    }

    #[test]
    fn test_parse_units_handles_77_decimals() {
        let value = parse_units("1", 77).unwrap();
        assert_eq!(value.to_string(), format!("1{}", "0".repeat(77)));
        assert!(parse_units("2", 77).is_err(), "2e77 exceeds 2^256");
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(1u64), 18), "0.000000000000000001");
        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(format_units(U256::from(42u64), 0), "42");
        assert_eq!(format_units(U256::from(3_000_000u64), 6), "3");
    }

    #[test]
    fn test_hex_quantities() {
        assert_eq!(from_hex_quantity("0x0").unwrap(), U256::ZERO);
        assert_eq!(from_hex_quantity("0x").unwrap(), U256::ZERO);
        assert_eq!(from_hex_quantity("0x1a").unwrap(), U256::from(26u64));
        assert_eq!(from_hex_quantity("0xabc").unwrap(), U256::from(0xabcu64));
        assert!(from_hex_quantity("0xzz").is_err());
        assert_eq!(to_hex_quantity(&U256::from(26u64)), "0x1a");
        assert_eq!(to_hex_quantity(&U256::ZERO), "0x0");
        assert!(minimal_be_bytes(&U256::ZERO).is_empty());
        assert_eq!(minimal_be_bytes(&U256::from(0x0102u64)), vec![0x01, 0x02]);
    }

    proptest! {
        #[test]
        fn scaling_agrees_with_integer_math(whole in 0u64..1_000_000, frac in 0u64..1_000_000) {
            let amount = format!("{}.{:06}", whole, frac);
            let expected = whole * 1_000_000 + frac;
            prop_assert_eq!(parse_units(&amount, 6).unwrap(), U256::from(expected));
        }

        #[test]
        fn format_inverts_parse(value in any::<u64>(), decimals in 0u8..30) {
            let rendered = format_units(U256::from(value), decimals);
            prop_assert_eq!(parse_units(&rendered, decimals).unwrap(), U256::from(value));
        }
    }
}
