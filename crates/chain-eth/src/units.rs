//! Decimal string ⇄ integer base-unit conversion for ERC-20 amounts.

use alloy_primitives::U256;

use crate::error::EthError;

/// `10^77` is the largest power of ten that fits in a U256.
pub const MAX_DECIMALS: u8 = 77;

fn scale(decimals: u8) -> Result<U256, EthError> {
    if decimals > MAX_DECIMALS {
        return Err(EthError::InvalidAmount(format!(
            "{decimals} decimals exceeds the maximum of {MAX_DECIMALS}"
        )));
    }
    let ten = U256::from(10u8);
    let mut value = U256::from(1u8);
    for _ in 0..decimals {
        value *= ten;
    }
    Ok(value)
}

/// Parses `"1.5"` with 18 decimals into `1500000000000000000`. Digits past
/// `decimals` are truncated.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, EthError> {
    let scale = scale(decimals)?;
    let amount = amount.trim();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(EthError::InvalidAmount("amount is empty".into()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(EthError::InvalidAmount(format!("'{amount}' is not a number")));
    }

    let overflow = || EthError::InvalidAmount(format!("{amount} overflows uint256"));

    let whole_units = if whole.is_empty() {
        U256::ZERO
    } else {
        whole.parse::<U256>().map_err(|_| overflow())?
    };

    let kept: String = fraction.chars().take(decimals as usize).collect();
    let fraction_units = if kept.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{kept:0<width$}", width = decimals as usize);
        padded.parse::<U256>().map_err(|_| overflow())?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction_units))
        .ok_or_else(overflow)
}

/// Formats base units as a decimal string without trailing zeros.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_eighteen_decimals() {
        assert_eq!(
            parse_units("1.5", 18).unwrap(),
            U256::from(1_500_000_000_000_000_000u128)
        );
    }

    #[test]
    fn parses_large_supply() {
        let supply = parse_units("1000000000", 18).unwrap();
        assert_eq!(supply.to_string(), "1000000000000000000000000000");
    }

    #[test]
    fn truncates_extra_digits() {
        assert_eq!(parse_units("0.123", 2).unwrap(), U256::from(12u8));
        assert_eq!(parse_units("7.9", 0).unwrap(), U256::from(7u8));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_units("", 18).is_err());
        assert!(parse_units("abc", 18).is_err());
        assert!(parse_units("-1", 18).is_err());
        assert!(parse_units("1e18", 18).is_err());
        assert!(parse_units("1", 78).is_err());
    }

    #[test]
    fn rejects_overflow() {
        let huge = "1".repeat(80);
        assert!(parse_units(&huge, 0).is_err());
    }

    #[test]
    fn formats_back() {
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(5u8), 6), "0.000005");
        assert_eq!(format_units(U256::from(2_000_000u64), 6), "2");
        assert_eq!(format_units(U256::from(42u8), 0), "42");
    }
}
