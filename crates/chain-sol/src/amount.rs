//! Human-amount to base-unit conversion.
//!
//! A user types `1.5`; the token program wants `1.5 × 10^decimals` as a
//! `u64`. The multiplication is done on the amount's shortest decimal
//! representation instead of in floating point, so `0.29` with two decimals
//! is `29` and not `28`. Digits past `decimals` are truncated.

use crate::error::SolError;

/// Largest decimal count a mint can carry and still represent `1` in a u64.
pub const MAX_DECIMALS: u8 = 19;

/// Convert a human amount to token base units, truncating extra precision.
pub fn ui_amount_to_base_units(amount: f64, decimals: u8) -> Result<u64, SolError> {
    if !amount.is_finite() {
        return Err(SolError::InvalidAmount(format!("{amount} is not finite")));
    }
    if amount < 0.0 {
        return Err(SolError::InvalidAmount(format!("{amount} is negative")));
    }
    // f64 Display never uses exponent notation.
    parse_ui_amount(&amount.to_string(), decimals)
}

/// Parse a decimal string (`"12"`, `"0.5"`, `".25"`) into base units.
pub fn parse_ui_amount(amount: &str, decimals: u8) -> Result<u64, SolError> {
    if decimals > MAX_DECIMALS {
        return Err(SolError::InvalidAmount(format!(
            "{decimals} decimals exceeds the maximum of {MAX_DECIMALS}"
        )));
    }

    let amount = amount.trim();
    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(SolError::InvalidAmount("amount is empty".into()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(SolError::InvalidAmount(format!("'{amount}' is not a number")));
    }

    let overflow = || SolError::InvalidAmount(format!("{amount} overflows a u64 at {decimals} decimals"));

    let scale = 10u64.checked_pow(decimals as u32).ok_or_else(overflow)?;
    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| overflow())?
    };

    let mut fraction_units = 0u64;
    for (i, digit) in fraction.chars().take(decimals as usize).enumerate() {
        let d = u64::from(digit.to_digit(10).unwrap_or(0));
        let place = 10u64.pow(decimals as u32 - 1 - i as u32);
        fraction_units += d * place;
    }

    whole_units
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction_units))
        .ok_or_else(overflow)
}

/// Convert base units back to a human amount (lossy for very large values).
pub fn base_units_to_ui_amount(amount: u64, decimals: u8) -> f64 {
    amount as f64 / 10f64.powi(decimals as i32)
}
