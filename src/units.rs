//! USDC amounts: 6 decimals on chain, two decimal places on screen.
use alloy::primitives::U256;
use eyre::{eyre, Result};

pub const TOKEN_DECIMALS: u32 = 6;

/// One whole token in base units.
pub const ONE_TOKEN: u64 = 1_000_000;

/// Smallest balance increase treated as a real deposit (0.1 USDC).
pub const MIN_DEPOSIT: U256 = U256::from_limbs([100_000, 0, 0, 0]);

/// Formats base units as a decimal string with exactly two places, rounding half up.
///
/// `150000` formats as `"0.15"`, `100_000_000` as `"100.00"`.
#[must_use]
pub fn format_token_amount(amount: U256) -> String {
    // 10^(6 - 2) base units per displayed cent
    let per_cent = U256::from(10_000u64);
    let cents = amount.saturating_add(per_cent / U256::from(2u64)) / per_cent;
    let hundred = U256::from(100u64);
    let whole = cents / hundred;
    let frac = (cents % hundred).to_string();
    format!("{whole}.{frac:0>2}")
}

/// Parses a decimal string (up to 6 fractional digits) into base units.
///
/// # Errors
/// * If the string is empty or contains anything but digits and one `.`
/// * If it has more than 6 fractional digits
pub fn parse_token_amount(s: &str) -> Result<U256> {
    let s = s.trim();
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));

    if whole.is_empty() && frac.is_empty() {
        return Err(eyre!("empty amount"));
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(eyre!("invalid amount: {s}"));
    }
    if frac.len() > TOKEN_DECIMALS as usize {
        return Err(eyre!("too many decimal places: {s}"));
    }

    let whole = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10)?
    };
    let frac = format!("{frac:0<width$}", width = TOKEN_DECIMALS as usize);
    let frac = U256::from_str_radix(&frac, 10)?;

    whole
        .checked_mul(U256::from(ONE_TOKEN))
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| eyre!("amount out of range: {s}"))
}
