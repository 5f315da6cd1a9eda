//! Wei to ether conversion for display.

use alloy::primitives::U256;

/// Decimals of the chain's native unit.
pub const ETHER_DECIMALS: u8 = 18;

/// Renders a wei amount as a human-readable ether string.
///
/// Uses the natural decimal form: trailing fractional zeros and a
/// dangling decimal point are dropped (`1.230000…` → `"1.23"`,
/// `1.000…` → `"1"`).
#[must_use]
pub fn format_ether(wei: U256) -> String {
    format_units(wei, ETHER_DECIMALS)
}

/// Renders `value / 10^decimals` in natural decimal form.
#[must_use]
pub fn format_units(value: U256, decimals: u8) -> String {
    let scale = U256::from(10u8).pow(U256::from(decimals));
    let (whole, frac) = value.div_rem(scale);
    if frac.is_zero() {
        return whole.to_string();
    }
    let width = usize::from(decimals);
    let digits = frac.to_string();
    let padded = format!("{digits:0>width$}");
    let trimmed = padded.trim_end_matches('0');
    format!("{whole}.{trimmed}")
}
