//! Display rounding and formatting shared by reports and tables.
//!
//! The engine works in `f64` and never rounds. Everything here converts a
//! finished figure into a [`Decimal`] rounded the way it is shown to users.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places used for currency figures.
pub const CURRENCY_DP: u32 = 2;

/// Decimal places used for discount rates and annuity factors. The
/// Commission's published tables carry factors to four places.
pub const FACTOR_DP: u32 = 4;

/// Rounds a decimal value to `dp` places using half-up rounding.
///
/// Values exactly at the midpoint round away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use comp_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.455), 2), dec!(123.46));
/// assert_eq!(round_half_up(dec!(408.57625), 4), dec!(408.5763));
/// assert_eq!(round_half_up(dec!(-123.455), 2), dec!(-123.46));
/// ```
pub fn round_half_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts an engine figure into a [`Decimal`] rounded to `dp` places.
///
/// Non-finite input maps to zero. The engine rejects inputs that could
/// produce one, so this only matters for hand-built values.
pub fn to_display_decimal(
    value: f64,
    dp: u32,
) -> Decimal {
    Decimal::from_f64(value)
        .map(|d| round_half_up(d, dp))
        .unwrap_or(Decimal::ZERO)
}

/// Rounds a currency figure to cents.
pub fn round_currency(value: f64) -> Decimal {
    to_display_decimal(value, CURRENCY_DP)
}

/// Rounds a rate or annuity factor to four places.
pub fn round_factor(value: f64) -> Decimal {
    to_display_decimal(value, FACTOR_DP)
}

/// Formats an amount as dollars with thousands separators, e.g. `$204,288.15`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use comp_core::calculations::common::format_currency;
///
/// assert_eq!(format_currency(dec!(204288.145)), "$204,288.15");
/// assert_eq!(format_currency(dec!(-5)), "-$5.00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    let rounded = round_half_up(value, CURRENCY_DP);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{cents}")
}

/// Formats a fractional rate as a percentage, e.g. `0.0438` -> `4.38%`.
pub fn format_percent(rate: Decimal) -> String {
    let percent = round_half_up(rate * Decimal::ONE_HUNDRED, CURRENCY_DP);
    format!("{:.2}%", percent)
}
