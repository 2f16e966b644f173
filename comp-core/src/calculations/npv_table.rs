//! Net present value factor table in the layout the Commission publishes.
//!
//! One row per whole week remaining from 1 to 500. Rows above 100 weeks use
//! the Commission rate with the `n + 1` exponent. Rows at 100 weeks or
//! fewer use the fixed 2% rate. Factors come straight from
//! [`discounted_weeks_factor`], so the table always agrees with the engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::commuted_value::{DiscountTier, discounted_weeks_factor};
use crate::calculations::common::round_factor;
use crate::calculations::constants::{SHORT_TERM_ANNUAL_RATE, STATUTORY_WEEKS};
use crate::calculations::input::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NpvTableRow {
    pub weeks_remaining: u32,
    pub discount_tier: DiscountTier,
    pub annual_discount_rate: f64,
    pub factor: f64,
}

impl NpvTableRow {
    /// Factor rounded to four places, as printed by the Commission.
    pub fn display_factor(&self) -> Decimal {
        round_factor(self.factor)
    }
}

/// Builds the factor table for every whole week from 1 to 500.
///
/// # Errors
///
/// [`ValidationError::OutOfRange`] unless `0 < long_term_annual_rate < 1`.
pub fn npv_table(long_term_annual_rate: f64) -> Result<Vec<NpvTableRow>, ValidationError> {
    if !long_term_annual_rate.is_finite()
        || long_term_annual_rate <= 0.0
        || long_term_annual_rate >= 1.0
    {
        return Err(ValidationError::OutOfRange {
            field: "long_term_annual_rate",
            value: long_term_annual_rate,
            expected: "0 < rate < 1".to_string(),
        });
    }

    // STATUTORY_WEEKS is a whole number of weeks.
    let max_weeks = STATUTORY_WEEKS as u32;

    Ok((1..=max_weeks)
        .map(|weeks| {
            let weeks_remaining = f64::from(weeks);
            let discount_tier = DiscountTier::for_weeks_remaining(weeks_remaining);
            let annual_discount_rate = match discount_tier {
                DiscountTier::UpTo100Weeks => SHORT_TERM_ANNUAL_RATE,
                DiscountTier::Over100Weeks => long_term_annual_rate,
            };
            NpvTableRow {
                weeks_remaining: weeks,
                discount_tier,
                annual_discount_rate,
                factor: discounted_weeks_factor(weeks_remaining, annual_discount_rate),
            }
        })
        .collect())
}
