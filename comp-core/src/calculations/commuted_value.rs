//! Commuted value of the remaining weeks of a South Carolina compensation
//! claim.
//!
//! The commuted value is the lump sum that equals the present value of the
//! weekly payments still owed out of the 500 statutory weeks.
//!
//! # Algorithm
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Weeks remaining: `500 - (weeks paid + other credit weeks)` |
//! | 2    | Annual rate: Commission rate if more than 100 weeks remain, else 2% |
//! | 3    | Weekly rate: annual rate / 52 |
//! | 4    | Factor over 100 weeks: `(1 - (1 + i)^-(n + 1)) / i` |
//! |      | Factor at 100 weeks or fewer: `(1 - (1 + i)^-n) / i` |
//! | 5    | Commuted value: factor x compensation rate |
//! | 6    | Reduced values: commuted value x 95% and x 90% |
//! | 7    | TTD paid to date: weeks paid x compensation rate |
//!
//! The `n + 1` exponent in the over-100-week tier reproduces the
//! Commission's published factors for 101 to 500 weeks.
//!
//! # Precision
//!
//! All arithmetic is `f64` with no intermediate rounding. The Commission
//! rounds its published factors to four decimal places, so results can
//! differ from the printed tables in the last cent or two. Rounding for
//! display lives in [`crate::calculations::report`].
//!
//! # Example
//!
//! ```
//! use comp_core::RateTable;
//! use comp_core::calculations::{CalculationInput, CalculatorConfig, CommutedValueCalculator};
//!
//! let rates = RateTable::from_entries([(2025, 1134.43)]).unwrap();
//! let calculator = CommutedValueCalculator::new(CalculatorConfig::for_year(2025));
//!
//! let input = CalculationInput {
//!     year_of_injury: 2025,
//!     compensation_rate: 500.00,
//!     weeks_already_paid: 450.0,
//!     other_credit_weeks: 0.0,
//! };
//!
//! let result = calculator.calculate(&input, &rates, Some(0.0438)).unwrap();
//!
//! assert_eq!(result.weeks_remaining, 50.0);
//! assert_eq!(result.applicable_annual_discount_rate, 0.02);
//! assert!((result.commuted_value - 24756.434011924466).abs() < 1e-6);
//! ```

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::constants::{
    FALLBACK_DISCOUNT_RATE, FALLBACK_MAX_COMPENSATION_RATE, REDUCED_PERCENT_90,
    REDUCED_PERCENT_95, SHORT_TERM_ANNUAL_RATE, STATUTORY_WEEKS, TIER_THRESHOLD_WEEKS,
    WEEKS_PER_YEAR,
};
use crate::calculations::input::{CalculationInput, ValidationError};
use crate::models::RateTable;

/// Errors produced by the commuted value engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CommutedValueError {
    /// Caller input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A derived value broke an invariant that validation should have caught.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Discount tier selected by the number of weeks remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountTier {
    /// 100 or fewer weeks remaining: fixed 2%, plain annuity exponent.
    UpTo100Weeks,
    /// More than 100 weeks remaining: Commission rate, exponent `n + 1`.
    Over100Weeks,
}

impl DiscountTier {
    pub fn for_weeks_remaining(weeks_remaining: f64) -> Self {
        if weeks_remaining > TIER_THRESHOLD_WEEKS {
            Self::Over100Weeks
        } else {
            Self::UpTo100Weeks
        }
    }

    /// Exponent applied to `1 + weekly rate` for this tier.
    pub fn discount_periods(
        self,
        weeks_remaining: f64,
    ) -> f64 {
        match self {
            Self::UpTo100Weeks => weeks_remaining,
            Self::Over100Weeks => weeks_remaining + 1.0,
        }
    }
}

/// Policy values the engine needs besides the per-request data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Latest injury year accepted, normally the year of the calculation.
    pub current_year: i32,

    /// Annual rate for the over-100-week tier when none is on file.
    pub fallback_discount_rate: f64,

    /// Ceiling for the compensation rate when the injury year is not in the
    /// rate table.
    pub fallback_max_compensation_rate: f64,
}

impl CalculatorConfig {
    /// Configuration for calculations made in `current_year` with the
    /// documented fallbacks.
    pub fn for_year(current_year: i32) -> Self {
        Self {
            current_year,
            fallback_discount_rate: FALLBACK_DISCOUNT_RATE,
            fallback_max_compensation_rate: FALLBACK_MAX_COMPENSATION_RATE,
        }
    }
}

impl Default for CalculatorConfig {
    /// Uses the local calendar year as the current year.
    fn default() -> Self {
        Self::for_year(current_calendar_year())
    }
}

/// The local calendar year.
pub fn current_calendar_year() -> i32 {
    Local::now().year()
}

/// Full present value breakdown for one claim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// `500 - (weeks paid + other credit weeks)`.
    pub weeks_remaining: f64,

    /// Tier the weeks remaining fall into.
    pub discount_tier: DiscountTier,

    /// Annual discount rate applied for the selected tier.
    pub applicable_annual_discount_rate: f64,

    /// Present value annuity factor applied to the weekly rate.
    pub discounted_weeks_factor: f64,

    /// `discounted_weeks_factor x compensation_rate`.
    pub commuted_value: f64,

    /// 95% of the commuted value.
    pub commuted_value_95: f64,

    /// 90% of the commuted value.
    pub commuted_value_90: f64,

    /// `weeks_already_paid x compensation_rate`, undiscounted.
    pub ttd_paid_to_date_value: f64,

    /// `true` when the Commission rate was unavailable and the fallback rate
    /// was applied to the over-100-week tier.
    pub used_fallback_discount_rate: bool,
}

/// Weeks left out of the 500 statutory weeks.
///
/// # Errors
///
/// [`CommutedValueError::InvalidState`] when the credited weeks exceed 500
/// or either count is not a number.
pub fn weeks_remaining(
    weeks_already_paid: f64,
    other_credit_weeks: f64,
) -> Result<f64, CommutedValueError> {
    let remaining = STATUTORY_WEEKS - (weeks_already_paid + other_credit_weeks);
    if remaining.is_nan() || remaining < 0.0 {
        return Err(CommutedValueError::InvalidState(format!(
            "weeks remaining is {remaining} after crediting {weeks_already_paid} paid and \
             {other_credit_weeks} other weeks"
        )));
    }
    Ok(remaining)
}

/// Present value annuity factor for `weeks_remaining` at `annual_discount_rate`.
///
/// The tier, and so the exponent, follows from `weeks_remaining`. Zero weeks
/// give a factor of zero; a zero rate leaves the weeks undiscounted.
pub fn discounted_weeks_factor(
    weeks_remaining: f64,
    annual_discount_rate: f64,
) -> f64 {
    if weeks_remaining <= 0.0 {
        return 0.0;
    }

    let weekly_rate = annual_discount_rate / WEEKS_PER_YEAR;
    if weekly_rate == 0.0 {
        return weeks_remaining;
    }

    let periods =
        DiscountTier::for_weeks_remaining(weeks_remaining).discount_periods(weeks_remaining);
    (1.0 - (1.0 + weekly_rate).powf(-periods)) / weekly_rate
}

/// Calculator for the commuted value of a claim.
///
/// Holds only policy configuration. Rate data arrives with each call, so
/// one calculator can serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct CommutedValueCalculator {
    config: CalculatorConfig,
}

impl CommutedValueCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Calculates the full commuted value breakdown.
    ///
    /// # Arguments
    ///
    /// * `input` - The claim being valued
    /// * `rate_table` - Maximum weekly rate by injury year, used only to
    ///   validate `input.compensation_rate`
    /// * `current_discount_rate` - Commission rate for the over-100-week
    ///   tier, or `None` when no rate is on file for the calculation year
    ///
    /// # Errors
    ///
    /// * [`CommutedValueError::Validation`] when `input` or a supplied
    ///   discount rate is out of range.
    /// * [`CommutedValueError::InvalidState`] when a derived value breaks an
    ///   invariant.
    pub fn calculate(
        &self,
        input: &CalculationInput,
        rate_table: &RateTable,
        current_discount_rate: Option<f64>,
    ) -> Result<CalculationResult, CommutedValueError> {
        input.validate(rate_table, &self.config)?;

        if let Some(rate) = current_discount_rate {
            if !rate.is_finite() || rate <= 0.0 || rate >= 1.0 {
                return Err(ValidationError::OutOfRange {
                    field: "current_discount_rate",
                    value: rate,
                    expected: "0 < rate < 1".to_string(),
                }
                .into());
            }
        }

        let weeks_remaining = weeks_remaining(input.weeks_already_paid, input.other_credit_weeks)?;
        let discount_tier = DiscountTier::for_weeks_remaining(weeks_remaining);

        let (applicable_annual_discount_rate, used_fallback_discount_rate) = match discount_tier {
            DiscountTier::UpTo100Weeks => (SHORT_TERM_ANNUAL_RATE, false),
            DiscountTier::Over100Weeks => match current_discount_rate {
                Some(rate) => (rate, false),
                None => (self.config.fallback_discount_rate, true),
            },
        };

        let factor = discounted_weeks_factor(weeks_remaining, applicable_annual_discount_rate);
        if !factor.is_finite() || factor < 0.0 {
            return Err(CommutedValueError::InvalidState(format!(
                "discounted weeks factor is {factor} for {weeks_remaining} weeks at \
                 {applicable_annual_discount_rate}"
            )));
        }

        let commuted_value = factor * input.compensation_rate;

        Ok(CalculationResult {
            weeks_remaining,
            discount_tier,
            applicable_annual_discount_rate,
            discounted_weeks_factor: factor,
            commuted_value,
            commuted_value_95: commuted_value * REDUCED_PERCENT_95,
            commuted_value_90: commuted_value * REDUCED_PERCENT_90,
            ttd_paid_to_date_value: input.weeks_already_paid * input.compensation_rate,
            used_fallback_discount_rate,
        })
    }
}

/// Calculates the commuted value as of `calculation_year` with the
/// documented fallbacks.
///
/// `calculation_year` bounds the accepted injury years.
pub fn compute_commuted_value(
    input: &CalculationInput,
    rate_table: &RateTable,
    current_discount_rate: Option<f64>,
    calculation_year: i32,
) -> Result<CalculationResult, CommutedValueError> {
    CommutedValueCalculator::new(CalculatorConfig::for_year(calculation_year)).calculate(
        input,
        rate_table,
        current_discount_rate,
    )
}
