//! Calculator inputs and their validation.
//!
//! [`CalculationDraft`] is what an input form collects over several steps:
//! every field is optional until the user fills it in. [`CalculationInput`]
//! is the complete request the engine accepts. Turning one into the other is
//! the only place [`ValidationError::MissingField`] can arise.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::commuted_value::CalculatorConfig;
use crate::calculations::constants::{FIRST_SUPPORTED_YEAR, STATUTORY_WEEKS};
use crate::models::RateTable;

/// Caller-supplied input violates a documented constraint.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// A value lies outside its permitted range.
    #[error("{field} is out of range: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: String,
    },

    /// A required field was never supplied.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// A value exceeds a ceiling that depends on other data.
    #[error("{field} of {value} exceeds the maximum of {max}")]
    ExceedsMax {
        field: &'static str,
        value: f64,
        max: f64,
    },
}

/// A complete commuted value request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Calendar year the injury occurred.
    pub year_of_injury: i32,

    /// Weekly compensation rate in dollars.
    pub compensation_rate: f64,

    /// Temporary total disability weeks paid to date.
    pub weeks_already_paid: f64,

    /// Other weeks credited against the 500-week total.
    pub other_credit_weeks: f64,
}

impl CalculationInput {
    /// Checks every field against the documented ranges.
    ///
    /// The compensation rate ceiling comes from `rate_table` for the injury
    /// year, or from [`CalculatorConfig::fallback_max_compensation_rate`]
    /// when the year is not on file.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::OutOfRange`] for a year outside
    ///   `1979..=current_year`, a non-positive rate, or a week count
    ///   outside `0..=500`.
    /// * [`ValidationError::ExceedsMax`] when the rate is above the ceiling
    ///   or the two week counts together exceed 500.
    pub fn validate(
        &self,
        rate_table: &RateTable,
        config: &CalculatorConfig,
    ) -> Result<(), ValidationError> {
        if self.year_of_injury < FIRST_SUPPORTED_YEAR
            || self.year_of_injury > config.current_year
        {
            return Err(ValidationError::OutOfRange {
                field: "year_of_injury",
                value: f64::from(self.year_of_injury),
                expected: format!("{FIRST_SUPPORTED_YEAR}..={}", config.current_year),
            });
        }

        if !self.compensation_rate.is_finite() || self.compensation_rate <= 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "compensation_rate",
                value: self.compensation_rate,
                expected: "> 0".to_string(),
            });
        }

        let max_rate = rate_table
            .max_rate(self.year_of_injury)
            .unwrap_or(config.fallback_max_compensation_rate);
        if self.compensation_rate > max_rate {
            return Err(ValidationError::ExceedsMax {
                field: "compensation_rate",
                value: self.compensation_rate,
                max: max_rate,
            });
        }

        check_weeks("weeks_already_paid", self.weeks_already_paid)?;
        check_weeks("other_credit_weeks", self.other_credit_weeks)?;

        let total = self.weeks_already_paid + self.other_credit_weeks;
        if total > STATUTORY_WEEKS {
            return Err(ValidationError::ExceedsMax {
                field: "total_credited_weeks",
                value: total,
                max: STATUTORY_WEEKS,
            });
        }

        Ok(())
    }
}

fn check_weeks(
    field: &'static str,
    weeks: f64,
) -> Result<(), ValidationError> {
    if !weeks.is_finite() || !(0.0..=STATUTORY_WEEKS).contains(&weeks) {
        return Err(ValidationError::OutOfRange {
            field,
            value: weeks,
            expected: format!("0..={STATUTORY_WEEKS}"),
        });
    }
    Ok(())
}

/// Partially collected input, e.g. from a multi-step form or a CSV row.
///
/// Week counts default to zero when left blank. Injury year and rate do not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationDraft {
    pub year_of_injury: Option<i32>,
    pub compensation_rate: Option<f64>,
    pub weeks_already_paid: Option<f64>,
    pub other_credit_weeks: Option<f64>,
}

impl TryFrom<CalculationDraft> for CalculationInput {
    type Error = ValidationError;

    fn try_from(draft: CalculationDraft) -> Result<Self, Self::Error> {
        Ok(CalculationInput {
            year_of_injury: draft.year_of_injury.ok_or(ValidationError::MissingField {
                field: "year_of_injury",
            })?,
            compensation_rate: draft.compensation_rate.ok_or(ValidationError::MissingField {
                field: "compensation_rate",
            })?,
            weeks_already_paid: draft.weeks_already_paid.unwrap_or(0.0),
            other_credit_weeks: draft.other_credit_weeks.unwrap_or(0.0),
        })
    }
}
