//! Weekly compensation rate derived from the average weekly wage.
//!
//! South Carolina pays 66⅔% of the average weekly wage (AWW), capped at the
//! maximum rate for the injury year. The result feeds
//! [`CalculationInput::compensation_rate`](crate::calculations::CalculationInput).

use serde::{Deserialize, Serialize};

use crate::calculations::input::ValidationError;

/// Share of the average weekly wage paid as compensation.
pub const AWW_COMPENSATION_FRACTION: f64 = 2.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompensationRate {
    pub average_weekly_wage: f64,
    pub weekly_rate: f64,
    /// `true` when two thirds of the wage exceeded the maximum rate.
    pub capped: bool,
}

/// Computes the weekly compensation rate for `average_weekly_wage`.
///
/// # Errors
///
/// [`ValidationError::OutOfRange`] when the wage or the maximum rate is not
/// a positive finite number.
pub fn compensation_rate_from_aww(
    average_weekly_wage: f64,
    max_weekly_rate: f64,
) -> Result<CompensationRate, ValidationError> {
    if !average_weekly_wage.is_finite() || average_weekly_wage <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "average_weekly_wage",
            value: average_weekly_wage,
            expected: "> 0".to_string(),
        });
    }
    if !max_weekly_rate.is_finite() || max_weekly_rate <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "max_weekly_rate",
            value: max_weekly_rate,
            expected: "> 0".to_string(),
        });
    }

    let uncapped = average_weekly_wage * AWW_COMPENSATION_FRACTION;
    let capped = uncapped > max_weekly_rate;

    Ok(CompensationRate {
        average_weekly_wage,
        weekly_rate: if capped { max_weekly_rate } else { uncapped },
        capped,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn two_thirds_of_wage_below_cap() {
        let rate = compensation_rate_from_aww(750.0, 1134.43).unwrap();

        assert_relative_eq!(rate.weekly_rate, 500.0, epsilon = 1e-9);
        assert!(!rate.capped);
    }

    #[test]
    fn high_wage_is_capped_at_max() {
        let rate = compensation_rate_from_aww(2000.0, 1134.43).unwrap();

        assert_eq!(rate.weekly_rate, 1134.43);
        assert!(rate.capped);
        assert_eq!(rate.average_weekly_wage, 2000.0);
    }

    #[test]
    fn rejects_zero_wage() {
        assert!(matches!(
            compensation_rate_from_aww(0.0, 1134.43),
            Err(ValidationError::OutOfRange { field: "average_weekly_wage", .. })
        ));
    }

    #[test]
    fn rejects_non_positive_max() {
        assert!(matches!(
            compensation_rate_from_aww(900.0, -1.0),
            Err(ValidationError::OutOfRange { field: "max_weekly_rate", .. })
        ));
    }
}
