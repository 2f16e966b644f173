//! Display-ready view of a commuted value calculation.
//!
//! Converts the engine's unrounded `f64` figures into [`Decimal`] amounts
//! rounded half-up: currency to cents, rates and factors to four places.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::commuted_value::CalculationResult;
use crate::calculations::common::{format_currency, format_percent, round_currency, round_factor};
use crate::calculations::input::CalculationInput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommutedValueReport {
    pub year_of_injury: i32,
    pub compensation_rate: Decimal,
    pub weeks_already_paid: Decimal,
    pub other_credit_weeks: Decimal,
    pub weeks_remaining: Decimal,
    pub annual_discount_rate: Decimal,
    pub discounted_weeks_factor: Decimal,
    pub commuted_value: Decimal,
    pub commuted_value_95: Decimal,
    pub commuted_value_90: Decimal,
    pub ttd_paid_to_date_value: Decimal,
    pub used_fallback_discount_rate: bool,
}

impl CommutedValueReport {
    pub fn new(
        input: &CalculationInput,
        result: &CalculationResult,
    ) -> Self {
        Self {
            year_of_injury: input.year_of_injury,
            compensation_rate: round_currency(input.compensation_rate),
            weeks_already_paid: round_currency(input.weeks_already_paid),
            other_credit_weeks: round_currency(input.other_credit_weeks),
            weeks_remaining: round_currency(result.weeks_remaining),
            annual_discount_rate: round_factor(result.applicable_annual_discount_rate),
            discounted_weeks_factor: round_factor(result.discounted_weeks_factor),
            commuted_value: round_currency(result.commuted_value),
            commuted_value_95: round_currency(result.commuted_value_95),
            commuted_value_90: round_currency(result.commuted_value_90),
            ttd_paid_to_date_value: round_currency(result.ttd_paid_to_date_value),
            used_fallback_discount_rate: result.used_fallback_discount_rate,
        }
    }
}

impl fmt::Display for CommutedValueReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let rate_source = if self.used_fallback_discount_rate {
            " (fallback: no Commission rate on file)"
        } else {
            ""
        };

        writeln!(f, "Commuted value, injury year {}", self.year_of_injury)?;
        writeln!(f, "  Compensation rate:        {}", format_currency(self.compensation_rate))?;
        writeln!(f, "  TTD weeks paid:           {}", self.weeks_already_paid)?;
        writeln!(f, "  Other credit weeks:       {}", self.other_credit_weeks)?;
        writeln!(f, "  Weeks remaining:          {}", self.weeks_remaining)?;
        writeln!(
            f,
            "  Annual discount rate:     {}{}",
            format_percent(self.annual_discount_rate),
            rate_source
        )?;
        writeln!(f, "  Discounted weeks factor:  {}", self.discounted_weeks_factor)?;
        writeln!(f, "  Commuted value:           {}", format_currency(self.commuted_value))?;
        writeln!(f, "  95% of commuted value:    {}", format_currency(self.commuted_value_95))?;
        writeln!(f, "  90% of commuted value:    {}", format_currency(self.commuted_value_90))?;
        write!(
            f,
            "  TTD paid to date:         {}",
            format_currency(self.ttd_paid_to_date_value)
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::{CalculatorConfig, CommutedValueCalculator};
    use crate::models::RateTable;

    fn report(
        weeks_already_paid: f64,
        discount_rate: Option<f64>,
    ) -> CommutedValueReport {
        let input = CalculationInput {
            year_of_injury: 2025,
            compensation_rate: 500.0,
            weeks_already_paid,
            other_credit_weeks: 0.0,
        };
        let result = CommutedValueCalculator::new(CalculatorConfig::for_year(2025))
            .calculate(&input, &RateTable::new(), discount_rate)
            .unwrap();
        CommutedValueReport::new(&input, &result)
    }

    #[test]
    fn rounds_currency_and_factor() {
        let report = report(0.0, Some(0.0438));

        assert_eq!(report.weeks_remaining, dec!(500.00));
        assert_eq!(report.annual_discount_rate, dec!(0.0438));
        assert_eq!(report.discounted_weeks_factor, dec!(408.5763));
        assert_eq!(report.commuted_value, dec!(204288.15));
        assert_eq!(report.commuted_value_95, dec!(194073.74));
        assert_eq!(report.commuted_value_90, dec!(183859.33));
        assert_eq!(report.ttd_paid_to_date_value, dec!(0.00));
    }

    #[test]
    fn short_tier_report() {
        let report = report(450.0, Some(0.0438));

        assert_eq!(report.annual_discount_rate, dec!(0.02));
        assert_eq!(report.discounted_weeks_factor, dec!(49.5129));
        assert_eq!(report.commuted_value, dec!(24756.43));
        assert_eq!(report.ttd_paid_to_date_value, dec!(225000.00));
    }

    #[test]
    fn display_lists_every_figure() {
        let text = report(0.0, Some(0.0438)).to_string();

        assert!(text.contains("injury year 2025"));
        assert!(text.contains("$500.00"));
        assert!(text.contains("4.38%"));
        assert!(text.contains("408.5763"));
        assert!(text.contains("$204,288.15"));
        assert!(text.contains("$194,073.74"));
        assert!(text.contains("$183,859.33"));
        assert!(!text.contains("fallback"));
    }

    #[test]
    fn display_marks_fallback_rate() {
        let text = report(0.0, None).to_string();

        assert!(text.contains("fallback"));
    }
}
