use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Commission-approved annual discount rate for claims with more than
/// 100 weeks remaining, keyed by the year the calculation is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRateSetting {
    pub year: i32,
    /// Annual rate as a fraction (`0.0438` for 4.38%).
    pub annual_rate: Decimal,
}
