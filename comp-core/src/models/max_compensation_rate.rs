use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum weekly compensation rate published for an injury year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxCompensationRate {
    pub year: i32,
    pub max_weekly_rate: Decimal,
}
