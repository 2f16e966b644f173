mod discount_rate;
mod max_compensation_rate;
mod rate_table;

pub use discount_rate::DiscountRateSetting;
pub use max_compensation_rate::MaxCompensationRate;
pub use rate_table::RateTable;
