//! Statutory and Commission constants used by the commuted value engine.

/// Total statutory weeks of compensation.
pub const STATUTORY_WEEKS: f64 = 500.0;

/// Earliest injury year the calculators accept.
pub const FIRST_SUPPORTED_YEAR: i32 = 1979;

/// Claims with more weeks remaining than this use the Commission rate.
pub const TIER_THRESHOLD_WEEKS: f64 = 100.0;

/// Fixed annual discount rate for claims with 100 or fewer weeks remaining.
pub const SHORT_TERM_ANNUAL_RATE: f64 = 0.02;

pub const WEEKS_PER_YEAR: f64 = 52.0;

/// Annual rate used for the over-100-week tier when no Commission rate is
/// on file for the calculation year. Matches the most recent published rate.
pub const FALLBACK_DISCOUNT_RATE: f64 = 0.0438;

/// Ceiling used to validate a compensation rate when the injury year has no
/// entry in the rate table. Matches the most recent seeded maximum.
pub const FALLBACK_MAX_COMPENSATION_RATE: f64 = 1134.43;

/// Reduced commuted value percentages shown alongside the full figure.
pub const REDUCED_PERCENT_95: f64 = 0.95;
pub const REDUCED_PERCENT_90: f64 = 0.90;
