//! Calculation modules for South Carolina workers' compensation claims.
//!
//! The centre of this module is the commuted value engine. It is a pure
//! function of its inputs. Rate data is passed in by the caller and nothing
//! here performs I/O or logging.

pub mod common;
pub mod commuted_value;
pub mod compensation;
pub mod constants;
pub mod input;
pub mod npv_table;
pub mod report;

pub use commuted_value::{
    CalculationResult, CalculatorConfig, CommutedValueCalculator, CommutedValueError,
    DiscountTier, compute_commuted_value, current_calendar_year, discounted_weeks_factor,
    weeks_remaining,
};
pub use compensation::{CompensationRate, compensation_rate_from_aww};
pub use constants::*;
pub use input::{CalculationDraft, CalculationInput, ValidationError};
pub use npv_table::{NpvTableRow, npv_table};
pub use report::CommutedValueReport;
