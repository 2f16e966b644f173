use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use comp_core::RateSnapshot;
use comp_core::calculations::{
    CalculationInput, CommutedValueCalculator, CommutedValueReport, NpvTableRow,
    compensation_rate_from_aww, npv_table,
};
use comp_core::db::{DbConfig, RepositoryRegistry};
use comp_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info};

use crate::batch::{BatchEntry, run_batch};
use crate::config::AppConfig;

/// Registry with every backend compiled into this binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Command-line value, then config file, then the current calendar year.
pub fn resolve_calculation_year(
    cli_year: Option<i32>,
    config: &AppConfig,
) -> i32 {
    cli_year
        .or(config.calculation.calculation_year)
        .unwrap_or_else(|| Local::now().year())
}

/// Opens the configured repository and reads the rate snapshot.
pub async fn load_snapshot(
    registry: &RepositoryRegistry,
    db_config: &DbConfig,
    calculation_year: i32,
) -> Result<RateSnapshot> {
    debug!("connecting to {} backend", db_config.backend);
    let repo = registry
        .create(db_config)
        .await
        .with_context(|| {
            format!(
                "Failed to open {} database '{}'",
                db_config.backend, db_config.connection_string
            )
        })?;

    let snapshot = RateSnapshot::load(&*repo, calculation_year)
        .await
        .context("Failed to load rate data")?;
    Ok(snapshot)
}

/// How the weekly compensation rate was supplied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateSource {
    Weekly(f64),
    AverageWeeklyWage(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculateRequest {
    pub year_of_injury: i32,
    pub rate: RateSource,
    pub weeks_already_paid: f64,
    pub other_credit_weeks: f64,
}

/// Runs a single calculation, deriving the rate from the average weekly
/// wage when asked to.
pub fn calculate(
    request: &CalculateRequest,
    snapshot: &RateSnapshot,
    calculator: &CommutedValueCalculator,
) -> Result<CommutedValueReport> {
    let compensation_rate = match request.rate {
        RateSource::Weekly(rate) => rate,
        RateSource::AverageWeeklyWage(aww) => {
            let max = snapshot
                .rate_table
                .max_rate(request.year_of_injury)
                .unwrap_or(calculator.config().fallback_max_compensation_rate);
            let derived = compensation_rate_from_aww(aww, max)?;
            if derived.capped {
                info!(aww, max, "compensation rate capped at the year's maximum");
            }
            derived.weekly_rate
        }
    };

    let input = CalculationInput {
        year_of_injury: request.year_of_injury,
        compensation_rate,
        weeks_already_paid: request.weeks_already_paid,
        other_credit_weeks: request.other_credit_weeks,
    };
    let result = snapshot.calculate(calculator, &input)?;
    Ok(CommutedValueReport::new(&input, &result))
}

/// Reads a claims CSV from disk and calculates every row.
pub fn calculate_batch_file(
    path: &Path,
    snapshot: &RateSnapshot,
    calculator: &CommutedValueCalculator,
) -> Result<Vec<BatchEntry>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    let entries = run_batch(&contents, snapshot, calculator)
        .with_context(|| format!("Failed to parse CSV header: {}", path.display()))?;
    Ok(entries)
}

/// Factor table plus the long-term rate it was built with.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorTable {
    pub annual_discount_rate: f64,
    pub used_fallback_discount_rate: bool,
    pub rows: Vec<NpvTableRow>,
}

/// Builds the 1..=500 week factor table. An explicit rate wins, then the
/// snapshot's Commission rate, then the fallback.
pub fn factor_table(
    explicit_rate: Option<f64>,
    snapshot: &RateSnapshot,
    calculator: &CommutedValueCalculator,
) -> Result<FactorTable> {
    let (annual_discount_rate, used_fallback_discount_rate) =
        match explicit_rate.or(snapshot.current_discount_rate) {
            Some(rate) => (rate, false),
            None => (calculator.config().fallback_discount_rate, true),
        };
    let rows = npv_table(annual_discount_rate)?;
    Ok(FactorTable {
        annual_discount_rate,
        used_fallback_discount_rate,
        rows,
    })
}
