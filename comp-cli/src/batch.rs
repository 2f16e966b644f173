//! Batch calculation from a CSV of claims.
//!
//! ## CSV Format
//!
//! Headers are matched by name and column order does not matter.
//!
//! | Column                | Required | Notes                                        |
//! |-----------------------|----------|----------------------------------------------|
//! | `year_of_injury`      | yes      | e.g. `2024`                                  |
//! | `compensation_rate`   | one of   | weekly rate; commas and `$` allowed          |
//! | `average_weekly_wage` | one of   | used when `compensation_rate` is blank       |
//! | `weeks_already_paid`  | no       | blank means 0                                |
//! | `other_credit_weeks`  | no       | blank means 0                                |
//!
//! ```csv
//! year_of_injury,compensation_rate,average_weekly_wage,weeks_already_paid,other_credit_weeks
//! 2024,500.00,,0,0
//! 2023,,1200.00,52,
//! ```
//!
//! A bad row produces an error entry carrying its line number. The rows
//! around it are still calculated.

use comp_core::RateSnapshot;
use comp_core::calculations::{
    CalculationDraft, CalculationInput, CommutedValueCalculator, CommutedValueError,
    CommutedValueReport, ValidationError, compensation_rate_from_aww,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::utils::{ParseAmountError, parse_optional_amount};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BatchRow {
    year_of_injury: Option<String>,
    compensation_rate: Option<String>,
    average_weekly_wage: Option<String>,
    weeks_already_paid: Option<String>,
    other_credit_weeks: Option<String>,
}

/// Why a single row produced no report.
#[derive(Debug, Error, PartialEq)]
pub enum BatchRowError {
    #[error("unreadable row: {0}")]
    Csv(String),

    #[error("invalid year of injury '{0}'")]
    InvalidYear(String),

    #[error(transparent)]
    Amount(#[from] ParseAmountError),

    #[error(transparent)]
    Calculation(#[from] CommutedValueError),
}

impl From<ValidationError> for BatchRowError {
    fn from(err: ValidationError) -> Self {
        BatchRowError::Calculation(CommutedValueError::Validation(err))
    }
}

/// Outcome for one data row. `line` is the 1-based line in the file.
#[derive(Debug, PartialEq)]
pub struct BatchEntry {
    pub line: u64,
    pub outcome: Result<CommutedValueReport, BatchRowError>,
}

fn optional(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn draft_from_row(
    row: &BatchRow,
    snapshot: &RateSnapshot,
    calculator: &CommutedValueCalculator,
) -> Result<CalculationDraft, BatchRowError> {
    let year_of_injury = optional(&row.year_of_injury)
        .map(|y| {
            y.parse::<i32>()
                .map_err(|_| BatchRowError::InvalidYear(y.to_string()))
        })
        .transpose()?;

    let mut compensation_rate =
        parse_optional_amount(row.compensation_rate.as_deref().unwrap_or(""))?;
    if compensation_rate.is_none() {
        let aww = parse_optional_amount(row.average_weekly_wage.as_deref().unwrap_or(""))?;
        if let (Some(aww), Some(year)) = (aww, year_of_injury) {
            let max = snapshot
                .rate_table
                .max_rate(year)
                .unwrap_or(calculator.config().fallback_max_compensation_rate);
            compensation_rate = Some(compensation_rate_from_aww(aww, max)?.weekly_rate);
        }
    }

    Ok(CalculationDraft {
        year_of_injury,
        compensation_rate,
        weeks_already_paid: parse_optional_amount(row.weeks_already_paid.as_deref().unwrap_or(""))?,
        other_credit_weeks: parse_optional_amount(row.other_credit_weeks.as_deref().unwrap_or(""))?,
    })
}

fn calculate_row(
    row: &BatchRow,
    snapshot: &RateSnapshot,
    calculator: &CommutedValueCalculator,
) -> Result<CommutedValueReport, BatchRowError> {
    let draft = draft_from_row(row, snapshot, calculator)?;
    let input = CalculationInput::try_from(draft)?;
    let result = snapshot.calculate(calculator, &input)?;
    Ok(CommutedValueReport::new(&input, &result))
}

/// Calculates every row of `input`.
///
/// # Errors
///
/// Only a missing or unreadable header row fails the whole batch.
pub fn run_batch(
    input: &str,
    snapshot: &RateSnapshot,
    calculator: &CommutedValueCalculator,
) -> Result<Vec<BatchEntry>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    let mut entries = Vec::new();

    for (index, record) in reader.records().enumerate() {
        // Header occupies line 1.
        let fallback_line = index as u64 + 2;
        let entry = match record {
            Ok(record) => {
                let line = record.position().map_or(fallback_line, |p| p.line());
                let outcome = record
                    .deserialize::<BatchRow>(Some(&headers))
                    .map_err(|e| BatchRowError::Csv(e.to_string()))
                    .and_then(|row| calculate_row(&row, snapshot, calculator));
                BatchEntry { line, outcome }
            }
            Err(e) => BatchEntry {
                line: e.position().map_or(fallback_line, |p| p.line()),
                outcome: Err(BatchRowError::Csv(e.to_string())),
            },
        };

        if let Err(err) = &entry.outcome {
            warn!(line = entry.line, error = %err, "skipping batch row");
        }
        entries.push(entry);
    }

    Ok(entries)
}
