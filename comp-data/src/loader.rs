use std::io::Read;

use comp_core::calculations::{FIRST_SUPPORTED_YEAR, current_calendar_year};
use comp_core::{DiscountRateSetting, MaxCompensationRate, RateRepository, RepositoryError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading rate data.
#[derive(Debug, Error)]
pub enum RateLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid value on line {line}: {message}")]
    InvalidValue { line: usize, message: String },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for RateLoaderError {
    fn from(err: csv::Error) -> Self {
        RateLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the maximum weekly compensation rate CSV.
///
/// Columns: `year,max_weekly_rate`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MaxRateRecord {
    pub year: i32,
    pub max_weekly_rate: Decimal,
}

/// A single record from the discount rate CSV.
///
/// Columns: `year,annual_rate`. The rate is a fraction (`0.0438`) or a
/// percentage with a trailing sign (`4.38%`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DiscountRateRecord {
    pub year: i32,
    #[serde(deserialize_with = "deserialize_rate")]
    pub annual_rate: Decimal,
}

fn deserialize_rate<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.trim();
    match s.strip_suffix('%') {
        Some(percent) => percent
            .trim()
            .parse::<Decimal>()
            .map(|p| p / Decimal::ONE_HUNDRED)
            .map_err(serde::de::Error::custom),
        None => s.parse::<Decimal>().map_err(serde::de::Error::custom),
    }
}

// Header is line 1, so the first record is line 2.
fn line_number(index: usize) -> usize {
    index + 2
}

fn check_year(
    line: usize,
    year: i32,
) -> Result<(), RateLoaderError> {
    if year < FIRST_SUPPORTED_YEAR {
        return Err(RateLoaderError::InvalidValue {
            line,
            message: format!("year {} is before {}", year, FIRST_SUPPORTED_YEAR),
        });
    }
    let last_year = current_calendar_year();
    if year > last_year {
        return Err(RateLoaderError::InvalidValue {
            line,
            message: format!("year {} is after the current year {}", year, last_year),
        });
    }
    Ok(())
}

fn parse_records<R, T>(reader: R) -> Result<Vec<(usize, T)>, RateLoaderError>
where
    R: Read,
    T: serde::de::DeserializeOwned,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, result) in csv_reader.deserialize().enumerate() {
        let record: T = result?;
        records.push((line_number(index), record));
    }

    Ok(records)
}

/// Loader for the maximum weekly compensation rate table.
pub struct MaxRateLoader;

impl MaxRateLoader {
    /// Parse and validate records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<MaxRateRecord>, RateLoaderError> {
        parse_records::<R, MaxRateRecord>(reader)?
            .into_iter()
            .map(|(line, record)| {
                check_year(line, record.year)?;
                if record.max_weekly_rate <= Decimal::ZERO {
                    return Err(RateLoaderError::InvalidValue {
                        line,
                        message: format!(
                            "max weekly rate {} must be positive",
                            record.max_weekly_rate
                        ),
                    });
                }
                Ok(record)
            })
            .collect()
    }

    /// Upsert every record. Loading the same file twice leaves the table
    /// unchanged. Returns the number of records written.
    pub async fn load<R>(
        repo: &R,
        records: &[MaxRateRecord],
    ) -> Result<usize, RateLoaderError>
    where
        R: RateRepository + ?Sized,
    {
        for record in records {
            repo.upsert_max_compensation_rate(&MaxCompensationRate {
                year: record.year,
                max_weekly_rate: record.max_weekly_rate,
            })
            .await?;
        }

        info!(count = records.len(), "loaded maximum compensation rates");
        Ok(records.len())
    }
}

/// Loader for the Commission discount rate table.
pub struct DiscountRateLoader;

impl DiscountRateLoader {
    /// Parse and validate records from a CSV reader. Rates must satisfy
    /// `0 < rate < 1` after percent conversion.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<DiscountRateRecord>, RateLoaderError> {
        parse_records::<R, DiscountRateRecord>(reader)?
            .into_iter()
            .map(|(line, record)| {
                check_year(line, record.year)?;
                if record.annual_rate <= Decimal::ZERO || record.annual_rate >= Decimal::ONE {
                    return Err(RateLoaderError::InvalidValue {
                        line,
                        message: format!(
                            "discount rate {} must be between 0 and 1 (use 4.38% or 0.0438)",
                            record.annual_rate
                        ),
                    });
                }
                Ok(record)
            })
            .collect()
    }

    /// Upsert every record and return the number written.
    pub async fn load<R>(
        repo: &R,
        records: &[DiscountRateRecord],
    ) -> Result<usize, RateLoaderError>
    where
        R: RateRepository + ?Sized,
    {
        for record in records {
            repo.upsert_discount_rate(&DiscountRateSetting {
                year: record.year,
                annual_rate: record.annual_rate,
            })
            .await?;
        }

        info!(count = records.len(), "loaded discount rates");
        Ok(records.len())
    }
}
