//! Immutable injury-year to maximum-rate lookup handed to the engine.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::calculations::{FIRST_SUPPORTED_YEAR, ValidationError, current_calendar_year};
use crate::models::MaxCompensationRate;

/// Snapshot of maximum weekly compensation rates keyed by injury year.
///
/// Every key is a year from 1979 through the current year and every value
/// is a finite amount `> 0`. Construction enforces both, so the engine can
/// rely on them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    rates: BTreeMap<i32, f64>,
}

impl RateTable {
    /// An empty table. Every lookup misses and validation falls back to the
    /// configured ceiling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(year, max_weekly_rate)` pairs, accepting
    /// years up to the local calendar year.
    ///
    /// Later duplicates replace earlier ones.
    ///
    /// # Errors
    ///
    /// See [`RateTable::from_entries_through`].
    pub fn from_entries<I>(entries: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        Self::from_entries_through(entries, current_calendar_year())
    }

    /// Builds a table whose years run from 1979 through `last_year`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::OutOfRange`] for a year outside that range or a
    /// rate that is not a positive finite number.
    pub fn from_entries_through<I>(
        entries: I,
        last_year: i32,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        let mut rates = BTreeMap::new();
        for (year, rate) in entries {
            if !(FIRST_SUPPORTED_YEAR..=last_year).contains(&year) {
                return Err(ValidationError::OutOfRange {
                    field: "rate_table.year",
                    value: f64::from(year),
                    expected: format!("{FIRST_SUPPORTED_YEAR}..={last_year}"),
                });
            }
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ValidationError::OutOfRange {
                    field: "rate_table.max_weekly_rate",
                    value: rate,
                    expected: "> 0".to_string(),
                });
            }
            rates.insert(year, rate);
        }
        Ok(Self { rates })
    }

    /// Builds a table from stored [`MaxCompensationRate`] records.
    pub fn from_records(records: &[MaxCompensationRate]) -> Result<Self, ValidationError> {
        Self::from_entries(records.iter().map(|record| {
            (
                record.year,
                record.max_weekly_rate.to_f64().unwrap_or(f64::NAN),
            )
        }))
    }

    pub fn max_rate(&self, year: i32) -> Option<f64> {
        self.rates.get(&year).copied()
    }

    /// Most recent year on file, with its rate.
    pub fn latest(&self) -> Option<(i32, f64)> {
        self.rates.iter().next_back().map(|(year, rate)| (*year, *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.rates.keys().copied()
    }
}
