//! Rate data read once from a [`RateRepository`] and handed to the engine
//! as plain values.

use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, warn};

use crate::calculations::{
    CalculationInput, CalculationResult, CommutedValueCalculator, CommutedValueError,
};
use crate::db::repository::{RateRepository, RepositoryError};
use crate::models::RateTable;

/// Immutable copy of the rate feeds for one calculation year.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub calculation_year: i32,
    pub rate_table: RateTable,
    /// `None` when no Commission rate is on file for `calculation_year`.
    pub current_discount_rate: Option<f64>,
}

impl RateSnapshot {
    /// Reads the maximum rate table and the discount rate for
    /// `calculation_year`.
    ///
    /// A missing discount rate is not an error. The engine applies its
    /// fallback and flags the result.
    ///
    /// # Errors
    ///
    /// Any repository error other than a missing discount rate, or
    /// [`RepositoryError::Database`] if stored values are out of range.
    pub async fn load<R>(
        repo: &R,
        calculation_year: i32,
    ) -> Result<Self, RepositoryError>
    where
        R: RateRepository + ?Sized,
    {
        let records = repo.list_max_compensation_rates().await?;
        let rate_table = RateTable::from_records(&records)
            .map_err(|e| RepositoryError::Database(format!("invalid max rate data: {e}")))?;

        let current_discount_rate = match repo.get_discount_rate(calculation_year).await {
            Ok(setting) => {
                let rate = setting.annual_rate.to_f64().ok_or_else(|| {
                    RepositoryError::Database(format!(
                        "discount rate {} for {} is not representable",
                        setting.annual_rate, calculation_year
                    ))
                })?;
                Some(rate)
            }
            Err(RepositoryError::NotFound) => {
                warn!(calculation_year, "no Commission discount rate on file");
                None
            }
            Err(other) => return Err(other),
        };

        debug!(
            calculation_year,
            years = rate_table.len(),
            ?current_discount_rate,
            "loaded rate snapshot"
        );

        Ok(Self {
            calculation_year,
            rate_table,
            current_discount_rate,
        })
    }

    /// Runs `calculator` against this snapshot's rate data.
    pub fn calculate(
        &self,
        calculator: &CommutedValueCalculator,
        input: &CalculationInput,
    ) -> Result<CalculationResult, CommutedValueError> {
        calculator.calculate(input, &self.rate_table, self.current_discount_rate)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::CalculatorConfig;
    use crate::models::{DiscountRateSetting, MaxCompensationRate};

    // ── in-memory repository ─────────────────────────────────────────────
    #[derive(Default)]
    struct MemoryRepository {
        max_rates: Mutex<BTreeMap<i32, MaxCompensationRate>>,
        discount_rates: Mutex<BTreeMap<i32, DiscountRateSetting>>,
        fail_discount_lookup: bool,
    }

    #[async_trait]
    impl RateRepository for MemoryRepository {
        async fn get_max_compensation_rate(
            &self,
            year: i32,
        ) -> Result<MaxCompensationRate, RepositoryError> {
            self.max_rates
                .lock()
                .unwrap()
                .get(&year)
                .cloned()
                .ok_or(RepositoryError::NotFound)
        }
        async fn list_max_compensation_rates(
            &self
        ) -> Result<Vec<MaxCompensationRate>, RepositoryError> {
            Ok(self.max_rates.lock().unwrap().values().cloned().collect())
        }
        async fn upsert_max_compensation_rate(
            &self,
            rate: &MaxCompensationRate,
        ) -> Result<(), RepositoryError> {
            self.max_rates.lock().unwrap().insert(rate.year, rate.clone());
            Ok(())
        }
        async fn delete_max_compensation_rate(
            &self,
            year: i32,
        ) -> Result<(), RepositoryError> {
            self.max_rates
                .lock()
                .unwrap()
                .remove(&year)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound)
        }
        async fn get_discount_rate(
            &self,
            year: i32,
        ) -> Result<DiscountRateSetting, RepositoryError> {
            if self.fail_discount_lookup {
                return Err(RepositoryError::Connection("offline".to_string()));
            }
            self.discount_rates
                .lock()
                .unwrap()
                .get(&year)
                .cloned()
                .ok_or(RepositoryError::NotFound)
        }
        async fn list_discount_rates(&self) -> Result<Vec<DiscountRateSetting>, RepositoryError> {
            Ok(self.discount_rates.lock().unwrap().values().cloned().collect())
        }
        async fn upsert_discount_rate(
            &self,
            setting: &DiscountRateSetting,
        ) -> Result<(), RepositoryError> {
            self.discount_rates
                .lock()
                .unwrap()
                .insert(setting.year, setting.clone());
            Ok(())
        }
    }

    async fn seeded_repo() -> MemoryRepository {
        let repo = MemoryRepository::default();
        repo.upsert_max_compensation_rate(&MaxCompensationRate {
            year: 2024,
            max_weekly_rate: dec!(1093.67),
        })
        .await
        .unwrap();
        repo.upsert_max_compensation_rate(&MaxCompensationRate {
            year: 2025,
            max_weekly_rate: dec!(1134.43),
        })
        .await
        .unwrap();
        repo.upsert_discount_rate(&DiscountRateSetting {
            year: 2025,
            annual_rate: dec!(0.0438),
        })
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn loads_table_and_current_rate() {
        let repo = seeded_repo().await;

        let snapshot = RateSnapshot::load(&repo, 2025).await.unwrap();

        assert_eq!(snapshot.calculation_year, 2025);
        assert_eq!(snapshot.rate_table.len(), 2);
        assert_eq!(snapshot.rate_table.max_rate(2024), Some(1093.67));
        assert_eq!(snapshot.current_discount_rate, Some(0.0438));
    }

    #[tokio::test]
    async fn missing_discount_rate_is_none() {
        let repo = seeded_repo().await;

        let snapshot = RateSnapshot::load(&repo, 2026).await.unwrap();

        assert_eq!(snapshot.current_discount_rate, None);
    }

    #[tokio::test]
    async fn other_repository_errors_propagate() {
        let repo = MemoryRepository {
            fail_discount_lookup: true,
            ..Default::default()
        };

        let result = RateSnapshot::load(&repo, 2025).await;

        assert_eq!(result, Err(RepositoryError::Connection("offline".to_string())));
    }

    #[tokio::test]
    async fn invalid_stored_rate_is_database_error() {
        let repo = MemoryRepository::default();
        repo.upsert_max_compensation_rate(&MaxCompensationRate {
            year: 2020,
            max_weekly_rate: dec!(-1),
        })
        .await
        .unwrap();

        let result = RateSnapshot::load(&repo, 2025).await;

        assert!(matches!(
            result,
            Err(RepositoryError::Database(msg)) if msg.starts_with("invalid max rate data")
        ));
    }

    #[tokio::test]
    async fn snapshot_feeds_calculator() {
        let repo = seeded_repo().await;
        let snapshot = RateSnapshot::load(&repo, 2026).await.unwrap();
        let calculator = CommutedValueCalculator::new(CalculatorConfig::for_year(2026));
        let input = CalculationInput {
            year_of_injury: 2025,
            compensation_rate: 500.0,
            weeks_already_paid: 0.0,
            other_credit_weeks: 0.0,
        };

        let result = snapshot.calculate(&calculator, &input).unwrap();

        assert!(result.used_fallback_discount_rate);
        assert_eq!(result.weeks_remaining, 500.0);
    }
}
