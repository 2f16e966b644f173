use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use comp_core::{DiscountRateSetting, MaxCompensationRate, RateRepository, RepositoryError};
use sqlx::{Row, sqlite::SqlitePool};
use tracing::debug;

use crate::decimal::{decimal_to_f64, get_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_max_rate(row: &sqlx::sqlite::SqliteRow) -> Result<MaxCompensationRate, RepositoryError> {
    Ok(MaxCompensationRate {
        year: row
            .try_get("year")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        max_weekly_rate: get_decimal(row, "max_weekly_rate")?,
    })
}

fn row_to_discount_rate(
    row: &sqlx::sqlite::SqliteRow
) -> Result<DiscountRateSetting, RepositoryError> {
    Ok(DiscountRateSetting {
        year: row
            .try_get("year")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        annual_rate: get_decimal(row, "annual_rate")?,
    })
}

#[async_trait]
impl RateRepository for SqliteRepository {
    async fn get_max_compensation_rate(
        &self,
        year: i32,
    ) -> Result<MaxCompensationRate, RepositoryError> {
        let row = sqlx::query(
            "SELECT year, max_weekly_rate FROM max_compensation_rates WHERE year = ?",
        )
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_max_rate(&row)
    }

    async fn list_max_compensation_rates(
        &self
    ) -> Result<Vec<MaxCompensationRate>, RepositoryError> {
        let rows =
            sqlx::query("SELECT year, max_weekly_rate FROM max_compensation_rates ORDER BY year")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_max_rate).collect()
    }

    async fn upsert_max_compensation_rate(
        &self,
        rate: &MaxCompensationRate,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO max_compensation_rates (year, max_weekly_rate) VALUES (?, ?)
             ON CONFLICT(year) DO UPDATE SET max_weekly_rate = excluded.max_weekly_rate",
        )
        .bind(rate.year)
        .bind(decimal_to_f64(rate.max_weekly_rate)?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_max_compensation_rate(
        &self,
        year: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM max_compensation_rates WHERE year = ?")
            .bind(year)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get_discount_rate(
        &self,
        year: i32,
    ) -> Result<DiscountRateSetting, RepositoryError> {
        let row = sqlx::query("SELECT year, annual_rate FROM discount_rates WHERE year = ?")
            .bind(year)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_discount_rate(&row)
    }

    async fn list_discount_rates(&self) -> Result<Vec<DiscountRateSetting>, RepositoryError> {
        let rows = sqlx::query("SELECT year, annual_rate FROM discount_rates ORDER BY year")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_discount_rate).collect()
    }

    async fn upsert_discount_rate(
        &self,
        setting: &DiscountRateSetting,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO discount_rates (year, annual_rate) VALUES (?, ?)
             ON CONFLICT(year) DO UPDATE SET annual_rate = excluded.annual_rate",
        )
        .bind(setting.year)
        .bind(decimal_to_f64(setting.annual_rate)?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }
}
