use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DiscountRateSetting, MaxCompensationRate};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Source of the rate data the calculators consume.
#[async_trait]
pub trait RateRepository: Send + Sync {
    // Maximum weekly compensation rates
    async fn get_max_compensation_rate(
        &self,
        year: i32,
    ) -> Result<MaxCompensationRate, RepositoryError>;
    async fn list_max_compensation_rates(&self)
    -> Result<Vec<MaxCompensationRate>, RepositoryError>;
    async fn upsert_max_compensation_rate(
        &self,
        rate: &MaxCompensationRate,
    ) -> Result<(), RepositoryError>;
    async fn delete_max_compensation_rate(
        &self,
        year: i32,
    ) -> Result<(), RepositoryError>;

    // Commission discount rates (over-100-week tier)
    async fn get_discount_rate(
        &self,
        year: i32,
    ) -> Result<DiscountRateSetting, RepositoryError>;
    async fn list_discount_rates(&self) -> Result<Vec<DiscountRateSetting>, RepositoryError>;
    async fn upsert_discount_rate(
        &self,
        setting: &DiscountRateSetting,
    ) -> Result<(), RepositoryError>;
}
