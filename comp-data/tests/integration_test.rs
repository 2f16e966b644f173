//! Integration tests for rate loading using the SQLite backend.

use comp_core::{RateRepository, RateSnapshot};
use comp_data::{DiscountRateLoader, MaxRateLoader, RateLoaderError};
use comp_db_sqlite::SqliteRepository;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;

const MAX_RATES_CSV: &str = include_str!("../test-data/max_compensation_rates.csv");
const DISCOUNT_RATES_CSV: &str = include_str!("../test-data/discount_rates.csv");

/// Migrated database with no seed data, as after `--migrate` alone.
async fn setup_test_db() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");

    repo
}

#[tokio::test]
async fn test_load_max_rates() {
    let repo = setup_test_db().await;

    let records = MaxRateLoader::parse(MAX_RATES_CSV.as_bytes()).expect("Failed to parse CSV");
    let loaded = MaxRateLoader::load(&repo, &records)
        .await
        .expect("Failed to load rates");

    assert_eq!(loaded, 8);
    let rate = repo
        .get_max_compensation_rate(2019)
        .await
        .expect("Should find 2019 rate");
    assert_eq!(rate.max_weekly_rate, dec!(845.74));
}

#[tokio::test]
async fn test_loading_twice_is_idempotent() {
    let repo = setup_test_db().await;
    let records = MaxRateLoader::parse(MAX_RATES_CSV.as_bytes()).expect("Failed to parse CSV");

    MaxRateLoader::load(&repo, &records)
        .await
        .expect("First load failed");
    MaxRateLoader::load(&repo, &records)
        .await
        .expect("Second load failed");

    let all = repo
        .list_max_compensation_rates()
        .await
        .expect("Should list rates");
    assert_eq!(all.len(), 8);
}

#[tokio::test]
async fn test_reload_replaces_changed_rate() {
    let repo = setup_test_db().await;
    let original = MaxRateLoader::parse("year,max_weekly_rate\n2025,1100.00\n".as_bytes())
        .expect("Failed to parse CSV");
    let corrected = MaxRateLoader::parse("year,max_weekly_rate\n2025,1134.43\n".as_bytes())
        .expect("Failed to parse CSV");

    MaxRateLoader::load(&repo, &original)
        .await
        .expect("First load failed");
    MaxRateLoader::load(&repo, &corrected)
        .await
        .expect("Second load failed");

    let rate = repo
        .get_max_compensation_rate(2025)
        .await
        .expect("Should find 2025 rate");
    assert_eq!(rate.max_weekly_rate, dec!(1134.43));
}

#[tokio::test]
async fn test_load_discount_rates_with_percent_notation() {
    let repo = setup_test_db().await;

    let records =
        DiscountRateLoader::parse(DISCOUNT_RATES_CSV.as_bytes()).expect("Failed to parse CSV");
    let loaded = DiscountRateLoader::load(&repo, &records)
        .await
        .expect("Failed to load discount rates");

    assert_eq!(loaded, 2);
    let setting = repo
        .get_discount_rate(2024)
        .await
        .expect("Should find 2024 discount rate");
    assert_eq!(setting.annual_rate, dec!(0.0425));
}

#[tokio::test]
async fn test_loaded_data_feeds_rate_snapshot() {
    let repo = setup_test_db().await;
    let max_rates = MaxRateLoader::parse(MAX_RATES_CSV.as_bytes()).expect("Failed to parse CSV");
    let discount_rates =
        DiscountRateLoader::parse(DISCOUNT_RATES_CSV.as_bytes()).expect("Failed to parse CSV");
    MaxRateLoader::load(&repo, &max_rates)
        .await
        .expect("Failed to load rates");
    DiscountRateLoader::load(&repo, &discount_rates)
        .await
        .expect("Failed to load discount rates");

    let snapshot = RateSnapshot::load(&repo, 2025)
        .await
        .expect("Failed to load snapshot");

    assert_eq!(snapshot.rate_table.len(), 8);
    assert_eq!(snapshot.current_discount_rate, Some(0.0438));
}

#[test]
fn test_invalid_row_reports_line_number() {
    let csv = "year,max_weekly_rate\n2024,1093.67\n2025,-5\n";

    let err = MaxRateLoader::parse(csv.as_bytes()).expect_err("Should reject negative rate");

    assert_eq!(
        err.to_string(),
        "Invalid value on line 3: max weekly rate -5 must be positive"
    );
    assert!(matches!(err, RateLoaderError::InvalidValue { line: 3, .. }));
}
