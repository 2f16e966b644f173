use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use comp_data::{DiscountRateLoader, MaxRateLoader};
use comp_db_sqlite::SqliteRepository;
use tracing_subscriber::EnvFilter;

/// Load maximum compensation rates and Commission discount rates from CSV
/// files into the database.
///
/// Maximum rate CSV columns: `year,max_weekly_rate`.
/// Discount rate CSV columns: `year,annual_rate` (`0.0438` or `4.38%`).
#[derive(Parser, Debug)]
#[command(name = "comp-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// CSV file of maximum weekly compensation rates by injury year
    #[arg(long)]
    max_rates: Option<PathBuf>,

    /// CSV file of Commission discount rates by calculation year
    #[arg(long)]
    discount_rates: Option<PathBuf>,

    /// SQLite database URL (e.g., sqlite:rates.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:rates.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open: {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if args.max_rates.is_none()
        && args.discount_rates.is_none()
        && !args.migrate
        && args.seeds.is_none()
    {
        bail!("nothing to do: pass --max-rates, --discount-rates, --migrate or --seeds");
    }

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    if let Some(path) = &args.max_rates {
        println!("Loading maximum compensation rates from: {}", path.display());
        let records = MaxRateLoader::parse(open(path)?)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let loaded = MaxRateLoader::load(&repo, &records)
            .await
            .context("Failed to load maximum compensation rates into database")?;
        println!("Successfully loaded {} maximum compensation rates.", loaded);
    }

    if let Some(path) = &args.discount_rates {
        println!("Loading discount rates from: {}", path.display());
        let records = DiscountRateLoader::parse(open(path)?)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let loaded = DiscountRateLoader::load(&repo, &records)
            .await
            .context("Failed to load discount rates into database")?;
        println!("Successfully loaded {} discount rates.", loaded);
    }

    Ok(())
}
