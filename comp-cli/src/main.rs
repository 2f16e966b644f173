use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use comp_cli::app::{self, CalculateRequest, RateSource};
use comp_cli::config::AppConfig;
use comp_cli::export::OutputFormat;
use comp_cli::logging;
use comp_cli::utils::{parse_amount, parse_rate};
use comp_core::calculations::{CalculatorConfig, CommutedValueCalculator};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// South Carolina workers' compensation commuted value calculator.
///
/// Loads the maximum compensation rates and the Commission discount rate
/// from the configured database, then computes the present value of the
/// remaining weekly benefits.
#[derive(Debug, Parser)]
#[command(name = "commuted-value", version, about)]
struct Cli {
    /// TOML configuration file. Defaults to `commuted-value.toml` in the
    /// working directory when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database backend to use.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `rates.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Year whose Commission discount rate applies (default: this year).
    #[arg(long, global = true)]
    calculation_year: Option<i32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the commuted value of a single claim.
    Calculate {
        #[arg(long)]
        year_of_injury: i32,

        /// Weekly compensation rate, e.g. `845.00`.
        #[arg(
            long,
            value_parser = parse_amount,
            required_unless_present = "aww",
            conflicts_with = "aww"
        )]
        rate: Option<f64>,

        /// Average weekly wage; the rate becomes 66 2/3% of it, capped.
        #[arg(long, value_parser = parse_amount)]
        aww: Option<f64>,

        /// Weeks of benefits already paid.
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        weeks_paid: f64,

        /// Other weeks credited against the 500-week maximum.
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        credit_weeks: f64,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Compute one report per row of a claims CSV.
    Batch {
        #[arg(long)]
        file: PathBuf,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Print the discounted-weeks factor for 1 to 500 weeks remaining.
    Table {
        /// Rate for the over-100-week tier, `0.0438` or `4.38%`.
        #[arg(long, value_parser = parse_rate)]
        discount_rate: Option<f64>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(logging::DEFAULT_LOG_LEVEL);

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = logging::configured_level(config.logging.level.as_deref()) {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &config.logging.file {
        logging::enable_file_logging(path)?;
    }

    if let Some(backend) = cli.backend {
        config.database.backend = backend;
    }
    if let Some(db) = cli.db {
        config.database.connection_string = db;
    }

    let calculation_year = app::resolve_calculation_year(cli.calculation_year, &config);
    debug!(calculation_year, ?config, "resolved configuration");

    let registry = app::build_registry();
    let snapshot = app::load_snapshot(&registry, &config.database, calculation_year).await?;
    let calculator = CommutedValueCalculator::new(CalculatorConfig::for_year(calculation_year));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Calculate {
            year_of_injury,
            rate,
            aww,
            weeks_paid,
            credit_weeks,
            format,
        } => {
            let rate = match (rate, aww) {
                (Some(rate), _) => RateSource::Weekly(rate),
                (None, Some(aww)) => RateSource::AverageWeeklyWage(aww),
                (None, None) => bail!("either --rate or --aww is required"),
            };
            let request = CalculateRequest {
                year_of_injury,
                rate,
                weeks_already_paid: weeks_paid,
                other_credit_weeks: credit_weeks,
            };
            let report = app::calculate(&request, &snapshot, &calculator)?;
            format.exporter().export_reports(&[report], &mut out)?;
        }
        Command::Batch { file, format } => {
            let entries = app::calculate_batch_file(&file, &snapshot, &calculator)?;
            let total = entries.len();
            let mut reports = Vec::with_capacity(total);
            let mut failed = 0;
            for entry in entries {
                match entry.outcome {
                    Ok(report) => reports.push(report),
                    Err(err) => {
                        failed += 1;
                        eprintln!("line {}: {}", entry.line, err);
                    }
                }
            }
            format.exporter().export_reports(&reports, &mut out)?;
            out.flush()?;
            if failed > 0 {
                bail!("{failed} of {total} rows failed");
            }
        }
        Command::Table {
            discount_rate,
            format,
        } => {
            let table = app::factor_table(discount_rate, &snapshot, &calculator)?;
            if table.used_fallback_discount_rate {
                warn!(
                    rate = table.annual_discount_rate,
                    "no Commission discount rate on file; using fallback"
                );
            }
            format.exporter().export_table(&table.rows, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
