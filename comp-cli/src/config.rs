//! Optional TOML configuration for the `commuted-value` binary.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "rates.db"
//!
//! [logging]
//! level = "info"
//! file = "commuted-value.log"
//!
//! [calculation]
//! calculation_year = 2025
//! ```
//!
//! Every section and key is optional. Command-line flags win over the file.

use std::fs;
use std::path::{Path, PathBuf};

use comp_core::db::DbConfig;
use serde::Deserialize;
use thiserror::Error;

/// File picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "commuted-value.toml";

/// Database file shared with `comp-data-loader`'s default.
pub const DEFAULT_DATABASE: &str = "rates.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    pub logging: LoggingSettings,
    pub calculation: CalculationSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DbConfig {
                connection_string: DEFAULT_DATABASE.to_string(),
                ..DbConfig::default()
            },
            logging: LoggingSettings::default(),
            calculation: CalculationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` takes
    /// precedence when set.
    pub level: Option<String>,
    /// Append log records to this file as well as stderr.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CalculationSettings {
    /// Year whose Commission discount rate applies. Defaults to the
    /// current calendar year.
    pub calculation_year: Option<i32>,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Reads `explicit` when given. Otherwise reads [`DEFAULT_CONFIG_FILE`]
    /// if it exists, else returns the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
