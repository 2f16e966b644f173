use std::path::PathBuf;

use async_trait::async_trait;
use comp_core::db::{DbConfig, RateRepository, RepositoryError, RepositoryFactory};
use tracing::info;

use crate::repository::SqliteRepository;

/// Resolve the seeds directory at runtime so it works in both development and
/// packaged distribution.
///
/// Resolution order:
/// 1. **`COMP_DB_SQLITE_SEEDS_DIR`** if set.
/// 2. **`./seeds`** if the directory exists in the current working directory.
/// 3. **`$CARGO_MANIFEST_DIR/seeds`** as last resort (dev/tests when run
///    from the build tree).
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("COMP_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// Turn a bare path into a sqlx URL that creates the file when missing.
/// `:memory:` and strings already carrying the `sqlite:` scheme pass through.
fn database_url(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        "sqlite::memory:".to_string()
    } else if connection_string.starts_with("sqlite:") {
        connection_string.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", connection_string)
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use comp_core::db::RepositoryRegistry;
/// use comp_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database, apply migrations, then apply the seed files.
    ///
    /// `config.connection_string` is a file path (created if missing),
    /// `:memory:`, or a full `sqlite:` URL.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn RateRepository>, RepositoryError> {
        let url = database_url(&config.connection_string);
        let repo = SqliteRepository::new(&url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        let seeds = seeds_dir();
        repo.run_seeds(&seeds)
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        info!(database = %url, seeds = %seeds.display(), "opened sqlite rate repository");
        Ok(Box::new(repo))
    }
}
