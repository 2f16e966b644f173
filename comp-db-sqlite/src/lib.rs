//! SQLite backend for the rate repository.

mod decimal;
mod factory;
mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
