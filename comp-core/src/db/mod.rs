pub mod factory;
pub mod repository;
pub mod snapshot;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use repository::{RateRepository, RepositoryError};
pub use snapshot::RateSnapshot;
