pub mod calculations;
pub mod db;
pub mod models;

pub use db::repository::{RateRepository, RepositoryError};
pub use db::snapshot::RateSnapshot;
pub use models::*;
