//! CSV loaders that populate the rate repository.

mod loader;

pub use loader::{
    DiscountRateLoader, DiscountRateRecord, MaxRateLoader, MaxRateRecord, RateLoaderError,
};
