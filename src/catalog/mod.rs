mod error;
mod loader;
mod satellite;
mod tle_loader;

pub use error::CatalogError;
pub use loader::Catalog;
pub use satellite::{compare_by, rank, RankKey, Satellite};
pub use tle_loader::TleLoader;
