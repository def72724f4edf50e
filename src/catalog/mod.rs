//! Remote package catalog
//!
//! Fetches the JSON list of installable packages from the configured endpoint.

mod fetcher;
mod models;

#[cfg(any(test, feature = "mock"))]
pub use fetcher::MockCatalogFetcher;
pub use fetcher::{CatalogError, CatalogFetcher, HttpCatalogFetcher};
pub use models::PackageDescriptor;
