//! Catalog state holder
//!
//! Publishes the catalog view state and coordinates downloads and installs.

mod orchestrator;
mod state;

pub use orchestrator::{DownloadRequestOutcome, Store, NO_PACKAGES_MESSAGE};
pub use state::{CatalogViewState, PackageDisplayState, ALL_CATEGORIES};
