//! Storefront client library
//!
//! Fetches a remote package catalog, downloads package artifacts through a
//! download queue and hands them to the host installer. The binary in
//! `main.rs` is a thin terminal front-end over these modules.

pub mod app;
pub mod catalog;
pub mod config;
pub mod install;
pub mod notifications;
pub mod store;
pub mod transfer;

// Re-export commonly used types for convenience
pub use app::build_store;
pub use catalog::{CatalogFetcher, HttpCatalogFetcher, PackageDescriptor};
pub use config::{AppConfig, CliConfig, FileConfig};
pub use notifications::{LogNotifier, Notice, NoticeKind, Notifier};
pub use store::{CatalogViewState, DownloadRequestOutcome, PackageDisplayState, Store};
