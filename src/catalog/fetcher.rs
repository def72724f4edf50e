//! HTTP client for the remote package catalog.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONNECTION};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, error, info};

use super::models::PackageDescriptor;

/// Errors that can occur while fetching the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog request failed with status: {0}")]
    Status(StatusCode),

    #[error("Catalog response body is empty")]
    EmptyBody,

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of package descriptors.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    /// Fetch the full catalog.
    ///
    /// Returns an empty list on any failure, so "no packages" and
    /// "fetch failed" look the same to callers.
    async fn fetch_catalog(&self) -> Vec<PackageDescriptor>;
}

/// Fetches the catalog from a fixed URL over HTTP(S).
#[derive(Clone)]
pub struct HttpCatalogFetcher {
    client: Client,
    url: String,
}

impl HttpCatalogFetcher {
    /// Create a new fetcher.
    ///
    /// # Arguments
    /// * `url` - Catalog endpoint returning a JSON array of packages
    /// * `connect_timeout` - Upper bound for establishing the connection
    /// * `read_timeout` - Upper bound for each read once connected
    pub fn new(
        url: String,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()?;

        Ok(Self { client, url })
    }

    /// Get the catalog URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the catalog, keeping the reason for a failure.
    pub async fn try_fetch(&self) -> Result<Vec<PackageDescriptor>, CatalogError> {
        debug!("Fetching catalog from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .header(CONNECTION, "close")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }

        let body = response.text().await?;
        parse_catalog(&body)
    }
}

#[async_trait]
impl CatalogFetcher for HttpCatalogFetcher {
    async fn fetch_catalog(&self) -> Vec<PackageDescriptor> {
        match self.try_fetch().await {
            Ok(packages) => {
                info!("Fetched {} packages from catalog", packages.len());
                packages
            }
            Err(e) => {
                error!("Failed to fetch catalog from {}: {}", self.url, e);
                Vec::new()
            }
        }
    }
}

/// Parse a catalog response body.
pub(crate) fn parse_catalog(body: &str) -> Result<Vec<PackageDescriptor>, CatalogError> {
    if body.trim().is_empty() {
        return Err(CatalogError::EmptyBody);
    }
    Ok(serde_json::from_str(body)?)
}
