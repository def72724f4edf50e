//! Catalog data models.

use serde::{Deserialize, Serialize};

/// One installable package as published in the remote catalog.
///
/// Unknown fields in the catalog JSON are ignored so that the catalog schema
/// can grow without breaking older clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    /// Human-readable name
    pub name: String,
    /// Unique package identifier (e.g. "com.example.app")
    pub package_name: String,
    /// Version string shown to the user
    pub version: String,
    /// Monotonic integer version
    pub version_code: i32,
    /// Where the package artifact can be downloaded from
    pub download_url: String,
    pub icon_url: String,
    /// Category label, empty when the catalog omits it
    #[serde(default)]
    pub category: String,
}
