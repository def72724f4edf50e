//! Published catalog view state.

use serde::Serialize;

use crate::catalog::PackageDescriptor;

/// Category label meaning "no filter".
pub const ALL_CATEGORIES: &str = "All";

/// A catalog entry with its transient download status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDisplayState {
    pub descriptor: PackageDescriptor,
    pub is_downloading: bool,
    /// 0 to 100, meaningful only while downloading
    pub download_progress: u8,
}

impl PackageDisplayState {
    pub fn new(descriptor: PackageDescriptor) -> Self {
        Self {
            descriptor,
            is_downloading: false,
            download_progress: 0,
        }
    }

    pub fn package_name(&self) -> &str {
        &self.descriptor.package_name
    }
}

/// State of the catalog as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CatalogViewState {
    Loading,
    Success {
        packages: Vec<PackageDisplayState>,
        categories: Vec<String>,
    },
    Error {
        message: String,
    },
}

impl CatalogViewState {
    /// Build the success state for a freshly fetched catalog.
    ///
    /// Categories are the distinct labels in sorted order.
    pub fn from_catalog(descriptors: Vec<PackageDescriptor>) -> Self {
        let mut categories: Vec<String> = descriptors.iter().map(|d| d.category.clone()).collect();
        categories.sort();
        categories.dedup();

        CatalogViewState::Success {
            packages: descriptors.into_iter().map(PackageDisplayState::new).collect(),
            categories,
        }
    }

    pub fn packages(&self) -> &[PackageDisplayState] {
        match self {
            CatalogViewState::Success { packages, .. } => packages,
            _ => &[],
        }
    }

    pub fn categories(&self) -> &[String] {
        match self {
            CatalogViewState::Success { categories, .. } => categories,
            _ => &[],
        }
    }

    pub fn package(&self, package_name: &str) -> Option<&PackageDisplayState> {
        self.packages()
            .iter()
            .find(|p| p.package_name() == package_name)
    }

    /// Packages in `category`, or all of them for [`ALL_CATEGORIES`].
    pub fn filter_by_category(&self, category: &str) -> Vec<PackageDisplayState> {
        self.packages()
            .iter()
            .filter(|p| category == ALL_CATEGORIES || p.descriptor.category == category)
            .cloned()
            .collect()
    }

    /// Copy of this state with one package's download status replaced.
    ///
    /// Returns `None` if the state is not `Success` or the package is unknown.
    pub fn with_download_status(
        &self,
        package_name: &str,
        is_downloading: bool,
        progress: u8,
    ) -> Option<Self> {
        let CatalogViewState::Success {
            packages,
            categories,
        } = self
        else {
            return None;
        };

        if !packages.iter().any(|p| p.package_name() == package_name) {
            return None;
        }

        let packages = packages
            .iter()
            .map(|p| {
                if p.package_name() == package_name {
                    PackageDisplayState {
                        descriptor: p.descriptor.clone(),
                        is_downloading,
                        download_progress: progress.min(100),
                    }
                } else {
                    p.clone()
                }
            })
            .collect();

        Some(CatalogViewState::Success {
            packages,
            categories: categories.clone(),
        })
    }
}
