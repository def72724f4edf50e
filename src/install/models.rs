//! Installation data models.

use thiserror::Error;

use crate::transfer::ArtifactLocation;

/// MIME type of an installable package archive.
pub const PACKAGE_ARCHIVE_MIME: &str = "application/vnd.android.package-archive";

/// Errors raised while installing a package.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Install handler rejected request: {0}")]
    Rejected(String),

    #[error("Artifact path cannot be passed to a shell: {0}")]
    UnquotablePath(String),
}

/// Request for the host's install confirmation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub location: ArtifactLocation,
    pub mime_type: String,
    /// Present the flow in a fresh task context
    pub new_task: bool,
    /// Grant the handler temporary read access to the artifact
    pub grant_read_permission: bool,
}

impl InstallRequest {
    pub fn for_artifact(location: ArtifactLocation) -> Self {
        Self {
            location,
            mime_type: PACKAGE_ARCHIVE_MIME.to_string(),
            new_task: true,
            grant_read_permission: true,
        }
    }
}
