//! Hand-off to the host's install confirmation flow.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::models::{InstallError, InstallRequest};

/// Presents an install request to the user.
///
/// Success means the request was accepted for presentation, not that the
/// package was installed.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait InstallLauncher: Send + Sync {
    async fn launch(&self, request: &InstallRequest) -> Result<(), InstallError>;
}

/// Launches an opener command (e.g. `xdg-open`) with the artifact path.
pub struct CommandInstallLauncher {
    opener: String,
}

impl CommandInstallLauncher {
    pub fn new(opener: impl Into<String>) -> Self {
        Self {
            opener: opener.into(),
        }
    }
}

#[async_trait]
impl InstallLauncher for CommandInstallLauncher {
    async fn launch(&self, request: &InstallRequest) -> Result<(), InstallError> {
        debug!(
            "Install request for {} ({}, new_task={}, grant_read={})",
            request.location, request.mime_type, request.new_task, request.grant_read_permission
        );

        // The opener runs detached; we only care that it started.
        Command::new(&self.opener)
            .arg(request.location.path())
            .env("STOREFRONT_MIME_TYPE", &request.mime_type)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        info!("Handed {} to {}", request.location, self.opener);
        Ok(())
    }
}
