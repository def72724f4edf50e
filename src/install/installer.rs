//! Installer that prefers an elevated install and falls back to the
//! standard confirmation flow.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::notifications::{Notice, NoticeKind, Notifier};
use crate::transfer::ArtifactLocation;

use super::launcher::InstallLauncher;
use super::models::{InstallError, InstallRequest};
use super::shell::PrivilegedShell;

/// Installs a downloaded artifact.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Installer: Send + Sync {
    /// Returns true if the artifact was installed or accepted for
    /// presentation to the user.
    async fn install(&self, location: &ArtifactLocation) -> bool;
}

enum ElevatedResult {
    Installed,
    Unavailable,
    Failed(i32),
}

/// Default installer.
///
/// With a privileged shell configured, the elevated path is tried first; any
/// error or non-zero exit falls through to the standard path once.
pub struct PackageInstaller {
    launcher: Arc<dyn InstallLauncher>,
    shell: Option<Arc<dyn PrivilegedShell>>,
    notifier: Arc<dyn Notifier>,
}

impl PackageInstaller {
    pub fn new(launcher: Arc<dyn InstallLauncher>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            launcher,
            shell: None,
            notifier,
        }
    }

    /// Enable the elevated install path.
    pub fn with_elevated(mut self, shell: Arc<dyn PrivilegedShell>) -> Self {
        self.shell = Some(shell);
        self
    }

    pub fn has_elevated(&self) -> bool {
        self.shell.is_some()
    }

    async fn install_elevated(
        &self,
        shell: &dyn PrivilegedShell,
        location: &ArtifactLocation,
    ) -> Result<ElevatedResult, InstallError> {
        if !shell.is_available().await {
            return Ok(ElevatedResult::Unavailable);
        }

        let path = location
            .path()
            .to_str()
            .ok_or_else(|| InstallError::UnquotablePath(location.to_string()))?;
        let quoted =
            shlex::try_quote(path).map_err(|_| InstallError::UnquotablePath(path.to_string()))?;

        let code = shell.run(&format!("pm install -r {}", quoted)).await?;
        if code == 0 {
            Ok(ElevatedResult::Installed)
        } else {
            Ok(ElevatedResult::Failed(code))
        }
    }

    async fn install_standard(&self, location: &ArtifactLocation) -> bool {
        let request = InstallRequest::for_artifact(location.clone());
        match self.launcher.launch(&request).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to present install for {}: {}", location, e);
                false
            }
        }
    }
}

#[async_trait]
impl Installer for PackageInstaller {
    async fn install(&self, location: &ArtifactLocation) -> bool {
        if let Some(shell) = &self.shell {
            match self.install_elevated(shell.as_ref(), location).await {
                Ok(ElevatedResult::Installed) => {
                    info!("Installed {} through privileged shell", location);
                    self.notifier.notify(
                        Notice::new(NoticeKind::InstallSucceeded, "Installation completed")
                            .with_body(location.to_string()),
                    );
                    return true;
                }
                Ok(ElevatedResult::Unavailable) => {
                    debug!("Privileged shell unavailable, using standard installer");
                }
                Ok(ElevatedResult::Failed(code)) => {
                    warn!(
                        "Privileged install of {} exited with {}, falling back",
                        location, code
                    );
                    self.notifier.notify(
                        Notice::new(NoticeKind::InstallFailed, "Installation failed")
                            .with_body(format!("exit code {}", code)),
                    );
                }
                Err(e) => {
                    warn!("Privileged install of {} failed: {}, falling back", location, e);
                }
            }
        }

        self.install_standard(location).await
    }
}
