//! Package installation
//!
//! Hands a downloaded artifact to the host's install confirmation flow, or
//! installs it directly through a privileged shell when one is available.

mod installer;
mod launcher;
mod models;
mod shell;

pub use installer::{Installer, PackageInstaller};
#[cfg(any(test, feature = "mock"))]
pub use installer::MockInstaller;
pub use launcher::{CommandInstallLauncher, InstallLauncher};
#[cfg(any(test, feature = "mock"))]
pub use launcher::MockInstallLauncher;
pub use models::{InstallError, InstallRequest, PACKAGE_ARCHIVE_MIME};
pub use shell::{PrivilegedShell, SuShell};
#[cfg(any(test, feature = "mock"))]
pub use shell::MockPrivilegedShell;
