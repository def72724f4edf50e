//! Privileged shell used for unattended installs.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::models::InstallError;

/// A shell able to run commands with elevated privileges.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait PrivilegedShell: Send + Sync {
    /// Returns true if elevated commands can be run right now.
    async fn is_available(&self) -> bool;

    /// Run `command` elevated and return its exit code.
    async fn run(&self, command: &str) -> Result<i32, InstallError>;
}

/// Elevation through `su`.
pub struct SuShell {
    program: String,
}

impl SuShell {
    pub fn new() -> Self {
        Self::with_program("su")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SuShell {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrivilegedShell for SuShell {
    async fn is_available(&self) -> bool {
        let child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                debug!("{} not available: {}", self.program, e);
                return false;
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(b"exit\n").await {
                debug!("Failed to write to {}: {}", self.program, e);
            }
        }

        match child.wait().await {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("Failed to wait for {}: {}", self.program, e);
                false
            }
        }
    }

    async fn run(&self, command: &str) -> Result<i32, InstallError> {
        let status = Command::new(&self.program)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .status()
            .await?;

        // Killed by a signal counts as failure
        Ok(status.code().unwrap_or(-1))
    }
}
