//! Data models for artifact transfers.
//!
//! Defines transfer identifiers, requests, statuses and the location of a
//! finished artifact.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the download queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransferId(pub i64);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// When the queue shows its own notification for a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVisibility {
    Hidden,
    Visible,
    VisibleNotifyCompleted,
}

/// Network types a transfer may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPolicy {
    pub allow_metered: bool,
    pub allow_roaming: bool,
}

impl Default for NetworkPolicy {
    fn default() -> Self {
        Self {
            allow_metered: true,
            allow_roaming: false,
        }
    }
}

/// Current network the host is on, as far as the queue is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkConditions {
    pub metered: bool,
    pub roaming: bool,
}

impl NetworkConditions {
    /// Returns true if a transfer with `policy` may run on this network.
    pub fn permits(&self, policy: &NetworkPolicy) -> bool {
        (!self.metered || policy.allow_metered) && (!self.roaming || policy.allow_roaming)
    }
}

/// A download submitted to the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub url: reqwest::Url,
    pub title: String,
    pub description: String,
    /// File the artifact is written to
    pub destination: PathBuf,
    /// Extra request headers (name, value)
    pub headers: Vec<(String, String)>,
    pub network_policy: NetworkPolicy,
    pub notification_visibility: NotificationVisibility,
}

/// Local location of a downloaded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocation {
    path: PathBuf,
}

impl ArtifactLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Status of a transfer as reported by the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    Pending,
    Running {
        bytes_downloaded: u64,
        /// Unknown until the server reports a length
        bytes_total: Option<u64>,
    },
    Succeeded {
        location: ArtifactLocation,
    }, // terminal
    Failed {
        reason: String,
    }, // terminal
}

impl TransferStatus {
    /// Returns true if this is a terminal state (Succeeded or Failed).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferStatus::Succeeded { .. } | TransferStatus::Failed { .. }
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::Running { .. } => "RUNNING",
            TransferStatus::Succeeded { .. } => "SUCCEEDED",
            TransferStatus::Failed { .. } => "FAILED",
        }
    }
}

/// Percentage of a running transfer, `floor(downloaded * 100 / total)`.
///
/// Returns `None` when the total is unknown or zero. Clamped to 100 if the
/// server sends more bytes than it announced.
pub fn progress_percent(bytes_downloaded: u64, bytes_total: Option<u64>) -> Option<u8> {
    let total = bytes_total.filter(|t| *t > 0)?;
    let percent = (bytes_downloaded as u128 * 100) / total as u128;
    Some(percent.min(100) as u8)
}
