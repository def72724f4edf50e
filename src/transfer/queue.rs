//! Download queue abstraction.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{TransferId, TransferRequest, TransferStatus};

/// Errors reported by a download queue.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download queue rejected request: {0}")]
    Rejected(String),

    #[error("Download queue unavailable: {0}")]
    Unavailable(String),
}

/// Service that performs transfers in the background and reports their status.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait DownloadQueue: Send + Sync {
    /// Submit a transfer. The returned id is used to poll its status.
    async fn enqueue(&self, request: TransferRequest) -> Result<TransferId, QueueError>;

    /// Current status of a transfer, `None` if the queue has no record of it.
    async fn query(&self, id: TransferId) -> Result<Option<TransferStatus>, QueueError>;
}
