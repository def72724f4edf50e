//! Artifact transfers
//!
//! Validates download URLs, submits transfers to a download queue and polls
//! them until they finish.

mod enqueuer;
mod http_queue;
mod models;
mod monitor;
mod queue;

pub use enqueuer::{
    validate_download_url, validate_package_name, EnqueueError, EnqueueSettings, TransferEnqueuer,
};
pub use http_queue::HttpDownloadQueue;
pub use models::*;
pub use monitor::{MonitorOutcome, PollStep, TransferEvent, TransferMonitor};
#[cfg(any(test, feature = "mock"))]
pub use queue::MockDownloadQueue;
pub use queue::{DownloadQueue, QueueError};
