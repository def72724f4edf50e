//! In-process download queue backed by HTTP.
//!
//! Each accepted transfer is streamed to its destination file by a background
//! task. Status is kept in memory and served to pollers through
//! [`DownloadQueue::query`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::notifications::{Notice, NoticeKind, Notifier};

use super::models::*;
use super::queue::{DownloadQueue, QueueError};

type TransferTable = Arc<RwLock<HashMap<TransferId, TransferStatus>>>;

/// Download queue that performs transfers with `reqwest`.
pub struct HttpDownloadQueue {
    client: Client,
    network: NetworkConditions,
    next_id: AtomicI64,
    transfers: TransferTable,
    notifier: Option<Arc<dyn Notifier>>,
}

impl HttpDownloadQueue {
    /// Create a new queue.
    ///
    /// # Arguments
    /// * `network` - Network the host is on; transfers whose policy does not
    ///   permit it stay pending
    /// * `connect_timeout` - Connect timeout for each transfer
    /// * `read_timeout` - A transfer fails when no data arrives for this long
    pub fn new(
        network: NetworkConditions,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, QueueError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()
            .map_err(|e| QueueError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            network,
            next_id: AtomicI64::new(1),
            transfers: Arc::new(RwLock::new(HashMap::new())),
            notifier: None,
        })
    }

    /// Show a notice when a transfer with a completion notification finishes.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Number of transfers the queue knows about, in any state.
    pub async fn len(&self) -> usize {
        self.transfers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transfers.read().await.is_empty()
    }
}

#[async_trait]
impl DownloadQueue for HttpDownloadQueue {
    async fn enqueue(&self, request: TransferRequest) -> Result<TransferId, QueueError> {
        if let Some(parent) = request.destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        let id = TransferId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.transfers
            .write()
            .await
            .insert(id, TransferStatus::Pending);

        if !self.network.permits(&request.network_policy) {
            info!(
                "Transfer {} waiting for a permitted network ({:?})",
                id, self.network
            );
            return Ok(id);
        }

        info!("Transfer {} queued: {} -> {:?}", id, request.url, request.destination);

        let worker = TransferWorker {
            client: self.client.clone(),
            transfers: self.transfers.clone(),
            notifier: self.notifier.clone(),
        };
        tokio::spawn(async move { worker.run(id, request).await });

        Ok(id)
    }

    async fn query(&self, id: TransferId) -> Result<Option<TransferStatus>, QueueError> {
        Ok(self.transfers.read().await.get(&id).cloned())
    }
}

/// Performs a single transfer and records its progress.
struct TransferWorker {
    client: Client,
    transfers: TransferTable,
    notifier: Option<Arc<dyn Notifier>>,
}

impl TransferWorker {
    async fn run(self, id: TransferId, request: TransferRequest) {
        let status = match self.download(id, &request).await {
            Ok(location) => {
                info!("Transfer {} completed: {}", id, location);
                let notify_completed = request.notification_visibility
                    == NotificationVisibility::VisibleNotifyCompleted;
                if let (true, Some(notifier)) = (notify_completed, &self.notifier) {
                    notifier.notify(
                        Notice::new(NoticeKind::TransferCompleted, request.title.clone())
                            .with_body(request.description.clone()),
                    );
                }
                TransferStatus::Succeeded { location }
            }
            Err(e) => {
                warn!("Transfer {} failed: {:#}", id, e);
                if let Err(rm_err) = fs::remove_file(&request.destination).await {
                    debug!("No partial file to clean up for transfer {}: {}", id, rm_err);
                }
                TransferStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        self.set_status(id, status).await;
    }

    async fn download(
        &self,
        id: TransferId,
        request: &TransferRequest,
    ) -> Result<ArtifactLocation> {
        let mut builder = self.client.get(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .context("Failed to connect")?
            .error_for_status()
            .context("Server rejected transfer")?;

        let bytes_total = response.content_length();
        self.set_status(
            id,
            TransferStatus::Running {
                bytes_downloaded: 0,
                bytes_total,
            },
        )
        .await;

        let mut file = File::create(&request.destination)
            .await
            .with_context(|| format!("Failed to create {:?}", request.destination))?;

        let mut bytes_downloaded = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Transfer interrupted")?;
            file.write_all(&chunk).await?;
            bytes_downloaded += chunk.len() as u64;
            self.set_status(
                id,
                TransferStatus::Running {
                    bytes_downloaded,
                    bytes_total,
                },
            )
            .await;
        }
        file.flush().await?;

        debug!("Transfer {} wrote {} bytes", id, bytes_downloaded);
        Ok(ArtifactLocation::new(request.destination.clone()))
    }

    async fn set_status(&self, id: TransferId, status: TransferStatus) {
        self.transfers.write().await.insert(id, status);
    }
}
