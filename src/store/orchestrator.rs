//! Store orchestration.
//!
//! Owns the published [`CatalogViewState`] and drives the fetch, enqueue,
//! monitor and install steps for each download request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogFetcher, PackageDescriptor};
use crate::install::Installer;
use crate::transfer::{
    EnqueueError, MonitorOutcome, TransferEnqueuer, TransferEvent, TransferId, TransferMonitor,
};

use super::state::{CatalogViewState, PackageDisplayState};

/// Message published when the catalog has no packages (or could not be fetched).
pub const NO_PACKAGES_MESSAGE: &str = "No packages found on the server";

/// Result of a download request.
#[derive(Debug)]
pub enum DownloadRequestOutcome {
    /// Transfer enqueued and being monitored.
    Started(TransferId),
    /// A transfer for this package is already being enqueued (`None`) or
    /// monitored.
    AlreadyInProgress(Option<TransferId>),
    /// Enqueue failed; the package is not downloading.
    Rejected(EnqueueError),
}

/// Active transfer for one package.
#[derive(Debug, Clone)]
struct TransferHandle {
    /// `None` while the transfer is being enqueued
    transfer_id: Option<TransferId>,
    cancel: CancellationToken,
}

/// Slot reserved in the transfer map during enqueue.
///
/// Dropped without being committed (enqueue failed, or the request future was
/// abandoned), it frees the slot and clears the downloading flag.
struct Reservation<'a> {
    store: &'a Store,
    package_name: &'a str,
    committed: bool,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        {
            let mut transfers = self.store.lock_transfers();
            if transfers
                .get(self.package_name)
                .is_some_and(|h| h.transfer_id.is_none())
            {
                transfers.remove(self.package_name);
            }
        }
        self.store
            .update_download_status(self.package_name, false, 0);
    }
}

/// Single owner of the catalog view state.
///
/// Readers observe snapshots through [`Store::subscribe`]; every mutation is
/// published as one replacement of the current snapshot.
pub struct Store {
    fetcher: Arc<dyn CatalogFetcher>,
    enqueuer: TransferEnqueuer,
    monitor: TransferMonitor,
    installer: Arc<dyn Installer>,
    state_tx: watch::Sender<Arc<CatalogViewState>>,
    /// Package identifier -> active transfer
    transfers: Mutex<HashMap<String, TransferHandle>>,
}

impl Store {
    pub fn new(
        fetcher: Arc<dyn CatalogFetcher>,
        enqueuer: TransferEnqueuer,
        monitor: TransferMonitor,
        installer: Arc<dyn Installer>,
    ) -> Self {
        let (state_tx, _) = watch::channel(Arc::new(CatalogViewState::Loading));
        Self {
            fetcher,
            enqueuer,
            monitor,
            installer,
            state_tx,
            transfers: Mutex::new(HashMap::new()),
        }
    }

    // =========================================================================
    // Readers
    // =========================================================================

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CatalogViewState>> {
        self.state_tx.subscribe()
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<CatalogViewState> {
        self.state_tx.borrow().clone()
    }

    /// Packages in `category`; [`super::ALL_CATEGORIES`] disables filtering.
    pub fn filter_by_category(&self, category: &str) -> Vec<PackageDisplayState> {
        self.state_tx.borrow().filter_by_category(category)
    }

    pub fn categories(&self) -> Vec<String> {
        self.state_tx.borrow().categories().to_vec()
    }

    /// Transfer currently monitored for `package_name`.
    pub fn active_transfer(&self, package_name: &str) -> Option<TransferId> {
        self.lock_transfers()
            .get(package_name)
            .and_then(|h| h.transfer_id)
    }

    pub fn active_transfer_count(&self) -> usize {
        self.lock_transfers().len()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the catalog and publish `Success` or `Error`.
    pub async fn load_catalog(&self) {
        self.publish(CatalogViewState::Loading);

        // The fetch runs as its own task so a panic in it surfaces as an
        // error state instead of tearing down the caller.
        let fetcher = self.fetcher.clone();
        let fetched = tokio::spawn(async move { fetcher.fetch_catalog().await }).await;

        let state = match fetched {
            Ok(descriptors) if !descriptors.is_empty() => {
                info!("Loaded catalog with {} packages", descriptors.len());
                CatalogViewState::from_catalog(descriptors)
            }
            Ok(_) => {
                warn!("Catalog is empty or could not be fetched");
                CatalogViewState::Error {
                    message: NO_PACKAGES_MESSAGE.to_string(),
                }
            }
            Err(e) => {
                error!("Catalog fetch task failed: {}", e);
                CatalogViewState::Error {
                    message: format!("Failed to load packages: {}", e),
                }
            }
        };

        self.publish(state);
    }

    // =========================================================================
    // Downloads
    // =========================================================================

    /// Start downloading and installing `descriptor`.
    ///
    /// Returns once the transfer is enqueued; monitoring and installation
    /// continue on a background task.
    pub async fn request_download(
        self: &Arc<Self>,
        descriptor: &PackageDescriptor,
    ) -> DownloadRequestOutcome {
        let package_name = descriptor.package_name.clone();
        let cancel = CancellationToken::new();

        // The slot is reserved before enqueueing so a concurrent request for
        // the same package cannot create a second transfer.
        let mut reservation = {
            let mut transfers = self.lock_transfers();
            if let Some(existing) = transfers.get(&package_name) {
                info!(
                    "Download of {} already in progress ({:?})",
                    package_name, existing.transfer_id
                );
                return DownloadRequestOutcome::AlreadyInProgress(existing.transfer_id);
            }
            transfers.insert(
                package_name.clone(),
                TransferHandle {
                    transfer_id: None,
                    cancel: cancel.clone(),
                },
            );
            Reservation {
                store: self,
                package_name: &package_name,
                committed: false,
            }
        };

        self.update_download_status(&package_name, true, 0);

        let transfer_id = match self.enqueuer.enqueue(descriptor).await {
            Ok(id) => id,
            Err(e) => return DownloadRequestOutcome::Rejected(e),
        };

        if let Some(handle) = self.lock_transfers().get_mut(&package_name) {
            handle.transfer_id = Some(transfer_id);
        }
        reservation.committed = true;
        drop(reservation);

        let store = self.clone();
        tokio::spawn(async move {
            store.follow_transfer(package_name, transfer_id, cancel).await;
        });

        DownloadRequestOutcome::Started(transfer_id)
    }

    /// Stop monitoring every active transfer.
    pub fn cancel_all(&self) {
        for (package_name, handle) in self.lock_transfers().iter() {
            debug!(
                "Cancelling transfer {:?} for {}",
                handle.transfer_id, package_name
            );
            handle.cancel.cancel();
        }
    }

    async fn follow_transfer(
        &self,
        package_name: String,
        transfer_id: TransferId,
        cancel: CancellationToken,
    ) {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        let monitoring = self.monitor.monitor(transfer_id, events_tx, cancel);
        let handling = async {
            while let Some(event) = events_rx.recv().await {
                self.handle_transfer_event(&package_name, event).await;
            }
        };
        let (outcome, ()) = tokio::join!(monitoring, handling);

        if outcome == MonitorOutcome::TimedOut {
            debug!(
                "Transfer {} for {} not finished when monitoring stopped",
                transfer_id, package_name
            );
        }

        let mut transfers = self.lock_transfers();
        if transfers
            .get(&package_name)
            .is_some_and(|h| h.transfer_id == Some(transfer_id))
        {
            transfers.remove(&package_name);
        }
    }

    async fn handle_transfer_event(&self, package_name: &str, event: TransferEvent) {
        match event {
            TransferEvent::Progress(percent) => {
                self.update_download_status(package_name, true, percent);
            }
            TransferEvent::Succeeded(location) => {
                let installed = self.installer.install(&location).await;
                if !installed {
                    warn!("Install of {} from {} did not start", package_name, location);
                }
                self.update_download_status(package_name, false, 0);
            }
            TransferEvent::Failed => {
                info!("Download of {} failed", package_name);
                self.update_download_status(package_name, false, 0);
            }
        }
    }

    // =========================================================================
    // Publication
    // =========================================================================

    fn publish(&self, state: CatalogViewState) {
        self.state_tx.send_replace(Arc::new(state));
    }

    /// Replace one package's download fields; no-op outside `Success`.
    fn update_download_status(&self, package_name: &str, is_downloading: bool, progress: u8) {
        self.state_tx.send_if_modified(|state| {
            match state.with_download_status(package_name, is_downloading, progress) {
                Some(updated) => {
                    *state = Arc::new(updated);
                    true
                }
                None => false,
            }
        });
    }

    fn lock_transfers(&self) -> MutexGuard<'_, HashMap<String, TransferHandle>> {
        // A poisoned map is still structurally valid
        self.transfers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
