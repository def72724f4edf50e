//! Stores wired against the fixture server

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storefront::install::{InstallError, InstallLauncher, InstallRequest, PackageInstaller};
use storefront::transfer::{
    DownloadQueue, EnqueueSettings, HttpDownloadQueue, NetworkConditions, NetworkPolicy,
    TransferEnqueuer, TransferMonitor,
};
use storefront::{HttpCatalogFetcher, LogNotifier, Store};

/// Launcher that records install requests instead of opening them
#[derive(Default)]
pub struct RecordingLauncher {
    launched: Mutex<Vec<InstallRequest>>,
}

impl RecordingLauncher {
    pub fn launched(&self) -> Vec<InstallRequest> {
        self.launched.lock().unwrap().clone()
    }
}

#[async_trait]
impl InstallLauncher for RecordingLauncher {
    async fn launch(&self, request: &InstallRequest) -> Result<(), InstallError> {
        self.launched.lock().unwrap().push(request.clone());
        Ok(())
    }
}

pub struct TestStore {
    pub store: Arc<Store>,
    pub notifier: Arc<LogNotifier>,
    pub launcher: Arc<RecordingLauncher>,
}

/// Build a store with a fast poll interval.
///
/// # Arguments
/// * `catalog_url` - Catalog endpoint on the fixture server
/// * `downloads_dir` - Where artifacts are written
/// * `network` - Conditions the download queue runs under
/// * `max_attempts` - Poll ceiling for each transfer
pub fn build_test_store(
    catalog_url: String,
    downloads_dir: &Path,
    network: NetworkConditions,
    max_attempts: u32,
) -> TestStore {
    let notifier = Arc::new(LogNotifier::new());
    let launcher = Arc::new(RecordingLauncher::default());

    let fetcher = HttpCatalogFetcher::new(
        catalog_url,
        Duration::from_secs(5),
        Duration::from_secs(5),
    )
    .expect("Failed to create fetcher");
    let queue: Arc<dyn DownloadQueue> = Arc::new(
        HttpDownloadQueue::new(network, Duration::from_secs(5), Duration::from_secs(5))
            .expect("Failed to create queue")
            .with_notifier(notifier.clone()),
    );
    let enqueuer = TransferEnqueuer::new(
        queue.clone(),
        notifier.clone(),
        EnqueueSettings {
            downloads_dir: downloads_dir.to_path_buf(),
            artifact_extension: "apk".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            network_policy: NetworkPolicy::default(),
        },
    );
    let monitor = TransferMonitor::new(queue, Duration::from_millis(20), max_attempts);
    let installer = PackageInstaller::new(launcher.clone(), notifier.clone());

    let store = Arc::new(Store::new(
        Arc::new(fetcher),
        enqueuer,
        monitor,
        Arc::new(installer),
    ));

    TestStore {
        store,
        notifier,
        launcher,
    }
}
