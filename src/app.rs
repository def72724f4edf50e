//! Wiring of the host implementations into a [`Store`].

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::HttpCatalogFetcher;
use crate::config::AppConfig;
use crate::install::{CommandInstallLauncher, PackageInstaller, SuShell};
use crate::notifications::Notifier;
use crate::store::Store;
use crate::transfer::{DownloadQueue, HttpDownloadQueue, TransferEnqueuer, TransferMonitor};

/// Build a store backed by the HTTP catalog, the in-process download queue
/// and the command-based installer.
///
/// # Arguments
/// * `config` - Resolved application configuration
/// * `notifier` - Receives user-facing notices from every component
pub fn build_store(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Result<Arc<Store>> {
    let fetcher = HttpCatalogFetcher::new(
        config.catalog_url.clone(),
        config.connect_timeout(),
        config.read_timeout(),
    )
    .context("Failed to create catalog client")?;

    let queue: Arc<dyn DownloadQueue> = Arc::new(
        HttpDownloadQueue::new(
            config.transfer.network,
            config.connect_timeout(),
            config.read_timeout(),
        )
            .context("Failed to create download queue")?
            .with_notifier(notifier.clone()),
    );

    let enqueuer = TransferEnqueuer::new(
        queue.clone(),
        notifier.clone(),
        config.enqueue_settings(),
    );
    let monitor = TransferMonitor::new(
        queue,
        config.poll_interval(),
        config.transfer.max_poll_attempts,
    );

    let launcher = Arc::new(CommandInstallLauncher::new(config.install.opener.clone()));
    let mut installer = PackageInstaller::new(launcher, notifier);
    if config.install.elevated {
        installer = installer.with_elevated(Arc::new(SuShell::new()));
    }

    info!(
        "Store ready: catalog {}, downloads in {:?}, elevated install {}",
        config.catalog_url,
        config.downloads_dir,
        if installer.has_elevated() { "on" } else { "off" }
    );

    Ok(Arc::new(Store::new(
        Arc::new(fetcher),
        enqueuer,
        monitor,
        Arc::new(installer),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use crate::notifications::LogNotifier;
    use crate::store::CatalogViewState;

    #[tokio::test]
    async fn test_build_store_starts_loading() {
        let config = AppConfig::resolve(&CliConfig::default(), None).unwrap();
        let store = build_store(&config, Arc::new(LogNotifier::new())).unwrap();

        assert_eq!(*store.state(), CatalogViewState::Loading);
        assert_eq!(store.active_transfer_count(), 0);
    }
}
