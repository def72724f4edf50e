//! Turns a package descriptor into a queued transfer.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use reqwest::Url;
use thiserror::Error;
use tracing::{error, info};

use crate::catalog::PackageDescriptor;
use crate::notifications::{Notice, NoticeKind, Notifier};

use super::models::*;
use super::queue::{DownloadQueue, QueueError};

/// Why a transfer could not be enqueued. No transfer exists in any of these cases.
#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("Invalid download URL: {0:?}")]
    InvalidUrl(String),

    #[error("Malformed download URL {url:?}: {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error("Package name {0:?} is not a plain file name")]
    UnsafePackageName(String),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Settings applied to every transfer request.
#[derive(Debug, Clone)]
pub struct EnqueueSettings {
    /// Directory artifacts are written to
    pub downloads_dir: PathBuf,
    /// Extension appended to the package identifier to name the artifact
    pub artifact_extension: String,
    pub user_agent: String,
    pub network_policy: NetworkPolicy,
}

/// Validates download URLs and submits transfers to the queue.
pub struct TransferEnqueuer {
    queue: Arc<dyn DownloadQueue>,
    notifier: Arc<dyn Notifier>,
    settings: EnqueueSettings,
}

impl TransferEnqueuer {
    pub fn new(
        queue: Arc<dyn DownloadQueue>,
        notifier: Arc<dyn Notifier>,
        settings: EnqueueSettings,
    ) -> Self {
        Self {
            queue,
            notifier,
            settings,
        }
    }

    /// Enqueue the artifact download for `descriptor`.
    ///
    /// Failures are notified to the user and returned; this never panics.
    pub async fn enqueue(
        &self,
        descriptor: &PackageDescriptor,
    ) -> Result<TransferId, EnqueueError> {
        if let Err(e) = validate_package_name(&descriptor.package_name) {
            error!("Rejecting download of {:?}: {}", descriptor.package_name, e);
            self.notifier.notify(
                Notice::new(NoticeKind::EnqueueFailed, "Failed to start download")
                    .with_body(e.to_string()),
            );
            return Err(e);
        }

        let url = match validate_download_url(&descriptor.download_url) {
            Ok(url) => url,
            Err(e) => {
                error!("Rejecting download of {}: {}", descriptor.package_name, e);
                self.notifier.notify(
                    Notice::new(NoticeKind::InvalidUrl, "Invalid download URL")
                        .with_body(descriptor.download_url.clone()),
                );
                return Err(e);
            }
        };

        let request = self.build_request(descriptor, url);
        match self.queue.enqueue(request).await {
            Ok(id) => {
                info!("Enqueued transfer {} for {}", id, descriptor.package_name);
                self.notifier.notify(Notice::new(
                    NoticeKind::TransferStarted,
                    format!("Download started: {}", descriptor.name),
                ));
                Ok(id)
            }
            Err(e) => {
                error!("Failed to enqueue {}: {}", descriptor.package_name, e);
                self.notifier.notify(
                    Notice::new(NoticeKind::EnqueueFailed, "Failed to start download")
                        .with_body(e.to_string()),
                );
                Err(e.into())
            }
        }
    }

    /// Build the queue request for a validated URL.
    pub fn build_request(&self, descriptor: &PackageDescriptor, url: Url) -> TransferRequest {
        TransferRequest {
            url,
            title: format!("Downloading {}", descriptor.name),
            description: format!("Version {}", descriptor.version),
            destination: self.destination_for(&descriptor.package_name),
            headers: vec![("User-Agent".to_string(), self.settings.user_agent.clone())],
            network_policy: self.settings.network_policy,
            notification_visibility: NotificationVisibility::VisibleNotifyCompleted,
        }
    }

    /// `<downloads_dir>/<package_name>.<ext>`
    ///
    /// `package_name` must already have passed [`validate_package_name`].
    pub fn destination_for(&self, package_name: &str) -> PathBuf {
        self.settings
            .downloads_dir
            .join(format!("{}.{}", package_name, self.settings.artifact_extension))
    }
}

/// Accept only package names that form a single plain file name, so the
/// artifact always lands directly inside the downloads directory.
pub fn validate_package_name(package_name: &str) -> Result<(), EnqueueError> {
    let unsafe_name = || EnqueueError::UnsafePackageName(package_name.to_string());

    if package_name.trim().is_empty() || package_name.contains(['/', '\\', '\0']) {
        return Err(unsafe_name());
    }

    let mut components = Path::new(package_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(unsafe_name()),
    }
}

/// Accept only non-blank absolute http(s) URLs with a host.
pub fn validate_download_url(raw: &str) -> Result<Url, EnqueueError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnqueueError::InvalidUrl(raw.to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| EnqueueError::MalformedUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(EnqueueError::InvalidUrl(raw.to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(EnqueueError::MalformedUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::LogNotifier;
    use crate::transfer::queue::MockDownloadQueue;

    fn descriptor(url: &str) -> PackageDescriptor {
        PackageDescriptor {
            name: "A".to_string(),
            package_name: "com.a".to_string(),
            version: "1.0".to_string(),
            version_code: 1,
            download_url: url.to_string(),
            icon_url: String::new(),
            category: "Games".to_string(),
        }
    }

    fn settings() -> EnqueueSettings {
        EnqueueSettings {
            downloads_dir: PathBuf::from("/var/lib/storefront/downloads"),
            artifact_extension: "apk".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            network_policy: NetworkPolicy::default(),
        }
    }

    fn enqueuer(queue: MockDownloadQueue, notifier: Arc<LogNotifier>) -> TransferEnqueuer {
        TransferEnqueuer::new(Arc::new(queue), notifier, settings())
    }

    #[test]
    fn test_package_name_must_be_plain_file_name() {
        assert!(validate_package_name("com.a").is_ok());
        assert!(validate_package_name("com.example..beta").is_ok());

        for name in [
            "",
            "  ",
            "..",
            ".",
            "../x",
            "/etc/x",
            "/etc/cron.d/evil",
            "../../../../home/user/.local/bin/evil",
            "sub/dir",
            "..\\x",
        ] {
            assert!(
                matches!(
                    validate_package_name(name),
                    Err(EnqueueError::UnsafePackageName(_))
                ),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_unsafe_package_name_never_reaches_queue() {
        for name in ["../x", "/etc/x"] {
            let mut queue = MockDownloadQueue::new();
            queue.expect_enqueue().never();
            let notifier = Arc::new(LogNotifier::new());
            let mut notices = notifier.subscribe();

            let mut package = descriptor("https://x/a.apk");
            package.package_name = name.to_string();
            let result = enqueuer(queue, notifier.clone()).enqueue(&package).await;

            assert!(matches!(result, Err(EnqueueError::UnsafePackageName(_))));
            assert_eq!(notices.recv().await.unwrap().kind, NoticeKind::EnqueueFailed);
        }
    }

    #[test]
    fn test_validate_accepts_http_and_https() {
        assert!(validate_download_url("https://x/a.apk").is_ok());
        assert!(validate_download_url("http://example.com/a.apk").is_ok());
        assert!(validate_download_url("  https://x/a.apk  ").is_ok());
    }

    #[test]
    fn test_validate_rejects_other_schemes() {
        assert!(matches!(
            validate_download_url("ftp://x"),
            Err(EnqueueError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_download_url("file:///etc/passwd"),
            Err(EnqueueError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_and_malformed() {
        assert!(matches!(
            validate_download_url(""),
            Err(EnqueueError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_download_url("   "),
            Err(EnqueueError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_download_url("not a url"),
            Err(EnqueueError::MalformedUrl { .. })
        ));
        assert!(matches!(
            validate_download_url("https://"),
            Err(EnqueueError::MalformedUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_queue() {
        let mut queue = MockDownloadQueue::new();
        queue.expect_enqueue().never();
        let notifier = Arc::new(LogNotifier::new());
        let mut notices = notifier.subscribe();

        let result = enqueuer(queue, notifier.clone())
            .enqueue(&descriptor("ftp://x"))
            .await;

        assert!(matches!(result, Err(EnqueueError::InvalidUrl(_))));
        assert_eq!(notices.recv().await.unwrap().kind, NoticeKind::InvalidUrl);
    }

    #[tokio::test]
    async fn test_enqueue_builds_request() {
        let mut queue = MockDownloadQueue::new();
        queue
            .expect_enqueue()
            .withf(|request| {
                request.url.as_str() == "https://x/a.apk"
                    && request.title == "Downloading A"
                    && request.description == "Version 1.0"
                    && request.destination
                        == PathBuf::from("/var/lib/storefront/downloads/com.a.apk")
                    && request.headers
                        == vec![("User-Agent".to_string(), "Mozilla/5.0".to_string())]
                    && request.network_policy.allow_metered
                    && !request.network_policy.allow_roaming
                    && request.notification_visibility
                        == NotificationVisibility::VisibleNotifyCompleted
            })
            .times(1)
            .returning(|_| Ok(TransferId(7)));
        let notifier = Arc::new(LogNotifier::new());
        let mut notices = notifier.subscribe();

        let id = enqueuer(queue, notifier.clone())
            .enqueue(&descriptor("https://x/a.apk"))
            .await
            .unwrap();

        assert_eq!(id, TransferId(7));
        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.kind, NoticeKind::TransferStarted);
        assert_eq!(notice.title, "Download started: A");
    }

    #[tokio::test]
    async fn test_queue_error_is_reported() {
        let mut queue = MockDownloadQueue::new();
        queue
            .expect_enqueue()
            .returning(|_| Err(QueueError::Unavailable("offline".to_string())));
        let notifier = Arc::new(LogNotifier::new());
        let mut notices = notifier.subscribe();

        let result = enqueuer(queue, notifier.clone())
            .enqueue(&descriptor("https://x/a.apk"))
            .await;

        assert!(matches!(result, Err(EnqueueError::Queue(_))));
        assert_eq!(notices.recv().await.unwrap().kind, NoticeKind::EnqueueFailed);
    }
}
