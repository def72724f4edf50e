//! Notification delivery.
//!
//! Notices are logged and broadcast to any front-end that subscribed.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::models::Notice;

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that logs each notice and broadcasts it to subscribers.
pub struct LogNotifier {
    tx: broadcast::Sender<Notice>,
}

impl LogNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Subscribe to notices emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        let body = notice.body.as_deref().unwrap_or("");
        if notice.kind.is_error() {
            warn!("[notice] {} {}", notice.title, body);
        } else {
            info!("[notice] {} {}", notice.title, body);
        }

        if self.tx.send(notice).is_err() {
            debug!("No subscribers for notice");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NoticeKind;

    #[test]
    fn test_notify_without_subscribers() {
        let notifier = LogNotifier::new();
        notifier.notify(Notice::new(NoticeKind::TransferStarted, "Download started: A"));
    }

    #[tokio::test]
    async fn test_subscribers_receive_notices() {
        let notifier = LogNotifier::new();
        let mut rx1 = notifier.subscribe();
        let mut rx2 = notifier.subscribe();

        notifier.notify(Notice::new(NoticeKind::InvalidUrl, "Invalid download URL"));

        assert_eq!(rx1.recv().await.unwrap().kind, NoticeKind::InvalidUrl);
        assert_eq!(rx2.recv().await.unwrap().kind, NoticeKind::InvalidUrl);
    }
}
