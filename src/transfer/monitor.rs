//! Polls the download queue until a transfer reaches a terminal state.
//!
//! Each poll maps the reported status to a [`PollStep`]. Progress and terminal
//! results are delivered as [`TransferEvent`]s over a channel; the attempt
//! ceiling ends monitoring without any event (silent timeout).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::models::*;
use super::queue::DownloadQueue;

/// Event delivered to the owner of a monitored transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Progress(u8),
    Succeeded(ArtifactLocation),
    Failed,
}

/// How a monitoring run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    Succeeded(ArtifactLocation),
    Failed,
    /// Attempt ceiling reached; the transfer may still be running
    TimedOut,
    Cancelled,
}

/// What a single poll decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    Wait,
    Progress(u8),
    Terminal(TransferEvent),
}

impl PollStep {
    pub fn from_status(status: Option<&TransferStatus>) -> Self {
        match status {
            None | Some(TransferStatus::Pending) => PollStep::Wait,
            Some(TransferStatus::Running {
                bytes_downloaded,
                bytes_total,
            }) => match progress_percent(*bytes_downloaded, *bytes_total) {
                Some(percent) => PollStep::Progress(percent),
                None => PollStep::Wait,
            },
            Some(TransferStatus::Succeeded { location }) => {
                PollStep::Terminal(TransferEvent::Succeeded(location.clone()))
            }
            Some(TransferStatus::Failed { .. }) => PollStep::Terminal(TransferEvent::Failed),
        }
    }
}

/// Bounded poller for transfer status.
pub struct TransferMonitor {
    queue: Arc<dyn DownloadQueue>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl TransferMonitor {
    pub fn new(queue: Arc<dyn DownloadQueue>, poll_interval: Duration, max_attempts: u32) -> Self {
        Self {
            queue,
            poll_interval,
            max_attempts,
        }
    }

    /// Poll `id` until it succeeds, fails, the attempt ceiling is hit or
    /// `cancel` fires. Each poll waits one interval first.
    pub async fn monitor(
        &self,
        id: TransferId,
        events: mpsc::UnboundedSender<TransferEvent>,
        cancel: CancellationToken,
    ) -> MonitorOutcome {
        for attempt in 1..=self.max_attempts {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = cancel.cancelled() => {
                    info!("Monitoring of transfer {} cancelled", id);
                    return MonitorOutcome::Cancelled;
                }
            }

            let status = match self.queue.query(id).await {
                Ok(status) => status,
                Err(e) => {
                    warn!("Failed to query transfer {} (attempt {}): {}", id, attempt, e);
                    continue;
                }
            };

            match PollStep::from_status(status.as_ref()) {
                PollStep::Wait => {
                    debug!(
                        "Transfer {} still waiting ({}, attempt {})",
                        id,
                        status.as_ref().map_or("UNKNOWN", TransferStatus::as_str),
                        attempt
                    );
                }
                PollStep::Progress(percent) => {
                    debug!("Transfer {} at {}%", id, percent);
                    send(&events, TransferEvent::Progress(percent));
                }
                PollStep::Terminal(event) => {
                    let outcome = match &event {
                        TransferEvent::Succeeded(location) => {
                            MonitorOutcome::Succeeded(location.clone())
                        }
                        _ => MonitorOutcome::Failed,
                    };
                    info!("Transfer {} finished after {} polls: {:?}", id, attempt, outcome);
                    send(&events, event);
                    return outcome;
                }
            }
        }

        info!(
            "Stopped monitoring transfer {} after {} polls without a terminal status",
            id, self.max_attempts
        );
        MonitorOutcome::TimedOut
    }
}

fn send(events: &mpsc::UnboundedSender<TransferEvent>, event: TransferEvent) {
    if events.send(event).is_err() {
        debug!("Transfer event receiver dropped");
    }
}
