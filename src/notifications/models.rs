//! Notification data models

use serde::{Deserialize, Serialize};

/// Kind of user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    TransferStarted,
    TransferCompleted,
    InvalidUrl,
    EnqueueFailed,
    InstallSucceeded,
    InstallFailed,
}

impl NoticeKind {
    /// Returns true for notices that report a problem to the user.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            NoticeKind::InvalidUrl | NoticeKind::EnqueueFailed | NoticeKind::InstallFailed
        )
    }
}

/// A short, user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: Option<String>,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}
