//! User-facing notifications

mod models;
mod service;

pub use models::{Notice, NoticeKind};
pub use service::{LogNotifier, Notifier};
