use crate::domain::OrderId;
use crate::error::RequestError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// How long a new-order notification stays visible
pub const ORDER_DISPLAY_DURATION: Duration = Duration::from_secs(10);
/// How long any other notification stays visible
pub const DEFAULT_DISPLAY_DURATION: Duration = Duration::from_secs(5);

const ERROR_FALLBACK_MESSAGE: &str = "An error occurred";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub order_id: Option<OrderId>,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    pub expires_at: Instant,
}

impl NotificationRecord {
    fn new(order_id: Option<OrderId>, message: String, kind: NotificationKind, display: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            message,
            kind,
            created_at: Utc::now(),
            expires_at: Instant::now() + display,
        }
    }

    pub fn is_active_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-process notification feed.
///
/// Records are kept until dismissed or until their display time runs out, and
/// every new record is also broadcast to subscribers as it is raised.
#[derive(Debug)]
pub struct NotificationCenter {
    records: Mutex<Vec<NotificationRecord>>,
    sender: broadcast::Sender<NotificationRecord>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            records: Mutex::new(Vec::new()),
            sender,
        }
    }

    pub fn notify_order(&self, order_id: OrderId, message: impl Into<String>) -> NotificationRecord {
        self.push(NotificationRecord::new(
            Some(order_id),
            message.into(),
            NotificationKind::Info,
            ORDER_DISPLAY_DURATION,
        ))
    }

    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationRecord {
        self.push(NotificationRecord::new(
            None,
            message.into(),
            kind,
            DEFAULT_DISPLAY_DURATION,
        ))
    }

    pub fn notify_error(&self, error: &RequestError) -> NotificationRecord {
        let message = if error.message.is_empty() {
            ERROR_FALLBACK_MESSAGE.to_string()
        } else {
            error.message.clone()
        };
        self.notify(message, NotificationKind::Error)
    }

    /// Returns false if the record was already gone
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|record| record.id != id);
        records.len() != before
    }

    /// Unexpired records, oldest first
    pub fn active(&self) -> Vec<NotificationRecord> {
        let now = Instant::now();
        let mut records = self.records.lock();
        records.retain(|record| record.is_active_at(now));
        records.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationRecord> {
        self.sender.subscribe()
    }

    fn push(&self, record: NotificationRecord) -> NotificationRecord {
        debug!("Notification {}: {}", record.id, record.message);
        {
            let now = Instant::now();
            let mut records = self.records.lock();
            records.retain(|existing| existing.is_active_at(now));
            records.push(record.clone());
        }
        // nobody listening is fine, the record is still in `active`
        let _ = self.sender.send(record.clone());
        record
    }
}
