//! Self-expiring success notifications.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::DEFAULT_NOTIFICATION_TTL;
use crate::events::{EventBus, ResilienceEvent};
use crate::logging::log_debug;

/// A transient message shown after an operation succeeds.
///
/// Equality is structural over all fields: two notifications with the same
/// message, action and timestamp are interchangeable for [`NotificationQueue::dismiss`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessNotification {
    pub message: String,
    /// Optional action label, e.g. "View"
    pub action: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
struct Entry {
    seq: u64,
    deadline: Instant,
    notification: SuccessNotification,
}

#[derive(Debug, Default)]
struct Entries {
    next_seq: u64,
    items: Vec<Entry>,
}

/// Ordered list of success notifications, oldest first.
///
/// Each entry is removed by an explicit [`dismiss`](Self::dismiss) or
/// automatically once the TTL has elapsed, whichever comes first. Every
/// entry carries its deadline, and reads drop entries past it, so expiry
/// holds even when the runtime that showed a notification has shut down.
/// Clones share the same list.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    entries: Arc<Mutex<Entries>>,
    ttl: Duration,
    events: EventBus,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL, EventBus::default())
    }
}

impl NotificationQueue {
    pub fn new(ttl: Duration, events: EventBus) -> Self {
        Self {
            entries: Arc::default(),
            ttl,
            events,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Append a notification and schedule its expiry.
    ///
    /// On a tokio runtime a timer also removes the entry at its deadline so
    /// subscribers are told without polling.
    pub fn show(&self, message: impl Into<String>, action: Option<String>) -> SuccessNotification {
        let notification = SuccessNotification {
            message: message.into(),
            action,
            timestamp: Utc::now(),
        };

        let seq = {
            let mut entries = self.entries.lock();
            let seq = entries.next_seq;
            entries.next_seq += 1;
            entries.items.push(Entry {
                seq,
                deadline: Instant::now() + self.ttl,
                notification: notification.clone(),
            });
            seq
        };

        log_debug!(
            message = %notification.message,
            ttl_ms = self.ttl.as_millis(),
            "Showing success notification"
        );
        self.events
            .publish(ResilienceEvent::NotificationShown(notification.clone()));
        self.schedule_expiry(seq);

        notification
    }

    fn schedule_expiry(&self, seq: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log_debug!(
                ttl_ms = self.ttl.as_millis(),
                "No async runtime available, notification expires on next read"
            );
            return;
        };

        let queue = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(queue.ttl).await;
            queue.expire(seq);
        });
    }

    fn expire(&self, seq: u64) {
        let removed = {
            let mut entries = self.entries.lock();
            let index = entries.items.iter().position(|entry| entry.seq == seq);
            index.map(|index| entries.items.remove(index).notification)
        };

        if let Some(notification) = removed {
            log_debug!(message = %notification.message, "Notification expired");
            self.events
                .publish(ResilienceEvent::NotificationRemoved(notification));
        }
    }

    /// Drop every entry whose deadline has passed.
    fn prune_expired(&self) {
        let now = Instant::now();
        let expired: Vec<SuccessNotification> = {
            let mut entries = self.entries.lock();
            if entries.items.iter().all(|entry| entry.deadline > now) {
                return;
            }
            let (expired, live): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut entries.items)
                .into_iter()
                .partition(|entry| entry.deadline <= now);
            entries.items = live;
            expired.into_iter().map(|entry| entry.notification).collect()
        };

        for notification in expired {
            log_debug!(message = %notification.message, "Notification expired");
            self.events
                .publish(ResilienceEvent::NotificationRemoved(notification));
        }
    }

    /// Remove the first notification structurally equal to `notification`.
    ///
    /// Returns whether anything was removed. Dismissing an entry that has
    /// already expired is a no-op.
    pub fn dismiss(&self, notification: &SuccessNotification) -> bool {
        self.prune_expired();
        let removed = {
            let mut entries = self.entries.lock();
            let index = entries
                .items
                .iter()
                .position(|entry| entry.notification == *notification);
            index.map(|index| entries.items.remove(index).notification)
        };

        match removed {
            Some(notification) => {
                self.events
                    .publish(ResilienceEvent::NotificationRemoved(notification));
                true
            }
            None => false,
        }
    }

    /// Snapshot of the current notifications, oldest first.
    pub fn list(&self) -> Vec<SuccessNotification> {
        self.prune_expired();
        self.entries
            .lock()
            .items
            .iter()
            .map(|entry| entry.notification.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.prune_expired();
        self.entries.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
