//! State-change events for the presentation layer.
//!
//! The executor's shared state (loading map, notifications, current error)
//! is observable through a broadcast channel instead of a UI-specific
//! reactive primitive. Any number of subscribers may listen; a subscriber
//! that falls behind by more than the buffer size sees
//! `RecvError::Lagged` and should re-read the state snapshots.
//!
//! # Usage
//!
//! ```rust,no_run
//! use resilient_ops::{OperationExecutor, ResilienceEvent};
//!
//! # async fn example() {
//! let executor = OperationExecutor::with_defaults();
//! let mut events = executor.subscribe();
//!
//! while let Ok(event) = events.recv().await {
//!     if let ResilienceEvent::ErrorRaised(err) = event {
//!         println!("{}", err.user_message());
//!     }
//! }
//! # }
//! ```

use tokio::sync::broadcast;

use crate::error::AppError;
use crate::logging::log_trace;
use crate::state::loading::{LoadingState, OperationKey};
use crate::state::notifications::SuccessNotification;

/// A change to the executor's shared state.
#[derive(Debug, Clone, PartialEq)]
pub enum ResilienceEvent {
    /// Loading state for a key changed; `None` means the key stopped loading.
    LoadingChanged {
        key: OperationKey,
        state: Option<LoadingState>,
    },
    /// A success notification was added.
    NotificationShown(SuccessNotification),
    /// A success notification was dismissed or expired.
    NotificationRemoved(SuccessNotification),
    /// A classified error became the current error.
    ErrorRaised(AppError),
    /// The current error slot was emptied.
    ErrorCleared,
}

impl ResilienceEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::LoadingChanged { .. } => "loading_changed",
            Self::NotificationShown(_) => "notification_shown",
            Self::NotificationRemoved(_) => "notification_removed",
            Self::ErrorRaised(_) => "error_raised",
            Self::ErrorCleared => "error_cleared",
        }
    }
}

/// Cloneable publisher shared by every state container of one executor.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ResilienceEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: ResilienceEvent) {
        let kind = event.kind();
        let delivered = self.sender.send(event).unwrap_or(0);
        log_trace!(event = kind, subscribers = delivered, "Published state event");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ResilienceEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EVENT_BUFFER)
    }
}
