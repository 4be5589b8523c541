//! Slot holding the most recent classified error.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::AppError;
use crate::events::{EventBus, ResilienceEvent};

/// Single optional error exposed for display.
///
/// Each new error overwrites the previous one; earlier failures remain
/// visible only through the history buffer.
#[derive(Debug, Clone, Default)]
pub struct CurrentErrorSlot {
    current: Arc<Mutex<Option<AppError>>>,
    events: EventBus,
}

impl CurrentErrorSlot {
    pub fn new(events: EventBus) -> Self {
        Self {
            current: Arc::default(),
            events,
        }
    }

    pub fn set(&self, error: AppError) {
        *self.current.lock() = Some(error.clone());
        self.events.publish(ResilienceEvent::ErrorRaised(error));
    }

    /// Empty the slot. Publishes only if an error was present.
    pub fn clear(&self) {
        if self.current.lock().take().is_some() {
            self.events.publish(ResilienceEvent::ErrorCleared);
        }
    }

    pub fn get(&self) -> Option<AppError> {
        self.current.lock().clone()
    }
}
