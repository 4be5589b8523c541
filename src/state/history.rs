//! Bounded history of recent classified errors.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::error::AppError;

/// FIFO of the most recent errors, for diagnostics views only.
///
/// Recording past capacity evicts the oldest entries. Clones share the
/// same buffer.
#[derive(Debug, Clone)]
pub struct ErrorHistoryBuffer {
    entries: Arc<Mutex<VecDeque<AppError>>>,
    capacity: usize,
}

impl Default for ErrorHistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ErrorHistoryBuffer {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&self, error: AppError) {
        let mut entries = self.entries.lock();
        entries.push_back(error);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Copy of the history, oldest first (the most recent error is last).
    pub fn snapshot(&self) -> Vec<AppError> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<AppError> {
        self.entries.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
