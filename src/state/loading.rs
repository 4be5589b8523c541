//! Per-operation loading and progress tracking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::events::{EventBus, ResilienceEvent};
use crate::logging::log_debug;

/// Caller-chosen identifier for one logical unit of work.
///
/// Keys are plain strings: two unrelated callers that pick the same key will
/// see each other's loading state. [`OperationKey::scoped`] builds
/// `feature:instance` keys to make such collisions unlikely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationKey(String);

impl OperationKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for one instance of a feature's operation, e.g. `story.delete:42`.
    pub fn scoped(feature: impl AsRef<str>, instance: impl fmt::Display) -> Self {
        Self(format!("{}:{instance}", feature.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for OperationKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl AsRef<str> for OperationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Loading record for an operation that is currently running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingState {
    pub is_loading: bool,
    pub operation: OperationKey,
    /// Percentage in `[0, 100]`
    pub progress: Option<f64>,
}

/// Map from operation key to loading state.
///
/// Absence of a key means "not loading": clearing a key removes it rather
/// than storing `is_loading = false`. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct LoadingStateRegistry {
    states: Arc<Mutex<HashMap<OperationKey, LoadingState>>>,
    events: EventBus,
}

impl LoadingStateRegistry {
    pub fn new(events: EventBus) -> Self {
        Self {
            states: Arc::default(),
            events,
        }
    }

    /// Mark `key` as loading (optionally with progress) or remove it.
    ///
    /// Progress is clamped to `[0, 100]`; NaN is treated as "no progress".
    /// Progress is ignored when `is_loading` is false.
    pub fn set_loading(&self, key: &OperationKey, is_loading: bool, progress: Option<f64>) {
        let state = if is_loading {
            let state = LoadingState {
                is_loading: true,
                operation: key.clone(),
                progress: progress.filter(|p| !p.is_nan()).map(|p| p.clamp(0.0, 100.0)),
            };
            self.states.lock().insert(key.clone(), state.clone());
            Some(state)
        } else {
            if self.states.lock().remove(key).is_none() {
                return;
            }
            None
        };

        log_debug!(
            operation = %key,
            is_loading = is_loading,
            progress = ?state.as_ref().and_then(|s| s.progress),
            "Loading state changed"
        );
        self.events.publish(ResilienceEvent::LoadingChanged {
            key: key.clone(),
            state,
        });
    }

    pub fn is_loading(&self, key: &OperationKey) -> bool {
        self.states
            .lock()
            .get(key)
            .map(|s| s.is_loading)
            .unwrap_or(false)
    }

    pub fn progress(&self, key: &OperationKey) -> Option<f64> {
        self.states.lock().get(key).and_then(|s| s.progress)
    }

    pub fn get(&self, key: &OperationKey) -> Option<LoadingState> {
        self.states.lock().get(key).cloned()
    }

    /// All operations currently loading, ordered by key.
    pub fn snapshot(&self) -> Vec<LoadingState> {
        let mut states: Vec<_> = self.states.lock().values().cloned().collect();
        states.sort_by(|a, b| a.operation.cmp(&b.operation));
        states
    }

    pub fn any_loading(&self) -> bool {
        !self.states.lock().is_empty()
    }
}

/// Restores a key's loading state when dropped.
///
/// Held across the awaited unit of work so the key is released on success,
/// on failure, and when the future is dropped before completion. A guard
/// started on a key that is already loading (a retry nested in an outer
/// operation with the same key) puts the outer state back instead of
/// clearing it.
#[must_use = "loading is released as soon as the guard is dropped"]
pub(crate) struct LoadingGuard {
    registry: LoadingStateRegistry,
    key: OperationKey,
    previous: Option<LoadingState>,
}

impl LoadingGuard {
    pub(crate) fn start(registry: &LoadingStateRegistry, key: &OperationKey) -> Self {
        let previous = registry.get(key);
        registry.set_loading(key, true, None);
        Self {
            registry: registry.clone(),
            key: key.clone(),
            previous,
        }
    }

    pub(crate) fn progress(&self, progress: f64) {
        self.registry.set_loading(&self.key, true, Some(progress));
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(outer) => self.registry.set_loading(&self.key, true, outer.progress),
            None => self.registry.set_loading(&self.key, false, None),
        }
    }
}
