//! Shared state mutated by the operation executor.
//!
//! ## Organization
//! - `loading` - Per-operation loading and progress
//! - `notifications` - Self-expiring success notifications
//! - `history` - Bounded history of recent errors
//! - `error_slot` - The current error shown to the user
//!
//! Every container is a cheap, cloneable handle over shared state. Locks are
//! never held across an `.await`, so each mutation is a single atomic step.

pub mod error_slot;
pub mod history;
pub mod loading;
pub mod notifications;

pub use error_slot::CurrentErrorSlot;
pub use history::ErrorHistoryBuffer;
pub use loading::{LoadingState, LoadingStateRegistry, OperationKey};
pub use notifications::{NotificationQueue, SuccessNotification};
