//! Feature façades built on the operation executor.
//!
//! A façade wraps a feature's data-access calls with the executor, choosing
//! operation keys, success messages and which calls are retried. The data
//! access itself sits behind a trait so it can be swapped or mocked.

pub mod stories;

pub use stories::{MediaKind, MediaUpload, Story, StoryDraft, StoryOperations, StoryStore};
