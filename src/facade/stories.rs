//! Story operations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RawError;
use crate::executor::{HandlingOptions, OperationExecutor};
use crate::logging::log_debug;
use crate::retry::RetryOptions;
use crate::state::OperationKey;

/// Largest media file accepted for a story.
pub const MAX_MEDIA_BYTES: usize = 50 * 1024 * 1024;

/// Kind of media a story carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Media kind for an accepted content type, `None` for anything else.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/jpeg" | "image/png" | "image/gif" | "image/webp" => Some(Self::Image),
            "video/mp4" | "video/quicktime" => Some(Self::Video),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: Uuid,
    pub author_id: Uuid,
    pub media_url: String,
    pub media_kind: MediaKind,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A story about to be posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDraft {
    pub author_id: Uuid,
    pub media_url: String,
    pub media_kind: MediaKind,
    pub caption: Option<String>,
}

/// A media file to upload before creating a story.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    /// Reject files the story feature does not accept.
    pub fn validate(&self) -> Result<MediaKind, RawError> {
        let kind = MediaKind::from_content_type(&self.content_type).ok_or_else(|| {
            RawError::new("Invalid file type. Allowed: JPEG, PNG, GIF, WEBP, MP4, MOV")
        })?;
        if self.bytes.len() > MAX_MEDIA_BYTES {
            return Err(RawError::new("Invalid file size. Stories are limited to 50 MB"));
        }
        Ok(kind)
    }
}

/// Data access for stories on the hosted data platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryStore: Send + Sync {
    async fn create_story(&self, draft: StoryDraft) -> Result<Story, RawError>;

    async fn delete_story(&self, story_id: Uuid) -> Result<(), RawError>;

    async fn record_view(&self, story_id: Uuid, viewer_id: Uuid) -> Result<(), RawError>;

    async fn active_stories(&self) -> Result<Vec<Story>, RawError>;

    /// Upload media and return its public URL.
    async fn upload_media(&self, upload: MediaUpload) -> Result<String, RawError>;
}

/// Story feature calls wrapped with loading state, error handling and
/// success notifications.
pub struct StoryOperations<S> {
    store: Arc<S>,
    executor: OperationExecutor,
}

impl<S: StoryStore> StoryOperations<S> {
    pub fn new(store: Arc<S>, executor: OperationExecutor) -> Self {
        Self { store, executor }
    }

    /// Façade bound to the process-wide executor.
    pub fn with_global(store: Arc<S>) -> Self {
        Self::new(store, OperationExecutor::global().clone())
    }

    pub fn executor(&self) -> &OperationExecutor {
        &self.executor
    }

    pub async fn create_story(&self, draft: StoryDraft) -> Option<Story> {
        self.executor
            .execute_with_handling(
                "story.create",
                || self.store.create_story(draft),
                HandlingOptions::new()
                    .success_message("Story posted!")
                    .error_context("Creating story"),
            )
            .await
    }

    /// Validate and upload media, retrying transient failures.
    pub async fn upload_media(&self, upload: MediaUpload) -> Option<String> {
        let key = OperationKey::new("story.upload");
        let options = RetryOptions::with_policy(self.executor.config().retry.clone())
            .operation(key.clone())
            .error_context("Uploading story media");

        self.executor
            .execute_with_handling(
                key,
                || async {
                    upload.validate()?;
                    let url = self
                        .executor
                        .execute_with_retry(|| self.store.upload_media(upload.clone()), options)
                        .await?;
                    Ok::<String, RawError>(url)
                },
                HandlingOptions::new().error_context("Uploading story media"),
            )
            .await
    }

    /// Upload media and post it as a story in one step.
    pub async fn post_with_media(
        &self,
        author_id: Uuid,
        upload: MediaUpload,
        caption: Option<String>,
    ) -> Option<Story> {
        let content_type = upload.content_type.clone();
        let media_url = self.upload_media(upload).await?;
        let media_kind = MediaKind::from_content_type(&content_type)?;
        self.create_story(StoryDraft {
            author_id,
            media_url,
            media_kind,
            caption,
        })
        .await
    }

    pub async fn delete_story(&self, story_id: Uuid) -> bool {
        self.executor
            .execute_with_handling(
                OperationKey::scoped("story.delete", story_id),
                || self.store.delete_story(story_id),
                HandlingOptions::new()
                    .success_message("Story deleted")
                    .error_context("Deleting story"),
            )
            .await
            .is_some()
    }

    /// Record that `viewer_id` saw the story. Silent on success.
    pub async fn mark_viewed(&self, story_id: Uuid, viewer_id: Uuid) -> bool {
        log_debug!(story_id = %story_id, viewer_id = %viewer_id, "Recording story view");
        self.executor
            .execute_with_handling(
                OperationKey::scoped("story.view", story_id),
                || self.store.record_view(story_id, viewer_id),
                HandlingOptions::new().error_context("Recording story view"),
            )
            .await
            .is_some()
    }

    /// Active stories, or an empty list when loading failed.
    pub async fn active_stories(&self) -> Vec<Story> {
        let options = RetryOptions::with_policy(self.executor.config().retry.clone())
            .operation("story.list")
            .error_context("Loading stories");

        self.executor
            .execute_with_handling(
                "story.list",
                || self.executor.execute_with_retry(|| self.store.active_stories(), options),
                HandlingOptions::new().error_context("Loading stories"),
            )
            .await
            .unwrap_or_default()
    }
}
