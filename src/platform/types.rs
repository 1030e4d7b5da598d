// src/platform/types.rs
use thiserror::Error;

use super::Platform;

/// One piece of content as it will be shown to the user. Instagram captions
/// double as titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRef {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// The freshly fetched state of a tracked channel at one poll instant.
/// Produced by a poller, consumed by the diff step, never persisted.
#[derive(Debug, Clone, Default)]
pub struct ChannelSnapshot {
    pub is_live: bool,
    pub live: Option<ContentRef>,
    pub latest_upload: Option<ContentRef>,
    pub latest_upload_is_short: bool,
    pub latest_post: Option<ContentRef>,
    pub latest_story: Option<ContentRef>,
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("platform unavailable: {0:#}")]
    Unavailable(anyhow::Error),
    #[error("rate limited by upstream API")]
    RateLimited,
}

#[async_trait::async_trait]
pub trait PlatformPoller: Send + Sync {
    async fn poll(&self) -> Result<ChannelSnapshot, PollError>;
    fn platform(&self) -> Platform;
}
