// src/state.rs
// Durable record of what has already been notified, one JSON file per
// platform. Reads are tolerant: an absent or corrupt file means no prior
// state, which the diff step treats as a cold start.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::platform::types::ChannelSnapshot;
use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LastSeenState {
    pub live_session_id: Option<String>,
    pub latest_upload_id: Option<String>,
    pub latest_post_id: Option<String>,
    pub latest_story_id: Option<String>,
}

impl LastSeenState {
    /// Seed from the first snapshot without emitting anything.
    pub fn seed(snapshot: &ChannelSnapshot) -> Self {
        Self {
            live_session_id: snapshot.live.as_ref().map(|c| c.id.clone()),
            latest_upload_id: snapshot.latest_upload.as_ref().map(|c| c.id.clone()),
            latest_post_id: snapshot.latest_post.as_ref().map(|c| c.id.clone()),
            latest_story_id: snapshot.latest_story.as_ref().map(|c| c.id.clone()),
        }
    }
}

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(dir: &Path, platform: Platform) -> Self {
        Self {
            path: dir.join(format!("{}.json", platform.slug())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Option<LastSeenState> {
        match fs::read_to_string(&self.path).await {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(state) => Some(state),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), "ignoring corrupt state file: {e}");
                    None
                }
            },
            Err(_) => None,
        }
    }

    /// Persist errors are logged, not propagated: a failed write costs at
    /// worst a duplicate notification after a restart.
    pub async fn save(&self, state: &LastSeenState) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                tracing::warn!("state dir: {e:#}");
            }
        }
        let body = serde_json::to_vec_pretty(state).unwrap_or_default();
        if let Err(e) = fs::write(&self.path, body).await {
            tracing::warn!(path = %self.path.display(), "write state: {e:#}");
        }
    }
}
