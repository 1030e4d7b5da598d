// src/diff.rs
//! Compares a fresh snapshot against the last-seen state. Pure and
//! deterministic; the caller injects state and clock, so everything here is
//! testable without timers or network.

use chrono::{DateTime, Utc};

use crate::notify::{EventKind, NotificationEvent};
use crate::platform::types::{ChannelSnapshot, ContentRef};
use crate::platform::Platform;
use crate::state::LastSeenState;

/// Policy:
/// - no prior state seeds silently (no notification storm on first deploy);
/// - a live snapshot emits `WentLive` once per distinct session id, and the
///   stored id is never cleared when the stream ends;
/// - upload/post/story are single-slot: a changed id emits one event for the
///   newest item, skipped intermediates are not backfilled;
/// - an empty snapshot slot leaves the stored id untouched.
pub fn diff(
    previous: Option<&LastSeenState>,
    snapshot: &ChannelSnapshot,
    platform: Platform,
    now: DateTime<Utc>,
) -> (Vec<NotificationEvent>, LastSeenState) {
    let Some(previous) = previous else {
        return (Vec::new(), LastSeenState::seed(snapshot));
    };

    let mut events = Vec::new();
    let mut next = previous.clone();

    let make = |kind: EventKind, content: &ContentRef| NotificationEvent {
        kind,
        platform,
        title: content.title.clone(),
        url: content.url.clone(),
        ts: now,
    };

    if snapshot.is_live {
        if let Some(live) = &snapshot.live {
            if next.live_session_id.as_deref() != Some(live.id.as_str()) {
                events.push(make(EventKind::WentLive, live));
                next.live_session_id = Some(live.id.clone());
            }
        }
    }

    if let Some(upload) = &snapshot.latest_upload {
        if next.latest_upload_id.as_deref() != Some(upload.id.as_str()) {
            let kind = if snapshot.latest_upload_is_short {
                EventKind::NewShort
            } else {
                EventKind::NewVideo
            };
            events.push(make(kind, upload));
            next.latest_upload_id = Some(upload.id.clone());
        }
    }

    if let Some(post) = &snapshot.latest_post {
        if next.latest_post_id.as_deref() != Some(post.id.as_str()) {
            events.push(make(EventKind::NewPost, post));
            next.latest_post_id = Some(post.id.clone());
        }
    }

    if let Some(story) = &snapshot.latest_story {
        if next.latest_story_id.as_deref() != Some(story.id.as_str()) {
            events.push(make(EventKind::NewStory, story));
            next.latest_story_id = Some(story.id.clone());
        }
    }

    (events, next)
}
