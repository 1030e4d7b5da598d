pub mod discord;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    WentLive,
    NewVideo,
    NewShort,
    NewPost,
    NewStory,
}

/// Ephemeral: produced by the diff step, delivered immediately, never stored.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: EventKind,
    pub platform: Platform,
    pub title: String,
    pub url: String,
    pub ts: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, ev: &NotificationEvent) -> Result<()>;
}

/// Embed title line, per kind.
pub fn headline(ev: &NotificationEvent) -> &'static str {
    match ev.kind {
        EventKind::WentLive => "🔴 Live now",
        EventKind::NewVideo => "🎬 New video",
        EventKind::NewShort => "🎬 New Short",
        EventKind::NewPost => "📸 New Instagram post",
        EventKind::NewStory => "📸 New Instagram story",
    }
}

/// Embed body: bold title, link, poll time.
pub fn describe(ev: &NotificationEvent) -> String {
    format!(
        "**{}**\n{}\n{}",
        ev.title,
        ev.url,
        ev.ts.format("%Y-%m-%d %H:%M UTC")
    )
}
