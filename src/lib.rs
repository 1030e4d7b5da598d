// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod bot;
pub mod config;
pub mod diff;
pub mod notify;
pub mod platform;
pub mod state;
pub mod status;
pub mod watcher;

// ---- Re-exports for stable public API ----
pub use crate::config::Config;
pub use crate::diff::diff;
pub use crate::notify::{EventKind, NotificationEvent, Notifier};
pub use crate::platform::types::{ChannelSnapshot, ContentRef, PlatformPoller, PollError};
pub use crate::platform::Platform;
pub use crate::state::{LastSeenState, StateStore};
pub use crate::status::StatusRegistry;
