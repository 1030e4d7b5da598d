//! status.rs — in-memory record of the last poll outcome per platform,
//! written by watcher cycles and read by the `!status` command.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::platform::Platform;

#[derive(Debug, Clone)]
pub struct PollRecord {
    pub at: DateTime<Utc>,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug)]
pub struct StatusRegistry {
    started_at: DateTime<Utc>,
    polls: Mutex<HashMap<Platform, PollRecord>>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            polls: Mutex::new(HashMap::new()),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn record_success(&self, platform: Platform, at: DateTime<Utc>, detail: String) {
        self.record(platform, PollRecord { at, ok: true, detail });
    }

    pub fn record_failure(&self, platform: Platform, at: DateTime<Utc>, detail: String) {
        self.record(platform, PollRecord { at, ok: false, detail });
    }

    fn record(&self, platform: Platform, rec: PollRecord) {
        let mut polls = self.polls.lock().expect("status mutex poisoned");
        polls.insert(platform, rec);
    }

    pub fn last_poll(&self, platform: Platform) -> Option<PollRecord> {
        let polls = self.polls.lock().expect("status mutex poisoned");
        polls.get(&platform).cloned()
    }

    /// Multi-line report for the `!status` reply.
    pub fn report(&self, now: DateTime<Utc>) -> String {
        let mut out = format!("Uptime: {}", human_duration(now - self.started_at));

        for platform in [Platform::YouTube, Platform::Instagram] {
            let line = match self.last_poll(platform) {
                Some(rec) => {
                    let ago = human_duration(now - rec.at);
                    if rec.ok {
                        format!("{platform}: ok, last poll {ago} ago ({})", rec.detail)
                    } else {
                        format!("{platform}: failed {ago} ago — {}", rec.detail)
                    }
                }
                None => continue,
            };
            out.push('\n');
            out.push_str(&line);
        }

        if !out.contains('\n') {
            out.push_str("\nNo poll completed yet.");
        }
        out
    }
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Largest two units, e.g. "2d 3h", "3h 12m", "45s".
pub fn human_duration(d: chrono::Duration) -> String {
    let secs = d.num_seconds().max(0);
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let (mins, secs) = (rem / 60, rem % 60);

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
