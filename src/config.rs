// src/config.rs
// Startup configuration, read once from the environment. Any error here is
// fatal: the process prints the diagnostic and exits before connecting.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 900;
const DEFAULT_STATE_DIR: &str = "state";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("{set} is set but {missing} is not; configure both or neither")]
    HalfConfigured {
        set: &'static str,
        missing: &'static str,
    },
    #[error(
        "no platform configured: set YOUTUBE_API_KEY + YOUTUBE_CHANNEL_ID \
         and/or INSTAGRAM_USERNAME + INSTAGRAM_PASSWORD"
    )]
    NoPlatforms,
}

#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub api_key: String,
    pub channel_id: String,
}

#[derive(Debug, Clone)]
pub struct InstagramConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub discord_channel_id: u64,
    pub youtube: Option<YouTubeConfig>,
    pub instagram: Option<InstagramConfig>,
    pub poll_interval: Duration,
    pub state_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let discord_token = require("DISCORD_TOKEN")?;

        let raw_channel = require("DISCORD_CHANNEL_ID")?;
        let discord_channel_id: u64 = raw_channel.parse().map_err(|_| ConfigError::Invalid {
            var: "DISCORD_CHANNEL_ID",
            reason: format!("expected a numeric channel id, got {raw_channel:?}"),
        })?;
        if discord_channel_id == 0 {
            return Err(ConfigError::Invalid {
                var: "DISCORD_CHANNEL_ID",
                reason: "channel id must be non-zero".into(),
            });
        }

        let youtube = pair("YOUTUBE_API_KEY", "YOUTUBE_CHANNEL_ID")?.map(
            |(api_key, channel_id)| YouTubeConfig {
                api_key,
                channel_id,
            },
        );
        let instagram = pair("INSTAGRAM_USERNAME", "INSTAGRAM_PASSWORD")?.map(
            |(username, password)| InstagramConfig { username, password },
        );

        if youtube.is_none() && instagram.is_none() {
            return Err(ConfigError::NoPlatforms);
        }

        let poll_interval = match optional("POLL_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "POLL_INTERVAL_SECS",
                    reason: format!("expected seconds as an integer, got {raw:?}"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "POLL_INTERVAL_SECS",
                        reason: "interval must be at least 1 second".into(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        };

        let state_dir = optional("STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));

        Ok(Self {
            discord_token,
            discord_channel_id,
            youtube,
            instagram,
            poll_interval,
            state_dir,
        })
    }
}

/// Empty and whitespace-only values count as unset.
fn optional(name: &'static str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

/// A platform is configured by a pair of vars; setting only one is an error
/// rather than a silently disabled platform.
fn pair(
    a: &'static str,
    b: &'static str,
) -> Result<Option<(String, String)>, ConfigError> {
    match (optional(a), optional(b)) {
        (Some(x), Some(y)) => Ok(Some((x, y))),
        (Some(_), None) => Err(ConfigError::HalfConfigured { set: a, missing: b }),
        (None, Some(_)) => Err(ConfigError::HalfConfigured { set: b, missing: a }),
        (None, None) => Ok(None),
    }
}
