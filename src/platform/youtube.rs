// src/platform/youtube.rs
//! YouTube Data API v3 poller. Three calls per cycle: a live search, a
//! latest-upload search, and a contentDetails lookup used to classify the
//! latest upload as a Short.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use serde::Deserialize;

use super::types::{ChannelSnapshot, ContentRef, PlatformPoller, PollError};
use super::Platform;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Uploads at or under this duration count as Shorts.
const SHORT_MAX_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    #[serde(rename = "contentDetails")]
    content_details: VideoContentDetails,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: String,
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

pub fn shorts_url(video_id: &str) -> String {
    format!("https://www.youtube.com/shorts/{video_id}")
}

/// Search titles arrive HTML-escaped ("Q&amp;A").
fn decode_title(raw: &str) -> String {
    html_escape::decode_html_entities(raw).to_string()
}

fn first_video(body: &str, what: &str) -> Result<Option<ContentRef>> {
    let resp: SearchResponse =
        serde_json::from_str(body).with_context(|| format!("parsing {what} search response"))?;

    for item in resp.items {
        if let Some(id) = item.id.video_id {
            return Ok(Some(ContentRef {
                url: watch_url(&id),
                title: decode_title(&item.snippet.title),
                id,
            }));
        }
    }
    Ok(None)
}

/// Zero items means the channel is not live right now.
pub fn parse_live_search(body: &str) -> Result<Option<ContentRef>> {
    first_video(body, "live")
}

pub fn parse_latest_upload(body: &str) -> Result<Option<ContentRef>> {
    first_video(body, "latest-upload")
}

/// Duration of the first listed video in seconds, if any.
pub fn parse_video_duration(body: &str) -> Result<Option<u64>> {
    let resp: VideoListResponse =
        serde_json::from_str(body).context("parsing video list response")?;

    match resp.items.first() {
        Some(item) => {
            let raw = &item.content_details.duration;
            parse_iso8601_duration_secs(raw)
                .map(Some)
                .ok_or_else(|| anyhow!("unrecognized ISO-8601 duration {raw:?}"))
        }
        None => Ok(None),
    }
}

/// Parses the `PT#H#M#S` subset the Data API uses for video durations.
pub fn parse_iso8601_duration_secs(s: &str) -> Option<u64> {
    static RE: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        regex::Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").unwrap()
    });

    let caps = re.captures(s)?;
    if caps.get(1).is_none() && caps.get(2).is_none() && caps.get(3).is_none() {
        return None;
    }
    let part = |i: usize| {
        caps.get(i)
            .map(|m| m.as_str().parse::<u64>().unwrap_or(0))
            .unwrap_or(0)
    };
    Some(part(1) * 3600 + part(2) * 60 + part(3))
}

pub struct YouTubePoller {
    client: reqwest::Client,
    api_key: String,
    channel_id: String,
}

impl YouTubePoller {
    pub fn new(api_key: String, channel_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            channel_id,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String, PollError> {
        let url = format!("{API_BASE}/{path}");
        let resp = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| PollError::Unavailable(anyhow!(e).context(format!("GET {path}"))))?;

        let status = resp.status();
        // The Data API signals quota exhaustion with 403; 429 is the generic
        // throttle status.
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PollError::RateLimited);
        }
        if !status.is_success() {
            return Err(PollError::Unavailable(anyhow!(
                "youtube {path} returned HTTP {status}"
            )));
        }

        resp.text()
            .await
            .map_err(|e| PollError::Unavailable(anyhow!(e).context(format!("read {path} body"))))
    }

    async fn fetch_live(&self) -> Result<Option<ContentRef>, PollError> {
        let body = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("channelId", &self.channel_id),
                    ("eventType", "live"),
                    ("type", "video"),
                    ("maxResults", "1"),
                ],
            )
            .await?;
        parse_live_search(&body).map_err(PollError::Unavailable)
    }

    async fn fetch_latest_upload(&self) -> Result<Option<ContentRef>, PollError> {
        let body = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("channelId", &self.channel_id),
                    ("order", "date"),
                    ("type", "video"),
                    ("maxResults", "1"),
                ],
            )
            .await?;
        parse_latest_upload(&body).map_err(PollError::Unavailable)
    }

    async fn classify_short(&self, video_id: &str) -> Result<bool, PollError> {
        let body = self
            .get("videos", &[("part", "contentDetails"), ("id", video_id)])
            .await?;
        let secs = parse_video_duration(&body).map_err(PollError::Unavailable)?;
        Ok(secs.is_some_and(|s| s <= SHORT_MAX_SECS))
    }
}

#[async_trait]
impl PlatformPoller for YouTubePoller {
    async fn poll(&self) -> Result<ChannelSnapshot, PollError> {
        let live = self.fetch_live().await?;

        let mut latest_upload = self.fetch_latest_upload().await?;
        let mut is_short = false;
        if let Some(upload) = latest_upload.as_mut() {
            is_short = self.classify_short(&upload.id).await?;
            if is_short {
                upload.url = shorts_url(&upload.id);
            }
        }

        Ok(ChannelSnapshot {
            is_live: live.is_some(),
            live,
            latest_upload,
            latest_upload_is_short: is_short,
            latest_post: None,
            latest_story: None,
        })
    }

    fn platform(&self) -> Platform {
        Platform::YouTube
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_parsing() {
        assert_eq!(parse_iso8601_duration_secs("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration_secs("PT1M"), Some(60));
        assert_eq!(parse_iso8601_duration_secs("PT4M13S"), Some(253));
        assert_eq!(parse_iso8601_duration_secs("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso8601_duration_secs(""), None);
        assert_eq!(parse_iso8601_duration_secs("PT"), None);
        assert_eq!(parse_iso8601_duration_secs("P1D"), None);
    }

    #[test]
    fn short_threshold_is_sixty_seconds() {
        assert!(SHORT_MAX_SECS == 60);
        assert!(parse_iso8601_duration_secs("PT60S").unwrap() <= SHORT_MAX_SECS);
        assert!(parse_iso8601_duration_secs("PT61S").unwrap() > SHORT_MAX_SECS);
    }
}
