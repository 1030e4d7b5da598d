// src/platform/instagram.rs
//! Instagram poller backed by the private web API. Authentication lives in an
//! explicit `Session`: login acquires the csrf/sessionid cookies, and an
//! expired session is renewed once per request before giving up.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use super::types::{ChannelSnapshot, ContentRef, PlatformPoller, PollError};
use super::Platform;

const LOGIN_PAGE_URL: &str = "https://www.instagram.com/accounts/login/";
const LOGIN_AJAX_URL: &str = "https://www.instagram.com/accounts/login/ajax/";
const API_BASE: &str = "https://i.instagram.com/api/v1";

// Web client identity the private API expects on every call.
const IG_APP_ID: &str = "936619743392459";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    authenticated: bool,
}

#[derive(Debug, Deserialize)]
struct WebProfileResponse {
    data: WebProfileData,
}

#[derive(Debug, Deserialize)]
struct WebProfileData {
    user: Option<ProfileUser>,
}

#[derive(Debug, Deserialize)]
struct ProfileUser {
    id: String,
    edge_owner_to_timeline_media: MediaConnection,
}

#[derive(Debug, Deserialize)]
struct MediaConnection {
    #[serde(default)]
    edges: Vec<MediaEdge>,
}

#[derive(Debug, Deserialize)]
struct MediaEdge {
    node: MediaNode,
}

#[derive(Debug, Deserialize)]
struct MediaNode {
    id: String,
    shortcode: String,
    #[serde(default)]
    edge_media_to_caption: CaptionConnection,
}

#[derive(Debug, Default, Deserialize)]
struct CaptionConnection {
    #[serde(default)]
    edges: Vec<CaptionEdge>,
}

#[derive(Debug, Deserialize)]
struct CaptionEdge {
    node: CaptionNode,
}

#[derive(Debug, Deserialize)]
struct CaptionNode {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ReelsResponse {
    #[serde(default)]
    reels_media: Vec<Reel>,
}

#[derive(Debug, Deserialize)]
struct Reel {
    #[serde(default)]
    items: Vec<ReelItem>,
}

#[derive(Debug, Deserialize)]
struct ReelItem {
    id: String,
}

pub fn post_url(shortcode: &str) -> String {
    format!("https://www.instagram.com/p/{shortcode}/")
}

pub fn story_url(username: &str, story_id: &str) -> String {
    format!("https://www.instagram.com/stories/{username}/{story_id}/")
}

/// User id plus the newest timeline post, from one web_profile_info payload.
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub user_id: String,
    pub latest_post: Option<ContentRef>,
}

pub fn parse_profile(body: &str, username: &str) -> Result<ProfileFeed> {
    let resp: WebProfileResponse =
        serde_json::from_str(body).context("parsing web profile response")?;
    let user = resp
        .data
        .user
        .ok_or_else(|| anyhow!("profile payload for {username} has no user object"))?;

    let latest_post = user
        .edge_owner_to_timeline_media
        .edges
        .into_iter()
        .next()
        .map(|edge| {
            let caption = edge
                .node
                .edge_media_to_caption
                .edges
                .into_iter()
                .next()
                .map(|c| c.node.text);
            ContentRef {
                url: post_url(&edge.node.shortcode),
                title: caption.unwrap_or_else(|| format!("@{username}")),
                id: edge.node.id,
            }
        });

    Ok(ProfileFeed {
        user_id: user.id,
        latest_post,
    })
}

/// Story item ids come as `{pk}_{user_id}`; the pk part is the public id.
pub fn parse_latest_story(body: &str, username: &str) -> Result<Option<ContentRef>> {
    let resp: ReelsResponse = serde_json::from_str(body).context("parsing reels response")?;

    let Some(item) = resp
        .reels_media
        .into_iter()
        .next()
        .and_then(|reel| reel.items.into_iter().next())
    else {
        return Ok(None);
    };

    let pk = item.id.split('_').next().unwrap_or(&item.id).to_string();
    Ok(Some(ContentRef {
        url: story_url(username, &pk),
        title: format!("@{username}"),
        id: pk,
    }))
}

/// Authenticated connection to the web API. The sessionid cookie lives in the
/// client's jar; `ensure` logs in lazily and `renew` forces a fresh login
/// after an expiry response.
pub struct Session {
    client: reqwest::Client,
    jar: Arc<Jar>,
    username: String,
    password: String,
    authenticated: tokio::sync::Mutex<bool>,
}

impl Session {
    pub fn new(username: String, password: String) -> Result<Self> {
        let jar = Arc::new(Jar::default());

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
        headers.insert("X-IG-App-ID", HeaderValue::from_static(IG_APP_ID));

        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .default_headers(headers)
            .build()
            .context("building instagram http client")?;

        Ok(Self {
            client,
            jar,
            username,
            password,
            authenticated: tokio::sync::Mutex::new(false),
        })
    }

    fn csrf_token(&self) -> Option<String> {
        let url = Url::parse("https://www.instagram.com").ok()?;
        let cookies = self.jar.cookies(&url)?;
        let cookies = cookies.to_str().ok()?.to_string();
        cookies.split(';').find_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            (name == "csrftoken").then(|| value.to_string())
        })
    }

    async fn login(&self) -> Result<()> {
        // Loading the login page seeds the csrftoken cookie.
        self.client
            .get(LOGIN_PAGE_URL)
            .send()
            .await
            .context("loading login page")?
            .error_for_status()
            .context("login page status")?;

        let csrf = self
            .csrf_token()
            .ok_or_else(|| anyhow!("no csrftoken cookie after loading login page"))?;

        let enc_password = format!(
            "#PWD_INSTAGRAM_BROWSER:0:{}:{}",
            Utc::now().timestamp(),
            self.password
        );

        let resp = self
            .client
            .post(LOGIN_AJAX_URL)
            .header("X-CSRFToken", csrf)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Referer", LOGIN_PAGE_URL)
            .form(&[
                ("username", self.username.as_str()),
                ("enc_password", enc_password.as_str()),
                ("queryParams", "{}"),
                ("optIntoOneTap", "false"),
            ])
            .send()
            .await
            .context("posting login form")?;

        let status = resp.status();
        let body = resp.text().await.context("reading login response")?;
        let parsed: LoginResponse = serde_json::from_str(&body)
            .with_context(|| format!("parsing login response (HTTP {status})"))?;

        if !parsed.authenticated {
            bail!("instagram rejected the login for {}", self.username);
        }

        tracing::info!(username = %self.username, "instagram session established");
        Ok(())
    }

    /// Log in once; subsequent calls are no-ops until `renew`.
    pub async fn ensure(&self) -> Result<()> {
        let mut authed = self.authenticated.lock().await;
        if !*authed {
            self.login().await?;
            *authed = true;
        }
        Ok(())
    }

    /// Drop the cached session and log in again.
    pub async fn renew(&self) -> Result<()> {
        let mut authed = self.authenticated.lock().await;
        *authed = false;
        self.login().await?;
        *authed = true;
        Ok(())
    }

    async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(url).send().await
    }
}

pub struct InstagramPoller {
    session: Session,
    username: String,
}

impl InstagramPoller {
    pub fn new(username: String, password: String) -> Result<Self> {
        Ok(Self {
            session: Session::new(username.clone(), password)?,
            username,
        })
    }

    fn web_profile_url(&self) -> String {
        format!("{API_BASE}/users/web_profile_info/?username={}", self.username)
    }

    fn reels_url(user_id: &str) -> String {
        format!("{API_BASE}/feed/reels_media/?reel_ids={user_id}")
    }

    /// GET with one transparent session renewal on an expiry status.
    async fn get_json(&self, url: &str) -> Result<String, PollError> {
        self.session.ensure().await.map_err(PollError::Unavailable)?;

        let mut resp = self
            .session
            .get(url)
            .await
            .map_err(|e| PollError::Unavailable(anyhow!(e).context("instagram request")))?;

        if matches!(
            resp.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::info!("instagram session expired, renewing");
            self.session.renew().await.map_err(PollError::Unavailable)?;
            resp = self
                .session
                .get(url)
                .await
                .map_err(|e| PollError::Unavailable(anyhow!(e).context("instagram retry")))?;
        }

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PollError::RateLimited);
        }
        if !status.is_success() {
            return Err(PollError::Unavailable(anyhow!(
                "instagram returned HTTP {status}"
            )));
        }

        resp.text()
            .await
            .map_err(|e| PollError::Unavailable(anyhow!(e).context("reading instagram body")))
    }
}

#[async_trait]
impl PlatformPoller for InstagramPoller {
    async fn poll(&self) -> Result<ChannelSnapshot, PollError> {
        let profile_body = self.get_json(&self.web_profile_url()).await?;
        let feed =
            parse_profile(&profile_body, &self.username).map_err(PollError::Unavailable)?;

        let story_body = self.get_json(&Self::reels_url(&feed.user_id)).await?;
        let latest_story =
            parse_latest_story(&story_body, &self.username).map_err(PollError::Unavailable)?;

        Ok(ChannelSnapshot {
            is_live: false,
            live: None,
            latest_upload: None,
            latest_upload_is_short: false,
            latest_post: feed.latest_post,
            latest_story,
        })
    }

    fn platform(&self) -> Platform {
        Platform::Instagram
    }
}
