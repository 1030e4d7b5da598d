// src/bot.rs
//! Discord gateway handler. The watcher tasks are spawned from the first
//! `ready` event so they can share the gateway's HTTP client; `ready` fires
//! again on session resume, hence the started guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serenity::all::{Context, EventHandler, Http, Message, Ready};
use serenity::async_trait;

use crate::config::Config;
use crate::notify::discord::DiscordNotifier;
use crate::platform::instagram::InstagramPoller;
use crate::platform::youtube::YouTubePoller;
use crate::platform::Platform;
use crate::state::StateStore;
use crate::status::StatusRegistry;
use crate::watcher::run_watcher;

pub struct Handler {
    config: Arc<Config>,
    status: Arc<StatusRegistry>,
    watchers_started: AtomicBool,
}

impl Handler {
    pub fn new(config: Arc<Config>, status: Arc<StatusRegistry>) -> Self {
        Self {
            config,
            status,
            watchers_started: AtomicBool::new(false),
        }
    }
}

pub fn spawn_watchers(http: Arc<Http>, config: Arc<Config>, status: Arc<StatusRegistry>) {
    if let Some(yt) = &config.youtube {
        let poller = YouTubePoller::new(yt.api_key.clone(), yt.channel_id.clone());
        let notifier = DiscordNotifier::new(http.clone(), config.discord_channel_id);
        let store = StateStore::new(&config.state_dir, Platform::YouTube);
        tokio::spawn(run_watcher(
            poller,
            notifier,
            store,
            status.clone(),
            config.poll_interval,
        ));
    }

    if let Some(ig) = &config.instagram {
        match InstagramPoller::new(ig.username.clone(), ig.password.clone()) {
            Ok(poller) => {
                let notifier = DiscordNotifier::new(http, config.discord_channel_id);
                let store = StateStore::new(&config.state_dir, Platform::Instagram);
                tokio::spawn(run_watcher(
                    poller,
                    notifier,
                    store,
                    status,
                    config.poll_interval,
                ));
            }
            Err(e) => {
                tracing::error!("instagram watcher not started: {e:#}");
            }
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(user = %ready.user.name, "connected to Discord");

        if self.watchers_started.swap(true, Ordering::SeqCst) {
            return;
        }
        spawn_watchers(ctx.http.clone(), self.config.clone(), self.status.clone());
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let reply = match msg.content.trim() {
            "!ping" => "Pong!".to_string(),
            "!status" => self.status.report(Utc::now()),
            _ => return,
        };

        if let Err(e) = msg.channel_id.say(&ctx.http, reply).await {
            tracing::warn!("command reply failed: {e}");
        }
    }
}
