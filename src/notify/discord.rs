use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serenity::all::{ChannelId, Colour, CreateEmbed, CreateMessage, Http};

use super::{describe, headline, NotificationEvent, Notifier};
use crate::platform::Platform;

pub struct DiscordNotifier {
    http: Arc<Http>,
    channel: ChannelId,
    max_retries: u8,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>, channel_id: u64) -> Self {
        Self {
            http,
            channel: ChannelId::new(channel_id),
            max_retries: 3,
        }
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    fn build_message(ev: &NotificationEvent) -> CreateMessage {
        let colour = match ev.platform {
            Platform::YouTube => Colour::from_rgb(0xFF, 0x00, 0x00),
            Platform::Instagram => Colour::from_rgb(0xE1, 0x30, 0x6C),
        };

        let embed = CreateEmbed::new()
            .title(headline(ev))
            .description(describe(ev))
            .url(ev.url.clone())
            .colour(colour);

        CreateMessage::new().embed(embed)
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            match self
                .channel
                .send_message(&self.http, Self::build_message(ev))
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                            .await;
                        continue;
                    }
                    return Err(anyhow!("discord send failed: {e}"));
                }
            }
        }
    }
}
