//! Creator Watch — Binary Entrypoint
//! Connects the Discord gateway, then spawns one watcher task per configured
//! platform from the `ready` event.

use std::sync::Arc;

use serenity::all::{Client, GatewayIntents};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use creator_watch::bot::Handler;
use creator_watch::config::Config;
use creator_watch::status::StatusRegistry;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the vars come from the environment.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        youtube = config.youtube.is_some(),
        instagram = config.instagram.is_some(),
        interval_secs = config.poll_interval.as_secs(),
        "starting creator-watch"
    );

    let token = config.discord_token.clone();
    let handler = Handler::new(Arc::new(config), Arc::new(StatusRegistry::new()));

    let intents = GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await?;

    client.start().await?;
    Ok(())
}
