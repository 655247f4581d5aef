mod commands;
mod config;
mod lookup;
mod platform;
mod reply;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::Dispatcher;
use crate::config::Config;
use crate::lookup::spotify::SpotifyClient;
use crate::lookup::youtube::YoutubeClient;

/// Telegram bot that answers `!music <query>` with YouTube and Spotify links.
#[derive(Parser)]
#[command(name = "songbot", version, about)]
struct Cli {
    /// Path to the TOML (or .json) configuration file.
    #[arg(default_value = "config.toml")]
    config: PathBuf,

    /// Max YouTube results requested per search.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=50))]
    max_results: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,songbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from: {}", cli.config.display());
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    info!("Configuration loaded successfully");
    info!("  Music prefix: {}", config.commands.music_prefix);
    info!("  HTTP timeout: {}s", config.http.timeout_secs);
    info!("  YouTube max results: {}", cli.max_results);

    // Build both lookup clients before accepting any message
    let timeout = config.http.timeout();
    let youtube = YoutubeClient::new(
        &config.youtube_api_key,
        &config.http.youtube_base_url,
        cli.max_results,
        timeout,
    )?;
    let spotify = SpotifyClient::new(
        &config.spotify_client_id,
        &config.spotify_client_secret,
        &config.http.spotify_auth_url,
        &config.http.spotify_api_base_url,
        timeout,
    )?;

    let dispatcher = Arc::new(Dispatcher::new(
        config.commands.clone(),
        Arc::new(youtube),
        Arc::new(spotify),
    ));

    info!("Bot is starting...");
    platform::telegram::run(dispatcher, &config.bot_token).await?;

    Ok(())
}
