//! Trophynote: syncs a Steam library and its achievement progress into a
//! Notion database, one row per game.

mod config;
mod notion_api;
mod steam_api;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::notion_api::NotionClient;
use crate::steam_api::SteamClient;

fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trophynote=info,trophynote_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run() {
        tracing::error!("sync failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> trophynote_core::Result<()> {
    let config = Config::from_env()?;
    let steam = SteamClient::new(&config);
    let notion = NotionClient::new(&config);

    let report = trophynote_core::run_sync(&steam, &notion)?;
    tracing::info!(
        "sync complete: {} created, {} updated, {} unchanged",
        report.created,
        report.updated,
        report.unchanged
    );
    Ok(())
}
