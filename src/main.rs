//! # India News Relay
//!
//! Reads the latest stories from the Times of India and Economic Times
//! listing pages and relays each one to a Telegram channel as a short
//! plain-text message.
//!
//! ## Usage
//!
//! ```sh
//! TELEGRAM_BOT_TOKEN=123:abc TELEGRAM_CHAT_ID=@india_news india_news_relay
//! ```
//!
//! Each invocation is a single pass; schedule it with cron or a systemd timer.
//!
//! ## Architecture
//!
//! The application is a straight pipeline:
//! 1. **Fetching**: download each source's listing page
//! 2. **Parsing**: pull story cards out of the page with per-site selectors
//! 3. **Relaying**: format every article and send it, one second apart
//! 4. **Output**: write the parsed articles to a JSON file and log a summary

use clap::Parser;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, error, info};

mod cli;
mod config;
mod logging;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod telegram;
mod utils;

use cli::Cli;
use config::Settings;
use scrapers::fetch::build_client;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Credentials may live in a .env file; real environment variables win.
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    logging::init_tracing(&args.log_file)?;

    let start_time = Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "india_news_relay starting up");
    debug!(config = ?args.config, log_file = %args.log_file.display(), "Parsed CLI arguments");

    let settings = match Settings::resolve(&args) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration; nothing was fetched or sent");
            return Err(e.into());
        }
    };
    info!(
        telegram = ?settings.telegram,
        sources = settings.sources.len(),
        "Loaded configuration"
    );

    let client = build_client(settings.fetch_timeout, &settings.user_agent)?;
    let summary = pipeline::run(&settings, &client).await;

    for report in &summary.sources {
        match &report.error {
            None => info!(site = %report.source_name, parsed = report.parsed, "Source finished"),
            Some(e) => info!(site = %report.source_name, error = %e, "Source skipped"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        sent = summary.sent,
        failed = summary.failed,
        "Execution complete"
    );

    Ok(())
}
