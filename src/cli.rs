//! Command-line interface definitions.
//!
//! Running the binary with no arguments performs one full pass with the
//! built-in defaults; credentials then come from the environment (or a
//! `.env` file in the working directory).

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for India News Relay.
///
/// # Examples
///
/// ```sh
/// # One pass, credentials from TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID
/// india_news_relay
///
/// # With a config file and status notices in the channel
/// india_news_relay -c /etc/india_news_relay.yaml --announce
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log file, appended to on every run
    #[arg(short, long, env = "NEWS_RELAY_LOG", default_value = "news_forwarder.log")]
    pub log_file: PathBuf,

    /// Directory for the per-run JSON file (default: test_data)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Telegram channel username (@name) or chat id
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub chat_id: Option<String>,

    /// Maximum number of articles taken from each source
    #[arg(short, long)]
    pub max_articles: Option<usize>,

    /// Send start, per-source and summary notices to the channel as well
    #[arg(long)]
    pub announce: bool,
}
