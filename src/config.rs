//! Run configuration.
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. the optional YAML file given with `--config`
//! 3. `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID` (a `.env` file is loaded into
//!    the environment first, see `main`)
//! 4. command-line flags
//!
//! [`Settings::resolve`] turns the layers into a validated [`Settings`] value
//! that is handed to the pipeline. Anything wrong at this stage is a
//! [`ConfigError`] and stops the program before any request is made.

use crate::cli::Cli;
use crate::scrapers::Source;
use crate::telegram::TelegramTarget;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("missing Telegram bot token (set TELEGRAM_BOT_TOKEN or telegram.bot_token)")]
    MissingBotToken,
    #[error("missing Telegram chat id (set TELEGRAM_CHAT_ID or telegram.chat_id)")]
    MissingChatId,
    #[error("invalid URL for {field}: {value:?} ({source})")]
    InvalidUrl {
        field: String,
        value: String,
        source: url::ParseError,
    },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Contents of the YAML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Channel username (`@name`) or numeric chat id
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Minimum gap between two successful sends
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
    /// Also send start, per-source and summary notices
    #[serde(default)]
    pub announce: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: default_api_base(),
            send_delay_ms: default_send_delay_ms(),
            announce: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_articles")]
    pub max_articles_per_source: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_articles_per_source: default_max_articles(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub times_of_india: SourceConfig,
    #[serde(default)]
    pub economic_times: SourceConfig,
}

impl SourcesConfig {
    fn get(&self, source: Source) -> &SourceConfig {
        match source {
            Source::TimesOfIndia => &self.times_of_india,
            Source::EconomicTimes => &self.economic_times,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Listing page to read instead of the site's home page
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: None,
        }
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_send_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_max_articles() -> usize {
    20
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("test_data")
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Read the YAML file at `path`, or use defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_yaml(&text)
            }
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Overlay command-line flags (and the environment variables clap read
    /// for them) on top of the file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(token) = non_blank(cli.bot_token.as_deref()) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = non_blank(cli.chat_id.as_deref()) {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(dir) = &cli.output_dir {
            self.output.dir = dir.clone();
        }
        if let Some(max) = cli.max_articles {
            self.fetch.max_articles_per_source = max;
        }
        if cli.announce {
            self.telegram.announce = true;
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub telegram: TelegramTarget,
    pub send_delay: Duration,
    pub announce: bool,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    pub max_articles_per_source: usize,
    pub output_dir: PathBuf,
    /// Enabled sources with the listing page to read for each, in run order.
    pub sources: Vec<(Source, Url)>,
}

impl Settings {
    /// Load the config file named on the command line, apply the flags and validate.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Config::load(cli.config.as_deref())?;
        config.apply_cli(cli);
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let bot_token = non_blank(config.telegram.bot_token.as_deref())
            .ok_or(ConfigError::MissingBotToken)?;
        let chat_id =
            non_blank(config.telegram.chat_id.as_deref()).ok_or(ConfigError::MissingChatId)?;
        let telegram = TelegramTarget::new(&config.telegram.api_base, &bot_token, &chat_id)
            .map_err(|source| ConfigError::InvalidUrl {
                field: "telegram.api_base".to_string(),
                value: config.telegram.api_base.clone(),
                source,
            })?;

        if config.fetch.timeout_secs == 0 {
            return Err(ConfigError::Zero {
                field: "fetch.timeout_secs",
            });
        }
        if config.fetch.max_articles_per_source == 0 {
            return Err(ConfigError::Zero {
                field: "fetch.max_articles_per_source",
            });
        }

        let mut sources = Vec::new();
        for source in Source::ALL {
            let entry = config.sources.get(source);
            if !entry.enabled {
                continue;
            }
            let raw = entry
                .url
                .clone()
                .unwrap_or_else(|| source.default_listing_url().to_string());
            let url = Url::parse(&raw).map_err(|err| ConfigError::InvalidUrl {
                field: format!("sources.{}.url", source.key()),
                value: raw.clone(),
                source: err,
            })?;
            sources.push((source, url));
        }

        Ok(Self {
            telegram,
            send_delay: Duration::from_millis(config.telegram.send_delay_ms),
            announce: config.telegram.announce,
            fetch_timeout: Duration::from_secs(config.fetch.timeout_secs),
            user_agent: config.fetch.user_agent,
            max_articles_per_source: config.fetch.max_articles_per_source,
            output_dir: config.output.dir,
            sources,
        })
    }
}
