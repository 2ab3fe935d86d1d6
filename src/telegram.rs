//! Telegram delivery with fixed-interval rate limiting.
//!
//! # Architecture
//!
//! - [`Deliver`]: core trait, "put this text in the channel"
//! - [`TelegramClient`]: calls the Bot API `sendMessage` method
//! - [`RateLimited`]: decorator that spaces successful deliveries of any
//!   [`Deliver`] implementation by a fixed interval
//!
//! There is no retry. A rejected or failed message is reported to the caller,
//! which logs it and moves on.

use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, instrument, warn};
use url::Url;

/// Telegram refuses message text longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("message is {chars} characters, over the {} character limit", MAX_MESSAGE_CHARS)]
    TooLong { chars: usize },
    #[error("telegram rejected the message (HTTP {status}): {description}")]
    Rejected { status: u16, description: String },
    #[error("telegram request failed: {0}")]
    Request(reqwest::Error),
}

/// Something that can put a text message in front of the channel's readers.
pub trait Deliver {
    /// Send `text`, returning once the platform has accepted or refused it.
    async fn deliver(&mut self, text: &str) -> Result<(), SendError>;
}

/// Where messages go: the `sendMessage` endpoint for a bot and a chat id.
///
/// The endpoint embeds the bot token, so [`fmt::Debug`] only shows the host.
#[derive(Clone)]
pub struct TelegramTarget {
    endpoint: Url,
    chat_id: String,
}

impl TelegramTarget {
    pub fn new(api_base: &str, bot_token: &str, chat_id: &str) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(&format!(
            "{}/bot{}/sendMessage",
            api_base.trim_end_matches('/'),
            bot_token
        ))?;
        Ok(Self {
            endpoint,
            chat_id: chat_id.to_string(),
        })
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

impl fmt::Debug for TelegramTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramTarget")
            .field("host", &self.endpoint.host_str())
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Bot API client posting plain-text messages to one chat.
#[derive(Debug)]
pub struct TelegramClient {
    client: Client,
    target: TelegramTarget,
}

impl TelegramClient {
    pub fn new(client: Client, target: TelegramTarget) -> Self {
        Self { client, target }
    }
}

impl Deliver for TelegramClient {
    #[instrument(level = "debug", skip_all, fields(chat_id = %self.target.chat_id))]
    async fn deliver(&mut self, text: &str) -> Result<(), SendError> {
        let chars = text.chars().count();
        if chars > MAX_MESSAGE_CHARS {
            return Err(SendError::TooLong { chars });
        }

        let payload = SendMessage {
            chat_id: &self.target.chat_id,
            text,
        };
        let response = self
            .client
            .post(self.target.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| SendError::Request(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SendError::Request(e.without_url()))?;

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(api) if status.is_success() && api.ok => {
                debug!(chars, "Telegram accepted message");
                Ok(())
            }
            Ok(api) => Err(SendError::Rejected {
                status: status.as_u16(),
                description: api
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
            Err(_) => Err(SendError::Rejected {
                status: status.as_u16(),
                description: truncate_for_log(&body, 200),
            }),
        }
    }
}

/// Decorator that keeps successful deliveries at least `interval` apart.
///
/// The wait happens before a send, measured from the previous success, so a
/// run never sleeps after its last message. Failed deliveries do not reset
/// the clock.
pub struct RateLimited<T> {
    inner: T,
    interval: Duration,
    last_success: Option<Instant>,
}

impl<T> RateLimited<T>
where
    T: Deliver,
{
    pub fn new(inner: T, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            last_success: None,
        }
    }
}

impl<T> fmt::Debug for RateLimited<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimited")
            .field("interval", &self.interval)
            .field("last_success", &self.last_success)
            .finish()
    }
}

impl<T> Deliver for RateLimited<T>
where
    T: Deliver,
{
    async fn deliver(&mut self, text: &str) -> Result<(), SendError> {
        if let Some(last) = self.last_success {
            let ready = last + self.interval;
            if Instant::now() < ready {
                let wait_ms = (ready - Instant::now()).as_millis() as u64;
                debug!(wait_ms, "Waiting before next send");
                sleep_until(ready).await;
            }
        }

        let result = self.inner.deliver(text).await;
        match &result {
            Ok(()) => self.last_success = Some(Instant::now()),
            Err(e) => warn!(error = %e, "Delivery failed"),
        }
        result
    }
}
