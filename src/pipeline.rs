//! One pass of the relay: fetch → parse → format → rate-limited send → persist.
//!
//! Everything runs in sequence. Failures are contained where they happen:
//! a source that cannot be fetched or parsed contributes no articles, a
//! message that cannot be sent is counted and skipped, and a failed JSON
//! write is logged. None of these stop the run.

use crate::config::Settings;
use crate::models::{Article, RunSummary, SourceReport};
use crate::outputs::{json, message};
use crate::scrapers::Source;
use crate::scrapers::fetch::fetch_listing;
use crate::telegram::{Deliver, RateLimited, TelegramClient};
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Run the whole pipeline once, sending through Telegram.
///
/// # Arguments
///
/// * `settings` - Resolved configuration: sources, chat, send delay, output directory
/// * `client` - HTTP client used both for listing pages and for the Bot API
///
/// # Returns
///
/// A [`RunSummary`] with per-source reports, send counts and the JSON path
/// (when it was written). Failures never escape as errors; they are counted
/// and logged.
pub async fn run(settings: &Settings, client: &Client) -> RunSummary {
    let telegram = TelegramClient::new(client.clone(), settings.telegram.clone());
    let mut sender = RateLimited::new(telegram, settings.send_delay);
    run_with(settings, client, &mut sender).await
}

/// Run the whole pipeline once, sending through `sender`.
///
/// # Arguments
///
/// * `settings` - Resolved configuration
/// * `client` - HTTP client for the listing pages
/// * `sender` - Where formatted messages go; rate limiting is its concern
///
/// # Returns
///
/// The same [`RunSummary`] as [`run`].
#[instrument(level = "info", skip_all, fields(sources = settings.sources.len()))]
pub async fn run_with<D: Deliver>(
    settings: &Settings,
    client: &Client,
    sender: &mut D,
) -> RunSummary {
    let start_time = Instant::now();
    info!(
        chat_id = settings.telegram.chat_id(),
        output_dir = %settings.output_dir.display(),
        max_articles = settings.max_articles_per_source,
        "Run starting"
    );

    if settings.announce {
        announce(sender, &message::start_notice()).await;
    }

    let mut summary = RunSummary::default();
    let mut articles = Vec::new();
    for (source, url) in &settings.sources {
        let (report, found) =
            collect_source(client, *source, url, settings.max_articles_per_source).await;
        if settings.announce {
            announce(sender, &message::source_notice(source.name(), report.parsed)).await;
        }
        summary.sources.push(report);
        articles.extend(found);
    }
    info!(count = articles.len(), "Total articles collected");

    if settings.announce {
        announce(sender, &message::summary_notice(&summary)).await;
    }

    let (sent, failed) = relay_articles(sender, &articles).await;
    summary.sent = sent;
    summary.failed = failed;

    match json::write_articles(&articles, &settings.output_dir).await {
        Ok(path) => summary.output_path = Some(path),
        Err(e) => error!(error = %e, "Failed to save crawl results; continuing"),
    }

    let elapsed = start_time.elapsed();
    info!(
        parsed = summary.total_parsed(),
        sent = summary.sent,
        failed = summary.failed,
        output = ?summary.output_path,
        elapsed_ms = elapsed.as_millis() as u64,
        "Run complete"
    );
    summary
}

/// Fetch and parse one source. Never fails: problems end up in the report.
#[instrument(level = "info", skip(client, url, max_articles), fields(site = source.name()))]
async fn collect_source(
    client: &Client,
    source: Source,
    url: &Url,
    max_articles: usize,
) -> (SourceReport, Vec<Article>) {
    let mut report = SourceReport {
        source_name: source.name().to_string(),
        ..Default::default()
    };

    let html = match fetch_listing(client, url.as_str()).await {
        Ok(html) => html,
        Err(e) => {
            error!(error = %e, "Fetch failed; skipping source");
            report.error = Some(e.to_string());
            return (report, Vec::new());
        }
    };

    match source.parse_listing(&html, url, max_articles) {
        Ok(articles) => {
            info!(count = articles.len(), "Parsed listing");
            for (i, article) in articles.iter().enumerate() {
                debug!(
                    index = i + 1,
                    title = %article.title,
                    published_at = ?article.published_at,
                    "Parsed article"
                );
            }
            report.parsed = articles.len();
            (report, articles)
        }
        Err(e) => {
            warn!(error = %e, "Listing layout not recognised; no articles from this source");
            report.error = Some(e.to_string());
            (report, Vec::new())
        }
    }
}

/// Format and send every deliverable article. Returns `(sent, failed)`.
pub async fn relay_articles<D: Deliver>(sender: &mut D, articles: &[Article]) -> (usize, usize) {
    let total = articles.len();
    info!(total, "Relaying articles to channel");

    let mut sent = 0;
    let mut failed = 0;
    for (i, article) in articles.iter().enumerate() {
        let index = i + 1;
        if !article.is_deliverable() {
            debug!(index, url = %article.url, "Dropping article without title or link");
            continue;
        }

        let text = message::format_article(article);
        debug!(index, total, url = %article.url, "Sending article");
        match sender.deliver(&text).await {
            Ok(()) => {
                sent += 1;
                info!(index, total, url = %article.url, "Article sent");
            }
            Err(e) => {
                failed += 1;
                error!(
                    index,
                    total,
                    url = %article.url,
                    error = %e,
                    "Article send failed; continuing"
                );
            }
        }
    }
    (sent, failed)
}

async fn announce<D: Deliver>(sender: &mut D, text: &str) {
    match sender.deliver(text).await {
        Ok(()) => debug!("Notice sent"),
        Err(e) => warn!(error = %e, "Notice send failed"),
    }
}
