//! Times of India listing scraper.
//!
//! Story cards on the home and section pages sit inside the article list
//! container. Bylines carry the date as `"TOI Business Desk / Updated: Mar 25,
//! 2024, 10:32 IST"`, so the desk name and the `Updated:` label are stripped.

use super::{Layout, ParseError, extract_articles};
use crate::models::Article;
use once_cell::sync::Lazy;
use tracing::instrument;
use url::Url;

pub const LISTING_URL: &str = "https://timesofindia.indiatimes.com/";

const SITE: &str = "Times of India";

static LAYOUT: Lazy<Layout> = Lazy::new(|| {
    Layout::new(
        "div#c_articlelist_stories_1, div.main-content, main",
        "div.story-card, figure, li.news-card",
        "a[href*='/articleshow/']",
        ".story-title, figcaption, h2, h3",
        ".story-category, .section-name",
        "._1_Akb, .view-count",
        "time, .publish-date, ._3Mkg-",
    )
    .skipping(&["/videoshow/", "/photostory/", "/slideshows/"])
});

/// Parse a Times of India listing page.
#[instrument(level = "debug", skip(html), fields(bytes = html.len()))]
pub fn parse_listing(
    html: &str,
    page_url: &Url,
    max_articles: usize,
) -> Result<Vec<Article>, ParseError> {
    let articles = extract_articles(SITE, &LAYOUT, html, page_url, max_articles)?
        .into_iter()
        .map(|mut article| {
            article.published_at = article.published_at.as_deref().and_then(tidy_byline_date);
            article
        })
        .collect();
    Ok(articles)
}

fn tidy_byline_date(raw: &str) -> Option<String> {
    let date = raw.rsplit(" / ").next().unwrap_or(raw).trim();
    let date = date
        .strip_prefix("Updated:")
        .or_else(|| date.strip_prefix("Updated on"))
        .unwrap_or(date)
        .trim();
    if date.is_empty() { None } else { Some(date.to_string()) }
}
