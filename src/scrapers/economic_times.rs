//! Economic Times listing scraper.
//!
//! ET nests almost every story under `/news/...`, so when a card carries no
//! section label the segment after `news` is used as the category instead.

use super::{Layout, ParseError, extract_articles};
use crate::models::Article;
use once_cell::sync::Lazy;
use tracing::instrument;
use url::Url;

pub const LISTING_URL: &str = "https://economictimes.indiatimes.com/";

const SITE: &str = "Economic Times";

static LAYOUT: Lazy<Layout> = Lazy::new(|| {
    Layout::new(
        "div.tabdata, section#pageContent, main",
        "div.eachStory, li.story-item",
        "a[href*='/articleshow/'], a[href*='/prime/']",
        "h3, .title",
        ".catName, .story-category",
        ".view-count",
        "time.date-format, time.pub-time, time",
    )
    .skipping(&["/videoshow/", "/slideshows/"])
});

#[instrument(level = "debug", skip(html), fields(bytes = html.len()))]
pub fn parse_listing(
    html: &str,
    page_url: &Url,
    max_articles: usize,
) -> Result<Vec<Article>, ParseError> {
    let articles = extract_articles(SITE, &LAYOUT, html, page_url, max_articles)?
        .into_iter()
        .map(|mut article| {
            if article.category == "news" {
                article.category = news_subsection(&article.url).unwrap_or(article.category);
            }
            article
        })
        .collect();
    Ok(articles)
}

/// `/news/economy/policy/x/articleshow/1.cms` -> `economy`
fn news_subsection(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    match (segments.next(), segments.next(), segments.next()) {
        (Some("news"), Some(section), Some(_)) => Some(section.to_string()),
        _ => None,
    }
}
