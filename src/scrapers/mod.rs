//! Listing-page scrapers for the two supported news sites.
//!
//! Each run fetches one listing page per [`Source`] and pulls story cards out
//! of it. Both sites lay their listings out the same way (a container holding
//! repeated story cards), so the card walk lives here and each site module
//! only contributes its [`Layout`] and a small amount of clean-up.
//!
//! # Supported Sources
//!
//! | Source | Module | Default listing |
//! |--------|--------|-----------------|
//! | Times of India | [`times_of_india`] | `https://timesofindia.indiatimes.com/` |
//! | Economic Times | [`economic_times`] | `https://economictimes.indiatimes.com/` |
//!
//! Cards without a headline or a usable link are dropped (debug-logged), the
//! page order is preserved, duplicate links keep their first occurrence, and
//! the result is capped at the configured per-source maximum.

use crate::models::Article;
use crate::utils::collapse_whitespace;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use tracing::debug;
use url::Url;

pub mod economic_times;
pub mod fetch;
pub mod times_of_india;

/// The page structure was not what the scraper expects.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{site}: listing container `{selector}` not found")]
    MissingContainer {
        site: &'static str,
        selector: &'static str,
    },
}

/// One of the two news sites this relay knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    TimesOfIndia,
    EconomicTimes,
}

impl Source {
    /// Every supported source, in the order a run visits them.
    pub const ALL: [Source; 2] = [Source::TimesOfIndia, Source::EconomicTimes];

    /// Display name used in messages, logs and the output file.
    pub fn name(self) -> &'static str {
        match self {
            Source::TimesOfIndia => "Times of India",
            Source::EconomicTimes => "Economic Times",
        }
    }

    /// Key used for this source in the config file.
    pub fn key(self) -> &'static str {
        match self {
            Source::TimesOfIndia => "times_of_india",
            Source::EconomicTimes => "economic_times",
        }
    }

    pub fn default_listing_url(self) -> &'static str {
        match self {
            Source::TimesOfIndia => times_of_india::LISTING_URL,
            Source::EconomicTimes => economic_times::LISTING_URL,
        }
    }

    /// Parse a listing page fetched from `page_url` with this source's layout.
    pub fn parse_listing(
        self,
        html: &str,
        page_url: &Url,
        max_articles: usize,
    ) -> Result<Vec<Article>, ParseError> {
        match self {
            Source::TimesOfIndia => times_of_india::parse_listing(html, page_url, max_articles),
            Source::EconomicTimes => economic_times::parse_listing(html, page_url, max_articles),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// CSS selectors describing where a site puts each field of a story card.
pub(crate) struct Layout {
    pub container_css: &'static str,
    pub container: Selector,
    pub card: Selector,
    /// Story links, used when the headline is not inside (or around) a link
    pub link: Selector,
    pub title: Selector,
    pub category: Selector,
    pub views: Selector,
    pub date: Selector,
    /// Path fragments marking links that are not text stories (videos, galleries)
    pub skip_paths: &'static [&'static str],
}

impl Layout {
    pub fn new(
        container: &'static str,
        card: &str,
        link: &str,
        title: &str,
        category: &str,
        views: &str,
        date: &str,
    ) -> Self {
        Self {
            container_css: container,
            container: static_selector(container),
            card: static_selector(card),
            link: static_selector(link),
            title: static_selector(title),
            category: static_selector(category),
            views: static_selector(views),
            date: static_selector(date),
            skip_paths: &[],
        }
    }

    /// Drop cards whose story link contains any of `paths`.
    pub fn skipping(mut self, paths: &'static [&'static str]) -> Self {
        self.skip_paths = paths;
        self
    }
}

fn static_selector(css: &str) -> Selector {
    Selector::parse(css).expect("layout selectors are valid CSS")
}

static ANCHOR: Lazy<Selector> = Lazy::new(|| static_selector("a[href]"));

static VIEW_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)*(?:\s?[KkMmBb]\b)?").expect("valid regex"));

/// Walk the story cards of a listing page and build articles from them.
pub(crate) fn extract_articles(
    site: &'static str,
    layout: &Layout,
    html: &str,
    page_url: &Url,
    max_articles: usize,
) -> Result<Vec<Article>, ParseError> {
    let document = Html::parse_document(html);
    let container = document
        .select(&layout.container)
        .next()
        .ok_or(ParseError::MissingContainer {
            site,
            selector: layout.container_css,
        })?;

    let articles = container
        .select(&layout.card)
        .enumerate()
        .filter_map(|(index, card)| {
            let article = parse_card(site, layout, card, page_url);
            if article.is_none() {
                debug!(site, index, "Skipping story card without headline or link");
            }
            article
        })
        .unique_by(|article| dedupe_key(&article.url))
        .take(max_articles)
        .collect::<Vec<_>>();

    Ok(articles)
}

fn parse_card(
    site: &str,
    layout: &Layout,
    card: ElementRef<'_>,
    page_url: &Url,
) -> Option<Article> {
    let headline = card
        .select(&layout.title)
        .find(|el| !element_text(*el).is_empty());
    let link = headline
        .and_then(|el| headline_link(el, card))
        .or_else(|| card.select(&layout.link).next())?;
    let url = link
        .value()
        .attr("href")
        .and_then(|href| resolve_link(page_url, href))?;
    if layout.skip_paths.iter().any(|p| url.contains(p)) {
        return None;
    }

    let title = headline
        .map(element_text)
        .or_else(|| {
            link.value()
                .attr("title")
                .map(collapse_whitespace)
                .and_then(non_empty)
        })
        .or_else(|| non_empty(element_text(link)))?;

    let category =
        first_text(card, &layout.category).unwrap_or_else(|| category_from_url(&url));
    let view_count = first_text(card, &layout.views).and_then(|text| view_count_token(&text));
    let published_at = card.select(&layout.date).next().and_then(|el| {
        el.value()
            .attr("datetime")
            .map(collapse_whitespace)
            .and_then(non_empty)
            .or_else(|| non_empty(element_text(el)))
    });

    Some(Article {
        title,
        category,
        view_count,
        published_at,
        url,
        source_name: site.to_string(),
    })
}

/// The link a headline belongs to: an `<a>` wrapping it (up to the card), or one inside it.
fn headline_link<'a>(headline: ElementRef<'a>, card: ElementRef<'a>) -> Option<ElementRef<'a>> {
    if is_link(&headline) {
        return Some(headline);
    }
    headline
        .ancestors()
        .map_while(ElementRef::wrap)
        .take_while(|el| el.id() != card.id())
        .find(is_link)
        .or_else(|| headline.select(&ANCHOR).next())
}

fn is_link(el: &ElementRef<'_>) -> bool {
    el.value().name() == "a" && el.value().attr("href").is_some()
}

/// Identity of a story link for de-duplication: tracking query and fragment removed.
pub(crate) fn dedupe_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector).map(element_text).find(|t| !t.is_empty())
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Resolve `href` against the page it was found on; only web links survive.
pub(crate) fn resolve_link(page_url: &Url, href: &str) -> Option<String> {
    let resolved = page_url.join(href.trim()).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// First path segment of an article link, used when a card has no section label.
///
/// `https://timesofindia.indiatimes.com/business/india-business/x/articleshow/1.cms`
/// gives `business`; a single-segment path gives nothing because that segment
/// is the story slug itself.
pub(crate) fn category_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            let segments: Vec<String> = u
                .path_segments()?
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if segments.len() >= 2 {
                segments.into_iter().next()
            } else {
                None
            }
        })
        .unwrap_or_default()
}

/// Pull the count out of text such as `"1.2K views"` or `"👁 15,300"`.
pub(crate) fn view_count_token(text: &str) -> Option<String> {
    VIEW_COUNT
        .find(text)
        .map(|m| m.as_str().split_whitespace().collect::<String>())
}
