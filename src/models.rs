//! Data models shared by the scrapers, the formatter and the JSON output.
//!
//! - [`Article`]: one story extracted from a listing page
//! - [`SourceReport`]: what happened to a single source during a run
//! - [`RunSummary`]: the per-run totals logged (and optionally announced) at the end

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single news item parsed from a listing page.
///
/// Articles are built once by a scraper and never mutated afterwards. Display
/// values (`view_count`, `published_at`) are kept exactly as the site prints
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Headline text, whitespace collapsed.
    pub title: String,
    /// Section name, empty when the site does not expose one.
    pub category: String,
    /// View-count token such as `1.2K`.
    pub view_count: Option<String>,
    /// Publish date as printed (or the `datetime` attribute of a `<time>` tag).
    pub published_at: Option<String>,
    /// Absolute link to the story.
    pub url: String,
    /// Display name of the source site.
    pub source_name: String,
}

impl Article {
    /// Whether the article may be handed to the formatter and sender.
    pub fn is_deliverable(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// Outcome of fetching and parsing one source.
#[derive(Debug, Default)]
pub struct SourceReport {
    pub source_name: String,
    /// Number of articles kept after parsing.
    pub parsed: usize,
    /// Fetch or parse failure, rendered for logging.
    pub error: Option<String>,
}

/// Totals for one run of the pipeline.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub sources: Vec<SourceReport>,
    pub sent: usize,
    pub failed: usize,
    pub output_path: Option<PathBuf>,
}

impl RunSummary {
    /// Articles parsed across every source.
    pub fn total_parsed(&self) -> usize {
        self.sources.iter().map(|s| s.parsed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, url: &str) -> Article {
        Article {
            title: title.to_string(),
            category: String::new(),
            view_count: None,
            published_at: None,
            url: url.to_string(),
            source_name: "Times of India".to_string(),
        }
    }

    #[test]
    fn test_is_deliverable() {
        assert!(article("Headline", "https://example.com/a1").is_deliverable());
        assert!(!article("   ", "https://example.com/a1").is_deliverable());
        assert!(!article("Headline", "").is_deliverable());
    }

    #[test]
    fn test_article_serializes_expected_fields() {
        let value = serde_json::to_value(article("Headline", "https://example.com/a1")).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for key in ["title", "category", "view_count", "published_at", "url", "source_name"] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(value["view_count"], serde_json::Value::Null);
    }

    #[test]
    fn test_total_parsed() {
        let summary = RunSummary {
            sources: vec![
                SourceReport { source_name: "a".into(), parsed: 3, error: None },
                SourceReport { source_name: "b".into(), parsed: 0, error: Some("HTTP 500".into()) },
            ],
            ..Default::default()
        };
        assert_eq!(summary.total_parsed(), 3);
    }
}
