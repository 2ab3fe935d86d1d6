//! Telegram message rendering.
//!
//! Every article is rendered with the same template so the channel reads as
//! a uniform feed:
//!
//! ```text
//! 📰 Economy grows 6% [Business]
//!
//! 👁 조회수: 1.2K
//! 📅 발행일: 2024-03-25
//! 🔗 링크: https://example.com/a1
//! 출처: Times of India
//! ```
//!
//! Missing values are printed as [`UNKNOWN`] rather than dropped, so the line
//! layout never changes.

use crate::models::{Article, RunSummary};

/// Placeholder for a field the site did not provide.
pub const UNKNOWN: &str = "알수없음";

/// Render one article as a plain-text message.
///
/// # Arguments
///
/// * `article` - The parsed article; blank optional fields become [`UNKNOWN`]
///
/// # Returns
///
/// The message text: headline with category, then view count, publish date,
/// link and source name on their own lines.
pub fn format_article(article: &Article) -> String {
    let category = or_unknown(Some(article.category.as_str()));
    let views = or_unknown(article.view_count.as_deref());
    let published = or_unknown(article.published_at.as_deref());

    format!(
        "📰 {title} [{category}]\n\n👁 조회수: {views}\n📅 발행일: {published}\n🔗 링크: {url}\n출처: {source}",
        title = article.title.trim(),
        url = article.url,
        source = article.source_name,
    )
}

fn or_unknown(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN,
    }
}

/// Notice sent before crawling starts.
pub fn start_notice() -> String {
    "기사 크롤링을 시작합니다. 잠시만 기다려주세요...".to_string()
}

/// Notice sent after a source has been fetched and parsed.
pub fn source_notice(source_name: &str, count: usize) -> String {
    format!("{source_name}에서 {count}개의 기사를 가져왔습니다.")
}

/// Totals sent before the articles themselves are relayed.
pub fn summary_notice(summary: &RunSummary) -> String {
    let mut text = format!(
        "크롤링이 완료되었습니다!\n\n총 {}개의 기사를 가져왔습니다:",
        summary.total_parsed()
    );
    for report in &summary.sources {
        text.push_str(&format!("\n- {}: {}개", report.source_name, report.parsed));
    }
    text
}
