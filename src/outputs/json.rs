//! JSON output of the articles parsed during a run.
//!
//! Each run writes one file named after the local time it finished:
//!
//! ```text
//! output_dir/
//! ├── crawled_articles_20240325_101500.json
//! └── crawled_articles_20240325_181500.json
//! ```
//!
//! The file is a pretty-printed array of article records. Two runs within the
//! same second share a name and the later one wins.

use crate::models::Article;
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("could not create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize articles: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// File name for a run finishing now.
pub fn run_file_name() -> String {
    format!("crawled_articles_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write `articles` to a timestamped JSON file under `output_dir`.
///
/// # Arguments
///
/// * `articles` - Every article parsed this run, in relay order (may be empty)
/// * `output_dir` - Directory for the file; created when missing
///
/// # Returns
///
/// The path of the written `crawled_articles_YYYYMMDD_HHMMSS.json` file, or a
/// [`PersistError`] naming the directory or file that could not be written.
#[instrument(
    level = "info",
    skip_all,
    fields(output_dir = %output_dir.display(), count = articles.len())
)]
pub async fn write_articles(
    articles: &[Article],
    output_dir: &Path,
) -> Result<PathBuf, PersistError> {
    let json = serde_json::to_string_pretty(articles)?;

    fs::create_dir_all(output_dir)
        .await
        .map_err(|source| PersistError::CreateDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let path = output_dir.join(run_file_name());
    fs::write(&path, json)
        .await
        .map_err(|source| PersistError::Write {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), "Wrote crawl results");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn article(n: usize) -> Article {
        Article {
            title: format!("인도 기사 {n}"),
            category: "business".to_string(),
            view_count: if n % 2 == 0 { Some("1.2K".to_string()) } else { None },
            published_at: None,
            url: format!("https://example.com/a{n}"),
            source_name: "Economic Times".to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_articles() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("test_data");
        let articles = vec![article(1), article(2)];

        let path = write_articles(&articles, &output_dir).await.unwrap();
        assert!(path.starts_with(&output_dir));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("crawled_articles_") && name.ends_with(".json"));

        let written = std::fs::read_to_string(&path).unwrap();
        // non-ASCII text is stored as-is, not escaped
        assert!(written.contains("인도 기사 1"));
        let parsed: Vec<Article> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, articles);
    }

    #[tokio::test]
    async fn test_write_empty_run() {
        let dir = tempdir().unwrap();
        let path = write_articles(&[], dir.path()).await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap().trim(), "[]");
    }

    #[tokio::test]
    async fn test_unwritable_output_dir() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "file in the way").unwrap();

        let err = write_articles(&[article(1)], &blocker.join("nested")).await.unwrap_err();
        assert!(matches!(err, PersistError::CreateDir { .. }));
    }
}
