//! Tracing setup: human-readable events on stderr plus an append-only log file.
//!
//! Both outputs use RFC 3339 UTC timestamps. The file layer has ANSI colours
//! off and, unless `RUST_LOG` says otherwise, also records this crate's debug
//! events (skipped story cards, individual send attempts).

use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt as tfmt, prelude::*};

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Open `log_file` for appending, creating it and its parent directory.
///
/// Existing content is never truncated.
pub fn open_log_file(log_file: &Path) -> io::Result<File> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(log_file)
}

/// The relay's subscriber: a stderr layer and an unbuffered layer writing to `file`.
pub fn subscriber(file: File) -> impl Subscriber + Send + Sync + 'static {
    let stderr_layer = tfmt::layer()
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(io::stderr)
        .with_filter(env_filter("info"));

    let file_layer = tfmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(Mutex::new(file))
        .with_filter(env_filter("info,india_news_relay=debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
}

/// Install the global subscriber, appending to `log_file`.
///
/// The file is opened once here and never truncated. Events are written to
/// it unbuffered, so nothing is lost however the process exits.
pub fn init_tracing(log_file: &Path) -> Result<(), Box<dyn Error>> {
    let file = open_log_file(log_file)?;
    subscriber(file).try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use tempfile::tempdir;
    use tracing::{info, warn};

    fn run_batch(path: &Path, events: &[&str]) {
        let file = open_log_file(path).unwrap();
        tracing::subscriber::with_default(subscriber(file), || {
            for (i, text) in events.iter().enumerate() {
                if i % 2 == 0 {
                    info!(batch_event = i, "{text}");
                } else {
                    warn!(batch_event = i, "{text}");
                }
            }
        });
    }

    #[test]
    fn test_log_file_is_appended_across_runs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("news_forwarder.log");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "earlier run\n").unwrap();

        run_batch(&path, &["first run starting", "first run source failed"]);
        let after_first = fs::read_to_string(&path).unwrap();
        run_batch(&path, &["second run starting"]);
        let after_second = fs::read_to_string(&path).unwrap();

        assert!(after_first.starts_with("earlier run\n"));
        assert!(after_second.starts_with(&after_first));

        let lines: Vec<&str> = after_second.lines().skip(1).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("first run starting batch_event=0"));
        assert!(lines[1].ends_with("first run source failed batch_event=1"));
        assert!(lines[2].ends_with("second run starting batch_event=0"));

        for (line, level) in lines.iter().zip(["INFO", "WARN", "INFO"]) {
            let mut tokens = line.split_whitespace();
            let stamp = tokens.next().unwrap();
            assert!(DateTime::parse_from_rfc3339(stamp).is_ok(), "bad timestamp in {line}");
            assert_eq!(tokens.next(), Some(level));
            assert!(!line.contains('\u{1b}'), "ANSI escape in {line}");
        }
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("relay.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
