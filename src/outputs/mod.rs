//! Everything a run produces besides log lines.
//!
//! # Submodules
//!
//! - [`message`]: renders articles and status notices as Telegram message text
//! - [`json`]: writes the parsed articles of a run to a timestamped JSON file

pub mod json;
pub mod message;
