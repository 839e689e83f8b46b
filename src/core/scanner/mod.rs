//! # Scanner Module
//!
//! Discovers image and video files under a root directory.
//!
//! ## Classification
//! - Directories whose path contains a skip substring (e.g. `node_modules`,
//!   `.git`, `AppData`) are pruned with everything below them
//! - Junk suffixes (`.tmp`, `thumbs.db`, `.part`, ...) are never media
//! - Remaining files are images or videos by extension, case-insensitively
//!
//! ## Example
//! ```rust,ignore
//! use media_tools::core::scanner::{ClassificationTables, Crawler};
//!
//! let crawler = Crawler::new(ClassificationTables::default());
//! let found = crawler.crawl(Path::new("/Users/me"), Reporter::silent(), &CancellationToken::new())?;
//! ```

mod filter;
mod walker;

pub use filter::{ClassificationTables, FileClass};
pub use walker::{CrawlResult, Crawler, DEFAULT_LOG_EVERY};
