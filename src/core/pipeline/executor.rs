//! Discovery pipeline execution.

use crate::core::cancel::CancellationToken;
use crate::core::catalog::{self, CatalogLock, LoadStatus, MediaCatalog};
use crate::core::history::{self, ScanRecord};
use crate::core::scanner::{ClassificationTables, CrawlResult, Crawler, DEFAULT_LOG_EVERY};
use crate::error::{CatalogError, FailureKind, ScanError};
use crate::events::{Component, Reporter};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// File name of the catalog in the default data directory
pub const DEFAULT_CATALOG_FILE: &str = "photo_folder.json";
/// File name of the scan history in the default data directory
pub const DEFAULT_HISTORY_FILE: &str = "scan_history.json";

/// Configuration for discovery scans
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Where the merged catalog lives
    pub catalog_path: PathBuf,
    /// Where scan records are appended
    pub history_path: PathBuf,
    pub tables: ClassificationTables,
    /// "Processed n/total" cadence in files
    pub log_every: usize,
    pub follow_symlinks: bool,
}

impl DiscoveryConfig {
    /// `<data dir>/media-tools`, or the working directory if unknown
    pub fn default_state_dir() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("media-tools"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let state_dir = Self::default_state_dir();
        Self {
            catalog_path: state_dir.join(DEFAULT_CATALOG_FILE),
            history_path: state_dir.join(DEFAULT_HISTORY_FILE),
            tables: ClassificationTables::default(),
            log_every: DEFAULT_LOG_EVERY,
            follow_symlinks: false,
        }
    }
}

/// What a completed scan found and where the catalog ended up
#[derive(Debug, Clone)]
pub struct DiscoverySummary {
    pub root: PathBuf,
    pub images_found: usize,
    pub videos_found: usize,
    pub junk_files: usize,
    pub skipped_directories: usize,
    /// Entries that could not be read during the crawl
    pub item_errors: usize,
    /// Catalog size after the merge
    pub catalog_images: usize,
    pub catalog_videos: usize,
    /// Wall-clock time of the crawl
    pub elapsed: Duration,
    pub record_id: Uuid,
}

/// How a discovery scan ended. Details were already logged.
#[derive(Debug, Clone)]
pub enum DiscoveryOutcome {
    Completed(DiscoverySummary),
    /// Root is not a directory; persisted state untouched
    InvalidRoot,
    /// Another scan holds the catalog lock; persisted state untouched
    Busy,
    /// Cancelled before merging; persisted state untouched
    Cancelled,
    /// The catalog could not be written
    Failed { message: String },
}

/// Builder for discovery configuration
pub struct DiscoveryBuilder {
    config: DiscoveryConfig,
}

impl DiscoveryBuilder {
    pub fn new() -> Self {
        Self {
            config: DiscoveryConfig::default(),
        }
    }

    pub fn catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.catalog_path = path.into();
        self
    }

    pub fn history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.history_path = path.into();
        self
    }

    /// Put both state files in `dir` under their default names
    pub fn state_dir(self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.catalog_path(dir.join(DEFAULT_CATALOG_FILE))
            .history_path(dir.join(DEFAULT_HISTORY_FILE))
    }

    pub fn tables(mut self, tables: ClassificationTables) -> Self {
        self.config.tables = tables;
        self
    }

    pub fn log_every(mut self, n: usize) -> Self {
        self.config.log_every = n;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.follow_symlinks = follow;
        self
    }

    pub fn build(self) -> Discovery {
        Discovery {
            crawler: Crawler::new(self.config.tables.clone())
                .with_log_every(self.config.log_every)
                .with_symlinks(self.config.follow_symlinks),
            config: self.config,
        }
    }
}

impl Default for DiscoveryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Crawl, merge into the catalog, persist, and record history.
///
/// Holds the catalog lock for the whole run, so at most one scan per
/// catalog file is active across processes.
pub struct Discovery {
    config: DiscoveryConfig,
    crawler: Crawler,
}

impl Discovery {
    pub fn builder() -> DiscoveryBuilder {
        DiscoveryBuilder::new()
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn run(
        &self,
        root: &Path,
        reporter: Reporter<'_>,
        cancel: &CancellationToken,
    ) -> DiscoveryOutcome {
        let reporter = reporter.with_component(Component::Discovery);

        if !root.is_dir() {
            reporter.error(
                FailureKind::InvalidRoot,
                format!("Invalid directory path: {}", root.display()),
            );
            return DiscoveryOutcome::InvalidRoot;
        }

        let _lock = match CatalogLock::acquire(&self.config.catalog_path) {
            Ok(lock) => lock,
            Err(e) => {
                reporter.error(FailureKind::StateUnavailable, e.to_string());
                return match e {
                    CatalogError::Busy { .. } => DiscoveryOutcome::Busy,
                    other => DiscoveryOutcome::Failed {
                        message: other.to_string(),
                    },
                };
            }
        };

        reporter.info(format!("Scanning path: {} ...", root.display()));

        let start = Instant::now();
        let crawl = match self.crawler.crawl(root, reporter, cancel) {
            Ok(crawl) => crawl,
            Err(ScanError::Cancelled) => {
                reporter.info("Scan cancelled; catalog left untouched");
                return DiscoveryOutcome::Cancelled;
            }
            // The root vanished or stopped resolving after the first check
            Err(e) => {
                reporter.error(FailureKind::InvalidRoot, e.to_string());
                return DiscoveryOutcome::InvalidRoot;
            }
        };
        let elapsed = start.elapsed();

        reporter.info("Scan complete:");
        reporter.info(format!("  - Found {} images", crawl.images.len()));
        reporter.info(format!("  - Found {} videos", crawl.videos.len()));
        reporter.info(format!("  - Time elapsed: {}", format_elapsed(elapsed)));

        let images = Self::catalog_keys(&crawl.images, reporter);
        let videos = Self::catalog_keys(&crawl.videos, reporter);

        let state_reporter = reporter.with_component(Component::Catalog);
        let loaded = catalog::load_catalog(&self.config.catalog_path);
        if let LoadStatus::Corrupt { reason } = &loaded.status {
            state_reporter.warn(
                FailureKind::StateCorrupt,
                format!(
                    "Catalog {} is unreadable ({}); starting from an empty catalog",
                    self.config.catalog_path.display(),
                    reason
                ),
            );
        }

        let mut merged: MediaCatalog = loaded.value;
        merged.absorb(&images, &videos);

        if let Err(e) = catalog::persist_catalog(&merged, &self.config.catalog_path) {
            state_reporter.error(FailureKind::StateUnavailable, e.to_string());
            return DiscoveryOutcome::Failed {
                message: e.to_string(),
            };
        }
        state_reporter.info(format!(
            "Media paths saved to {}",
            self.config.catalog_path.display()
        ));
        state_reporter.debug(format!("Catalog now holds {} paths", merged.len()));

        let record = self.scan_record(root, &crawl, elapsed);
        match history::append_history(&record, &self.config.history_path) {
            Ok(LoadStatus::Corrupt { reason }) => state_reporter.warn(
                FailureKind::StateCorrupt,
                format!(
                    "Scan history {} was unreadable ({}); started a new history",
                    self.config.history_path.display(),
                    reason
                ),
            ),
            Ok(_) => {}
            Err(e) => state_reporter.warn(FailureKind::ItemError, e.to_string()),
        }

        DiscoveryOutcome::Completed(DiscoverySummary {
            root: root.to_path_buf(),
            images_found: crawl.images.len(),
            videos_found: crawl.videos.len(),
            junk_files: crawl.junk_files,
            skipped_directories: crawl.skipped_directories,
            item_errors: crawl.errors,
            catalog_images: merged.images.len(),
            catalog_videos: merged.videos.len(),
            elapsed,
            record_id: record.id,
        })
    }

    fn scan_record(&self, root: &Path, crawl: &CrawlResult, elapsed: Duration) -> ScanRecord {
        let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
        ScanRecord {
            id: ScanRecord::generate_id(),
            root: root.to_string_lossy().into_owned(),
            timestamp: Local::now(),
            image_count: crawl.images.len(),
            video_count: crawl.videos.len(),
            elapsed_seconds: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
            image_extensions: self.config.tables.image_extensions().clone(),
            video_extensions: self.config.tables.video_extensions().clone(),
        }
    }

    fn catalog_keys(paths: &[PathBuf], reporter: Reporter<'_>) -> Vec<String> {
        paths
            .iter()
            .filter_map(|path| {
                let key = catalog::path_key(path);
                if key.is_none() {
                    reporter.warn(
                        FailureKind::ItemError,
                        format!("Skipping non UTF-8 path: {}", path.display()),
                    );
                }
                key
            })
            .collect()
    }
}

/// `1h:2m:3s`
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (hours, rem) = (total / 3600, total % 3600);
    let (minutes, seconds) = (rem / 60, rem % 60);
    format!("{}h:{}m:{}s", hours, minutes, seconds)
}
