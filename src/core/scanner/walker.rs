//! Two-pass directory crawler using walkdir.
//!
//! Pass one enumerates every file outside skipped subtrees, so the total
//! is known before any percentage is reported. Pass two classifies.

use super::filter::{ClassificationTables, FileClass};
use crate::core::cancel::CancellationToken;
use crate::error::{FailureKind, ScanError};
use crate::events::{Component, Reporter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default cadence of "Processed n/total" log lines
pub const DEFAULT_LOG_EVERY: usize = 1000;

/// Media found by one crawl, in traversal order
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    pub images: Vec<PathBuf>,
    pub videos: Vec<PathBuf>,
    /// Files outside skipped subtrees, the denominator of progress
    pub total_files: usize,
    pub junk_files: usize,
    pub skipped_directories: usize,
    /// Unreadable entries that were logged and skipped
    pub errors: usize,
}

/// Walks a root directory and partitions its files into images and videos
#[derive(Debug, Clone)]
pub struct Crawler {
    tables: ClassificationTables,
    follow_symlinks: bool,
    log_every: usize,
}

impl Crawler {
    pub fn new(tables: ClassificationTables) -> Self {
        Self {
            tables,
            follow_symlinks: false,
            log_every: DEFAULT_LOG_EVERY,
        }
    }

    /// Follow symbolic links while walking
    pub fn with_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Emit a progress log line every `n` files (0 disables them)
    pub fn with_log_every(mut self, n: usize) -> Self {
        self.log_every = n;
        self
    }

    /// Crawl `root`.
    ///
    /// Only an invalid root or cancellation produce an error; unreadable
    /// entries are logged and skipped.
    pub fn crawl(
        &self,
        root: &Path,
        reporter: Reporter<'_>,
        cancel: &CancellationToken,
    ) -> Result<CrawlResult, ScanError> {
        let reporter = reporter.with_component(Component::Scan);

        if !root.is_dir() {
            return Err(ScanError::InvalidRoot {
                path: root.to_path_buf(),
            });
        }
        let root = std::path::absolute(root).map_err(|source| ScanError::ReadDirectory {
            path: root.to_path_buf(),
            source,
        })?;

        let mut result = CrawlResult::default();
        let candidates = self.enumerate(&root, reporter, cancel, &mut result)?;

        let total = candidates.len();
        result.total_files = total;

        for (index, path) in candidates.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let processed = index + 1;
            let class = path
                .file_name()
                .map(|name| self.tables.classify_file(&name.to_string_lossy()))
                .unwrap_or(FileClass::Unclassified);

            match class {
                FileClass::Image => result.images.push(path),
                FileClass::Video => result.videos.push(path),
                FileClass::Junk => result.junk_files += 1,
                FileClass::Unclassified => {}
            }

            if self.log_every > 0 && processed % self.log_every == 0 {
                reporter.info(format!("Processed {}/{} files...", processed, total));
            }

            reporter.progress(processed as f64 / total as f64 * 100.0);
        }

        if total == 0 {
            reporter.progress(100.0);
        }

        Ok(result)
    }

    /// First pass: collect file candidates, pruning skipped subtrees
    fn enumerate(
        &self,
        root: &Path,
        reporter: Reporter<'_>,
        cancel: &CancellationToken,
        result: &mut CrawlResult,
    ) -> Result<Vec<PathBuf>, ScanError> {
        let mut candidates = Vec::new();
        let mut walker = WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter();

        loop {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let entry = match walker.next() {
                None => break,
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path }
                    } else {
                        ScanError::ReadDirectory {
                            path,
                            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                        }
                    };
                    reporter.warn(FailureKind::ItemError, error.to_string());
                    result.errors += 1;
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                if self.tables.is_skipped_directory(entry.path()) {
                    reporter.debug(format!("Skipping folder: {}", entry.path().display()));
                    result.skipped_directories += 1;
                    walker.skip_current_dir();
                }
                continue;
            }

            // Unfollowed links to directories are not files
            if entry.path_is_symlink() && entry.path().is_dir() {
                continue;
            }

            candidates.push(entry.into_path());
        }

        Ok(candidates)
    }
}
