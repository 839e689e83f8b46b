//! Walks a source tree and copies every image showing a target face.

use super::encodings::EncodingStore;
use super::naming::copy_to_unique;
use super::traits::{FaceEmbedder, TargetEncoding};
use crate::core::cancel::CancellationToken;
use crate::error::{FailureKind, MatchError};
use crate::events::{Component, Reporter};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Largest distance still treated as the same person
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// Candidate image extensions, compared case-insensitively
pub const MATCH_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp", "tiff"];

/// Face matching settings
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub threshold: f64,
    /// Lowercase, without the leading dot
    pub extensions: BTreeSet<String>,
    /// Skip targets that show more than one face
    pub require_single_face: bool,
}

impl MatchConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_single_face(mut self, require: bool) -> Self {
        self.require_single_face = require;
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            extensions: MATCH_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            require_single_face: false,
        }
    }
}

/// A candidate that matched a target and was copied
#[derive(Debug, Clone, PartialEq)]
pub struct MatchEvent {
    pub source_path: PathBuf,
    /// Target image whose encoding matched
    pub matched_target: PathBuf,
    pub distance: f64,
    pub copied_to: PathBuf,
}

/// What happened to one candidate image
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Matched(MatchEvent),
    NoMatch,
    Errored(String),
}

/// How a match scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Every candidate was processed (possibly zero of them)
    Completed,
    Cancelled,
    /// Stopped before looking at any candidate
    EndedEarly(FailureKind),
}

/// Summary of one face match scan
#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    pub state: ScanState,
    pub targets: usize,
    pub candidates: usize,
    pub matches: Vec<MatchEvent>,
    pub no_match: usize,
    pub errored: usize,
}

impl MatchReport {
    fn ended(state: ScanState, targets: usize) -> Self {
        Self {
            state,
            targets,
            candidates: 0,
            matches: Vec::new(),
            no_match: 0,
            errored: 0,
        }
    }

    fn record(&mut self, outcome: CandidateOutcome) {
        match outcome {
            CandidateOutcome::Matched(event) => self.matches.push(event),
            CandidateOutcome::NoMatch => self.no_match += 1,
            CandidateOutcome::Errored(_) => self.errored += 1,
        }
    }
}

/// Finds images of the target people under a source root
pub struct MatchScanner<'e> {
    embedder: &'e dyn FaceEmbedder,
    config: MatchConfig,
}

impl<'e> MatchScanner<'e> {
    pub fn new(embedder: &'e dyn FaceEmbedder, config: MatchConfig) -> Self {
        Self { embedder, config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Embed the target photos, then scan.
    ///
    /// Ends early with `NoUsableInput` when no target yields a face.
    pub fn run(
        &self,
        target_images: &[PathBuf],
        source_root: &Path,
        output_dir: &Path,
        reporter: Reporter<'_>,
        cancel: &CancellationToken,
    ) -> MatchReport {
        let targets = EncodingStore::new(self.embedder)
            .with_single_face(self.config.require_single_face)
            .build(target_images, reporter, cancel);

        if cancel.is_cancelled() {
            return MatchReport::ended(ScanState::Cancelled, targets.len());
        }
        self.scan(&targets, source_root, output_dir, reporter, cancel)
    }

    /// Compare every candidate image under `source_root` against `targets`
    /// and copy each match into `output_dir`.
    ///
    /// A candidate is copied at most once, for the first face and target pair
    /// within the threshold. Item failures are logged and counted.
    pub fn scan(
        &self,
        targets: &[TargetEncoding],
        source_root: &Path,
        output_dir: &Path,
        reporter: Reporter<'_>,
        cancel: &CancellationToken,
    ) -> MatchReport {
        let reporter = reporter.with_component(Component::FaceMatch);

        if targets.is_empty() {
            reporter.error(
                FailureKind::NoUsableInput,
                "No usable target faces; nothing to match against.",
            );
            return MatchReport::ended(ScanState::EndedEarly(FailureKind::NoUsableInput), 0);
        }

        if !source_root.is_dir() {
            reporter.error(
                FailureKind::InvalidRoot,
                format!("Invalid directory path: {}", source_root.display()),
            );
            return MatchReport::ended(
                ScanState::EndedEarly(FailureKind::InvalidRoot),
                targets.len(),
            );
        }

        if let Err(e) = fs::create_dir_all(output_dir) {
            let error = MatchError::OutputUnavailable {
                path: output_dir.to_path_buf(),
                source: e,
            };
            reporter.error(FailureKind::StateUnavailable, error.to_string());
            return MatchReport::ended(
                ScanState::EndedEarly(FailureKind::StateUnavailable),
                targets.len(),
            );
        }

        let candidates = match self.enumerate(source_root, output_dir, reporter, cancel) {
            Some(candidates) => candidates,
            None => return MatchReport::ended(ScanState::Cancelled, targets.len()),
        };

        let mut report = MatchReport::ended(ScanState::Completed, targets.len());
        report.candidates = candidates.len();

        if candidates.is_empty() {
            reporter.warn(FailureKind::NoUsableInput, "No images found in source folder.");
            reporter.progress(100.0);
            return report;
        }

        let total = candidates.len();
        for (index, path) in candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                reporter.info("Face match cancelled");
                report.state = ScanState::Cancelled;
                return report;
            }

            let outcome = self.process_candidate(path, targets, output_dir);
            match &outcome {
                CandidateOutcome::Matched(event) => {
                    reporter.info(format!("Match -> {}", event.source_path.display()));
                }
                CandidateOutcome::NoMatch => {
                    reporter.debug(format!("No match: {}", path.display()));
                }
                CandidateOutcome::Errored(message) => {
                    reporter.warn(FailureKind::ItemError, message.clone());
                }
            }
            report.record(outcome);

            reporter.progress((index + 1) as f64 / total as f64 * 100.0);
        }

        reporter.info("Completed scanning.");
        report
    }

    /// Candidate files in traversal order, or `None` when cancelled.
    /// The output folder is never scanned.
    fn enumerate(
        &self,
        root: &Path,
        output_dir: &Path,
        reporter: Reporter<'_>,
        cancel: &CancellationToken,
    ) -> Option<Vec<PathBuf>> {
        // Resolves `..` and links; the folder exists by now
        let output_dir = fs::canonicalize(output_dir).ok();
        let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());

        let mut candidates = Vec::new();
        let mut walker = WalkDir::new(&root).sort_by_file_name().into_iter();

        loop {
            if cancel.is_cancelled() {
                return None;
            }

            let entry = match walker.next() {
                None => break,
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    reporter.warn(FailureKind::ItemError, format!("Error reading folder: {}", e));
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                if output_dir.is_some() && fs::canonicalize(entry.path()).ok() == output_dir {
                    walker.skip_current_dir();
                }
                continue;
            }

            // Links to files count, links to directories do not
            if entry.path().is_file() && self.config.accepts(entry.path()) {
                candidates.push(entry.into_path());
            }
        }

        Some(candidates)
    }

    fn process_candidate(
        &self,
        path: &Path,
        targets: &[TargetEncoding],
        output_dir: &Path,
    ) -> CandidateOutcome {
        let faces = match self.embedder.embed(path) {
            Ok(faces) => faces,
            Err(e) => {
                return CandidateOutcome::Errored(format!(
                    "Error processing {}: {}",
                    path.display(),
                    e
                ))
            }
        };

        let hit = faces.iter().find_map(|face| {
            targets.iter().find_map(|target| {
                let distance = self.embedder.distance(&target.encoding, face);
                (distance <= self.config.threshold).then_some((target, distance))
            })
        });

        let Some((target, distance)) = hit else {
            return CandidateOutcome::NoMatch;
        };

        match copy_to_unique(path, output_dir) {
            Ok(copied_to) => CandidateOutcome::Matched(MatchEvent {
                source_path: path.to_path_buf(),
                matched_target: target.source.clone(),
                distance,
                copied_to,
            }),
            Err(e) => CandidateOutcome::Errored(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::faces::traits::FaceEncoding;
    use crate::error::EmbedError;
    use crate::events::{LogEntry, ProgressUpdate};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Faces keyed by file name; unknown names fail to embed
    #[derive(Default)]
    struct FakeEmbedder {
        faces: HashMap<String, Vec<FaceEncoding>>,
    }

    impl FakeEmbedder {
        fn with(mut self, name: &str, faces: &[[f64; 2]]) -> Self {
            self.faces.insert(
                name.to_string(),
                faces.iter().map(|f| FaceEncoding::new(f.to_vec())).collect(),
            );
            self
        }
    }

    impl FaceEmbedder for FakeEmbedder {
        fn embed(&self, image: &Path) -> Result<Vec<FaceEncoding>, EmbedError> {
            let name = image.file_name().unwrap().to_string_lossy().to_string();
            self.faces
                .get(&name)
                .cloned()
                .ok_or_else(|| EmbedError::Failed(format!("cannot decode {}", name)))
        }
    }

    fn target(x: f64) -> TargetEncoding {
        TargetEncoding {
            source: PathBuf::from(format!("target_{}.jpg", x)),
            encoding: FaceEncoding::new(vec![x, 0.0]),
        }
    }

    fn source_tree(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, name.as_bytes()).unwrap();
        }
        dir
    }

    fn copied_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn copies_match_within_threshold() {
        let source = source_tree(&["a.jpg", "b.jpg"]);
        let out = TempDir::new().unwrap();
        let embedder = FakeEmbedder::default()
            .with("a.jpg", &[[0.4, 0.0]])
            .with("b.jpg", &[[5.0, 0.0]]);

        let report = MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[target(0.0)],
            source.path(),
            out.path(),
            Reporter::silent(),
            &CancellationToken::new(),
        );

        assert_eq!(report.state, ScanState::Completed);
        assert_eq!(report.candidates, 2);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.no_match, 1);
        assert!((report.matches[0].distance - 0.4).abs() < 1e-9);
        assert_eq!(copied_names(out.path()), vec!["a.jpg"]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let source = source_tree(&["edge.png"]);
        let out = TempDir::new().unwrap();
        let embedder = FakeEmbedder::default().with("edge.png", &[[0.5, 0.0]]);

        let report = MatchScanner::new(&embedder, MatchConfig::default().with_threshold(0.5)).scan(
            &[target(0.0)],
            source.path(),
            out.path(),
            Reporter::silent(),
            &CancellationToken::new(),
        );
        assert_eq!(report.matches.len(), 1);
    }

    #[test]
    fn one_copy_even_when_several_faces_match() {
        let source = source_tree(&["party.jpg"]);
        let out = TempDir::new().unwrap();
        let embedder =
            FakeEmbedder::default().with("party.jpg", &[[0.1, 0.0], [1.0, 0.0], [0.0, 0.0]]);

        let report = MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[target(0.0), target(1.0)],
            source.path(),
            out.path(),
            Reporter::silent(),
            &CancellationToken::new(),
        );

        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].matched_target, PathBuf::from("target_0.jpg"));
        assert_eq!(copied_names(out.path()), vec!["party.jpg"]);
    }

    #[test]
    fn embedding_errors_do_not_stop_the_scan() {
        let source = source_tree(&["a.jpg", "broken.jpg", "c.jpg"]);
        let out = TempDir::new().unwrap();
        let embedder = FakeEmbedder::default()
            .with("a.jpg", &[[0.0, 0.0]])
            .with("c.jpg", &[[0.0, 0.1]]);

        let report = MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[target(0.0)],
            source.path(),
            out.path(),
            Reporter::silent(),
            &CancellationToken::new(),
        );

        assert_eq!(report.state, ScanState::Completed);
        assert_eq!(report.errored, 1);
        assert_eq!(report.matches.len(), 2);
    }

    #[test]
    fn only_whitelisted_extensions_are_candidates() {
        let source = source_tree(&["a.JPG", "b.gif", "notes.txt", "c.tiff"]);
        let out = TempDir::new().unwrap();
        let embedder = FakeEmbedder::default()
            .with("a.JPG", &[])
            .with("c.tiff", &[]);

        let report = MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[target(0.0)],
            source.path(),
            out.path(),
            Reporter::silent(),
            &CancellationToken::new(),
        );

        assert_eq!(report.candidates, 2);
        assert_eq!(report.no_match, 2);
        assert_eq!(report.errored, 0);
    }

    #[test]
    fn output_inside_source_is_not_rescanned() {
        let source = source_tree(&["a.jpg", "Matched/a.jpg"]);
        let out = source.path().join("Matched");
        let embedder = FakeEmbedder::default().with("a.jpg", &[[0.0, 0.0]]);

        let report = MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[target(0.0)],
            source.path(),
            &out,
            Reporter::silent(),
            &CancellationToken::new(),
        );

        assert_eq!(report.candidates, 1);
        assert_eq!(copied_names(&out), vec!["a.jpg", "a_1.jpg"]);
    }

    #[test]
    fn output_given_with_dot_dot_is_not_rescanned() {
        let source = source_tree(&["a.jpg", "x/keep.txt", "Matched/a.jpg"]);
        let out = source.path().join("x").join("..").join("Matched");
        let embedder = FakeEmbedder::default().with("a.jpg", &[[0.0, 0.0]]);

        let report = MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[target(0.0)],
            source.path(),
            &out,
            Reporter::silent(),
            &CancellationToken::new(),
        );

        assert_eq!(report.candidates, 1);
        assert_eq!(report.matches.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_images_are_candidates() {
        let source = source_tree(&["real.jpg"]);
        std::os::unix::fs::symlink(
            source.path().join("real.jpg"),
            source.path().join("link.jpg"),
        )
        .unwrap();
        let out = TempDir::new().unwrap();
        let embedder = FakeEmbedder::default()
            .with("real.jpg", &[[0.0, 0.0]])
            .with("link.jpg", &[[0.0, 0.0]]);

        let report = MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[target(0.0)],
            source.path(),
            out.path(),
            Reporter::silent(),
            &CancellationToken::new(),
        );

        assert_eq!(report.candidates, 2);
        assert_eq!(copied_names(out.path()), vec!["link.jpg", "real.jpg"]);
    }

    /// Deletes each image while embedding it
    struct VanishingEmbedder;

    impl FaceEmbedder for VanishingEmbedder {
        fn embed(&self, image: &Path) -> Result<Vec<FaceEncoding>, EmbedError> {
            fs::remove_file(image).unwrap();
            Ok(vec![FaceEncoding::new(vec![0.0, 0.0])])
        }
    }

    #[test]
    fn candidate_removed_before_copy_is_an_item_error() {
        let source = source_tree(&["gone.jpg"]);
        let out = source.path().join("Matched");

        let report = MatchScanner::new(&VanishingEmbedder, MatchConfig::default()).scan(
            &[target(0.0)],
            source.path(),
            &out,
            Reporter::silent(),
            &CancellationToken::new(),
        );

        assert_eq!(report.errored, 1);
        assert!(report.matches.is_empty());
        assert!(copied_names(&out).is_empty());
    }

    #[test]
    fn no_targets_ends_early() {
        let source = source_tree(&["a.jpg"]);
        let out = TempDir::new().unwrap();
        let embedder = FakeEmbedder::default();

        let report = MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[],
            source.path(),
            out.path(),
            Reporter::silent(),
            &CancellationToken::new(),
        );

        assert_eq!(report.state, ScanState::EndedEarly(FailureKind::NoUsableInput));
        assert_eq!(report.candidates, 0);
    }

    #[test]
    fn invalid_source_root_ends_early() {
        let out = TempDir::new().unwrap();
        let embedder = FakeEmbedder::default();

        let report = MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[target(0.0)],
            &out.path().join("missing"),
            out.path(),
            Reporter::silent(),
            &CancellationToken::new(),
        );
        assert_eq!(report.state, ScanState::EndedEarly(FailureKind::InvalidRoot));
    }

    #[test]
    fn empty_source_logs_and_completes() {
        let source = source_tree(&["readme.txt"]);
        let out = TempDir::new().unwrap();
        let embedder = FakeEmbedder::default();
        let lines = Mutex::new(Vec::new());
        let observer = |entry: LogEntry| lines.lock().unwrap().push(entry);

        let report = MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[target(0.0)],
            source.path(),
            out.path(),
            Reporter::new(None, Some(&observer)),
            &CancellationToken::new(),
        );

        assert_eq!(report.state, ScanState::Completed);
        let lines = lines.into_inner().unwrap();
        assert!(lines
            .iter()
            .any(|e| e.message == "No images found in source folder."
                && e.kind == Some(FailureKind::NoUsableInput)));
    }

    #[test]
    fn progress_reaches_100_once_per_candidate() {
        let source = source_tree(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
        let out = TempDir::new().unwrap();
        let embedder = FakeEmbedder::default()
            .with("a.jpg", &[])
            .with("b.jpg", &[])
            .with("c.jpg", &[])
            .with("d.jpg", &[]);
        let updates = Mutex::new(Vec::new());
        let observer = |update: ProgressUpdate| updates.lock().unwrap().push(update.percent);

        MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[target(0.0)],
            source.path(),
            out.path(),
            Reporter::new(Some(&observer), None),
            &CancellationToken::new(),
        );

        assert_eq!(updates.into_inner().unwrap(), vec![25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn run_stops_without_target_faces() {
        let source = source_tree(&["a.jpg"]);
        let out = TempDir::new().unwrap();
        let embedder = FakeEmbedder::default()
            .with("me.jpg", &[])
            .with("a.jpg", &[[0.0, 0.0]]);

        let report = MatchScanner::new(&embedder, MatchConfig::default()).run(
            &[PathBuf::from("me.jpg")],
            source.path(),
            out.path(),
            Reporter::silent(),
            &CancellationToken::new(),
        );

        assert_eq!(report.state, ScanState::EndedEarly(FailureKind::NoUsableInput));
        assert!(copied_names(out.path()).is_empty());
    }

    #[test]
    fn cancelled_scan_copies_nothing() {
        let source = source_tree(&["a.jpg"]);
        let out = TempDir::new().unwrap();
        let embedder = FakeEmbedder::default().with("a.jpg", &[[0.0, 0.0]]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = MatchScanner::new(&embedder, MatchConfig::default()).scan(
            &[target(0.0)],
            source.path(),
            out.path(),
            Reporter::silent(),
            &cancel,
        );

        assert_eq!(report.state, ScanState::Cancelled);
        assert!(report.matches.is_empty());
    }
}
