//! # CLI Module
//!
//! Command-line interface for media discovery and face matching.
//!
//! ## Usage
//! ```bash
//! # Catalog every photo and video under a folder
//! media-tools discover ~/Pictures
//!
//! # With custom state files
//! media-tools discover ~/Pictures --catalog ./media.json --history ./scans.json
//!
//! # List past scans
//! media-tools history --limit 10 --json
//!
//! # Copy every photo showing the target faces into ~/Sorted/Matched
//! media-tools face-match --target me.jpg --target mum.jpg --source ~/Pictures --dest ~/Sorted
//! ```

use clap::{Parser, Subcommand};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_tools::core::cancel::CancellationToken;
use media_tools::core::catalog::CatalogLock;
use media_tools::core::faces::{
    MatchConfig, MatchReport, MatchScanner, ScanState, SidecarEmbedder, DEFAULT_MATCH_THRESHOLD,
    MATCHED_FOLDER,
};
use media_tools::core::history::{read_history, ScanRecord};
use media_tools::core::pipeline::{
    format_elapsed, Discovery, DiscoveryConfig, DiscoveryOutcome, DiscoverySummary,
    DEFAULT_HISTORY_FILE,
};
use media_tools::core::scanner::ClassificationTables;
use media_tools::error::{CatalogError, FailureKind, MatchError, Result, ScanError};
use media_tools::events::{Event, EventChannel, EventReceiver, LogEntry, LogLevel, Reporter};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Events buffered between the worker and the renderer
const EVENT_BUFFER: usize = 1024;

/// Media Tools - Catalog your media and find the people in it
#[derive(Parser, Debug)]
#[command(name = "media-tools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Catalog the photos and videos under a folder
    Discover {
        /// Folder to scan
        root: PathBuf,

        /// Catalog file (defaults to the user data directory)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Scan history file (defaults to the user data directory)
        #[arg(long)]
        history: Option<PathBuf>,

        /// JSON file overriding the classification tables
        #[arg(long)]
        tables: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List past discovery scans, newest first
    History {
        /// Scan history file (defaults to the user data directory)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Show at most this many scans
        #[arg(short, long)]
        limit: Option<usize>,

        /// JSON output for scripting
        #[arg(long)]
        json: bool,
    },

    /// Copy every photo showing one of the target faces
    FaceMatch {
        /// Photos of the people to look for
        #[arg(long = "target", required = true)]
        targets: Vec<PathBuf>,

        /// Folder to search
        #[arg(long)]
        source: PathBuf,

        /// Matches are copied to <DEST>/Matched
        #[arg(long)]
        dest: PathBuf,

        /// Largest face distance counted as a match (lower = stricter)
        #[arg(short, long, default_value_t = DEFAULT_MATCH_THRESHOLD)]
        threshold: f64,

        /// Ignore target photos showing more than one face
        #[arg(long)]
        single_face: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Discover {
            root,
            catalog,
            history,
            tables,
            verbose,
        } => run_discover(root, catalog, history, tables, verbose),
        Commands::History {
            history,
            limit,
            json,
        } => run_history(history, limit, json),
        Commands::FaceMatch {
            targets,
            source,
            dest,
            threshold,
            single_face,
            verbose,
        } => run_face_match(targets, source, dest, threshold, single_face, verbose),
    }
}

fn run_discover(
    root: PathBuf,
    catalog: Option<PathBuf>,
    history: Option<PathBuf>,
    tables: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, "Media Discovery");

    // With -v, tracing prints every line (debug included) instead of the renderer
    if verbose {
        media_tools::init_tracing(true);
    }

    let mut builder = Discovery::builder();
    if let Some(path) = catalog {
        builder = builder.catalog_path(path);
    }
    if let Some(path) = history {
        builder = builder.history_path(path);
    }
    if let Some(path) = tables {
        builder = builder.tables(ClassificationTables::from_json_file(&path)?);
    }
    let discovery = builder.build();

    let (sender, receiver) = EventChannel::bounded(EVENT_BUFFER);
    let renderer = spawn_renderer(receiver, !verbose);

    let outcome = discovery.run(&root, Reporter::observing(&sender), &CancellationToken::new());

    // Drop sender to signal the renderer to finish
    drop(sender);
    renderer.join().ok();

    match outcome {
        DiscoveryOutcome::Completed(summary) => {
            print_discovery_summary(&term, &summary, discovery.config());
            Ok(())
        }
        DiscoveryOutcome::InvalidRoot => Err(ScanError::InvalidRoot { path: root }.into()),
        DiscoveryOutcome::Busy => Err(CatalogError::Busy {
            lock_path: CatalogLock::lock_path(&discovery.config().catalog_path),
        }
        .into()),
        DiscoveryOutcome::Cancelled => Err(ScanError::Cancelled.into()),
        DiscoveryOutcome::Failed { message } => Err(CatalogError::Write {
            path: discovery.config().catalog_path.clone(),
            source: std::io::Error::other(message),
        }
        .into()),
    }
}

fn run_history(history: Option<PathBuf>, limit: Option<usize>, json: bool) -> Result<()> {
    let path = history
        .unwrap_or_else(|| DiscoveryConfig::default_state_dir().join(DEFAULT_HISTORY_FILE));

    let mut records = read_history(&path);
    records.reverse();
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    if json {
        let output = serde_json::to_string_pretty(&records)
            .map_err(|e| CatalogError::Serialize(e.to_string()))?;
        println!("{}", output);
    } else {
        print_history(&Term::stdout(), &records, &path);
    }

    Ok(())
}

fn run_face_match(
    targets: Vec<PathBuf>,
    source: PathBuf,
    dest: PathBuf,
    threshold: f64,
    single_face: bool,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, "Face Match");

    if verbose {
        media_tools::init_tracing(true);
    }

    let output_dir = dest.join(MATCHED_FOLDER);
    let config = MatchConfig::default()
        .with_threshold(threshold)
        .with_single_face(single_face);
    let embedder = SidecarEmbedder::new();
    let scanner = MatchScanner::new(&embedder, config);

    let (sender, receiver) = EventChannel::bounded(EVENT_BUFFER);
    let renderer = spawn_renderer(receiver, !verbose);

    let report = scanner.run(
        &targets,
        &source,
        &output_dir,
        Reporter::observing(&sender),
        &CancellationToken::new(),
    );

    drop(sender);
    renderer.join().ok();

    match report.state {
        ScanState::Completed => {
            print_match_summary(&term, &report, &output_dir);
            Ok(())
        }
        // Already explained by the log; nothing to match is not a failure
        ScanState::EndedEarly(FailureKind::NoUsableInput) => Ok(()),
        ScanState::EndedEarly(FailureKind::StateUnavailable) => Err(MatchError::OutputUnavailable {
            path: output_dir,
            source: std::io::Error::other("could not create the folder"),
        }
        .into()),
        ScanState::EndedEarly(_) => Err(ScanError::InvalidRoot { path: source }.into()),
        ScanState::Cancelled => Err(ScanError::Cancelled.into()),
    }
}

/// Render progress and log events until every sender is gone
fn spawn_renderer(receiver: EventReceiver, show_logs: bool) -> JoinHandle<()> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Progress(update) => pb.set_position(update.percent.round() as u64),
                Event::Log(entry) if show_logs && entry.level > LogLevel::Debug => {
                    pb.println(render_log(&entry));
                }
                Event::Log(_) => {}
            }
        }
        pb.finish_and_clear();
    })
}

fn render_log(entry: &LogEntry) -> String {
    let line = entry.to_string();
    match entry.level {
        LogLevel::Error => style(line).red().to_string(),
        LogLevel::Warn => style(line).yellow().to_string(),
        LogLevel::Info | LogLevel::Debug => line,
    }
}

fn print_header(term: &Term, title: &str) {
    term.write_line(&format!(
        "{} {}",
        style(title).bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_discovery_summary(term: &Term, summary: &DiscoverySummary, config: &DiscoveryConfig) {
    term.write_line("").ok();
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} images and {} videos found in {}",
        style(summary.images_found).cyan(),
        style(summary.videos_found).cyan(),
        format_elapsed(summary.elapsed)
    ))
    .ok();

    term.write_line(&format!(
        "  {} junk files ignored, {} folders skipped",
        style(summary.junk_files).dim(),
        style(summary.skipped_directories).dim()
    ))
    .ok();

    if summary.item_errors > 0 {
        term.write_line(&format!(
            "  {} entries could not be read",
            style(summary.item_errors).yellow()
        ))
        .ok();
    }

    term.write_line(&format!(
        "  Catalog now holds {} images and {} videos",
        style(summary.catalog_images).cyan(),
        style(summary.catalog_videos).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {}",
        style(config.catalog_path.display()).dim()
    ))
    .ok();
}

fn print_history(term: &Term, records: &[ScanRecord], path: &Path) {
    if records.is_empty() {
        term.write_line(&format!(
            "No scans recorded in {}",
            style(path.display()).dim()
        ))
        .ok();
        return;
    }

    term.write_line(&format!("{}", style("Scan History:").bold().underlined()))
        .ok();
    term.write_line("").ok();

    for record in records {
        term.write_line(&format!(
            "  {} {}",
            style(record.timestamp.format("%Y-%m-%d %H:%M:%S")).bold(),
            record.root
        ))
        .ok();
        term.write_line(&format!(
            "    {} images, {} videos in {:.2}s  {}",
            style(record.image_count).cyan(),
            style(record.video_count).cyan(),
            record.elapsed_seconds,
            style(record.id).dim()
        ))
        .ok();
    }
}

fn print_match_summary(term: &Term, report: &MatchReport, output_dir: &Path) {
    term.write_line("").ok();
    term.write_line(&format!("{} Face Match Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} images compared against {} target faces",
        style(report.candidates).cyan(),
        style(report.targets).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {} matches copied to {}",
        style(report.matches.len()).green(),
        output_dir.display()
    ))
    .ok();

    if report.errored > 0 {
        term.write_line(&format!(
            "  {} images could not be processed",
            style(report.errored).yellow()
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("Remember: originals are never moved or modified.").dim()
    ))
    .ok();
}
