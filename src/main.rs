//! # media-tools CLI
//!
//! Command-line interface for media discovery and face matching.
//!
//! ## Usage
//! ```bash
//! media-tools discover ~/Pictures
//! media-tools history --limit 5
//! media-tools face-match --target me.jpg --source ~/Pictures --dest ~/Sorted
//! ```

mod cli;

use media_tools::Result;

fn main() -> Result<()> {
    cli::run()
}
