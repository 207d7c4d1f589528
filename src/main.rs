//! # media-sort CLI
//!
//! Command-line interface for the media sorter.
//!
//! ## Usage
//! ```bash
//! media-sort run ~/unsorted_photos ~/sorted_photos
//! media-sort run ~/unsorted_photos ~/sorted_photos --workers 8 --output json
//! ```

mod cli;

use media_sorter::Result;

fn main() -> Result<()> {
    cli::run()
}
