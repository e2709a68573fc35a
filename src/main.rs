//! # cover-gallery CLI
//!
//! Command-line interface for the cover gallery tools.
//!
//! ## Usage
//! ```bash
//! cover-gallery rename ~/Covers
//! cover-gallery list ~/Covers --output json
//! cover-gallery convert IMG_0042.jpg --dir ~/Covers
//! ```

mod cli;

use cover_gallery::Result;

fn main() -> Result<()> {
    cli::run()
}
