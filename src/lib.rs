//! # Cover Gallery
//!
//! Keeps a local folder of cover images tidy.
//!
//! ## What It Does
//! - **Renumber** - gives every image a short numeric name (`1.jpg`,
//!   `2.png`, ...) without ever overwriting a file
//! - **Track usage** - remembers which covers were already used
//! - **Fix HEIC** - converts HEIC/HEIF images (even ones hiding behind a
//!   `.jpg` name) into real JPEGs
//!
//! ## Architecture
//! - `core` - The engine (no terminal output)
//! - `events` - Progress reporting over a channel
//! - `error` - Error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{GalleryError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` over `warn`.
/// Logs go to stderr so they never mix with JSON output.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    // A subscriber set earlier (e.g. by an embedding application) stays in place
    let _ = tracing::subscriber::set_global_default(subscriber);
}
