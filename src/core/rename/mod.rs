//! # Rename Module
//!
//! Sequential renaming of the images in one directory.
//!
//! ## Rules
//! - A base name of at most six ASCII digits is canonical and never renamed
//! - The counter starts one past the largest all-digit name below 1,000,000
//! - Every other image becomes `<n><original extension>` where `n` is the
//!   smallest free number not below the counter
//! - Existing files are never overwritten
//!
//! ## Example
//! ```rust,ignore
//! use cover_gallery::core::rename::Renamer;
//!
//! let report = Renamer::builder("/covers").dry_run(true).build().run()?;
//! for r in &report.renamed {
//!     println!("{} -> {}", r.from, r.to);
//! }
//! ```

mod allocator;
mod canonical;
mod executor;
mod types;

pub use allocator::NumberAllocator;
pub use canonical::{is_canonical, max_num, seed_value, MAX_CANONICAL_DIGITS, SEED_LIMIT};
pub use executor::{FileOps, LocalFs, Renamer, RenamerBuilder};
pub use types::*;
