//! # Core Module
//!
//! The UI-agnostic engine.
//!
//! ## Modules
//! - `scanner` - Lists the images in one directory
//! - `rename` - Sequential numeric renaming
//! - `sniff` - Detects real image formats from magic bytes
//! - `used` - Persists which covers have been used
//! - `gallery` - Lists covers with format and used state
//! - `convert` - HEIC/HEIF to JPEG conversion

pub mod convert;
pub mod gallery;
pub mod rename;
pub mod scanner;
pub mod sniff;
pub mod used;

// Re-export commonly used types
pub use gallery::ImageInfo;
pub use rename::{RenameReport, Renamer};
pub use scanner::ImageFile;
pub use sniff::DetectedFormat;
pub use used::UsedStore;
