//! # Scanner Module
//!
//! Lists the images directly inside a single directory.
//!
//! ## Recognized Extensions
//! - Renaming: `.jpg .jpeg .png .gif .bmp .webp .heif`
//! - Gallery listing: the above plus `.heic`
//!
//! Matching is case-insensitive; the extension keeps its on-disk case in
//! [`ImageFile::extension`].
//!
//! ## Example
//! ```rust,ignore
//! use cover_gallery::core::scanner::DirectoryScanner;
//!
//! let images = DirectoryScanner::default().scan("/covers".as_ref())?;
//! ```

mod filter;
mod walker;

pub use filter::{ImageFilter, EXCLUDED_SUFFIXES, GALLERY_EXTENSIONS, RENAME_EXTENSIONS};
pub use walker::{DirectoryScanner, ScanConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One image file found in the target directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// File name including extension
    pub name: String,
    /// File name without extension
    pub base_name: String,
    /// Extension with its leading dot, case as on disk
    pub extension: String,
    /// Full path to the file
    pub full_path: PathBuf,
}

impl ImageFile {
    /// Split a path into its name parts.
    ///
    /// Returns `None` for names without an extension or that are not valid UTF-8.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        let base_name = path.file_stem()?.to_str()?.to_string();
        let extension = format!(".{}", path.extension()?.to_str()?);

        Some(Self {
            name,
            base_name,
            extension,
            full_path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_file_splits_name() {
        let image = ImageFile::from_path(Path::new("/covers/holiday.JPG")).unwrap();
        assert_eq!(image.name, "holiday.JPG");
        assert_eq!(image.base_name, "holiday");
        assert_eq!(image.extension, ".JPG");
    }

    #[test]
    fn image_file_keeps_inner_dots_in_base_name() {
        let image = ImageFile::from_path(Path::new("cover.v2.png")).unwrap();
        assert_eq!(image.base_name, "cover.v2");
        assert_eq!(image.extension, ".png");
    }

    #[test]
    fn dotfile_without_extension_is_rejected() {
        assert!(ImageFile::from_path(Path::new(".jpg")).is_none());
        assert!(ImageFile::from_path(Path::new("README")).is_none());
    }
}
