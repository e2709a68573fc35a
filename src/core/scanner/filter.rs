//! File filtering logic for the scanner.

use std::path::Path;

/// Extensions the renamer works on, in processing order.
pub const RENAME_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "heif"];

/// Extensions shown by the gallery listing. HEIC is listed so it can be
/// spotted and converted, but is never renumbered.
pub const GALLERY_EXTENSIONS: [&str; 8] =
    ["jpg", "jpeg", "png", "gif", "bmp", "webp", "heif", "heic"];

/// Companion scripts that may live next to the images and must never be renamed.
pub const EXCLUDED_SUFFIXES: [&str; 2] = [".ps1", ".py"];

/// Decides which files in a directory are images, and which extension
/// group each one belongs to.
#[derive(Debug, Clone)]
pub struct ImageFilter {
    /// Lower-case extensions without the dot, in group order
    extensions: Vec<String>,
    /// Lower-case file name suffixes that are never touched
    excluded_suffixes: Vec<String>,
}

impl ImageFilter {
    /// Filter over the fixed rename extension list
    pub fn for_renaming() -> Self {
        Self::from_lists(&RENAME_EXTENSIONS, &EXCLUDED_SUFFIXES)
    }

    /// Filter over every extension the gallery displays
    pub fn for_gallery() -> Self {
        Self::from_lists(&GALLERY_EXTENSIONS, &EXCLUDED_SUFFIXES)
    }

    fn from_lists(extensions: &[&str], excluded: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            excluded_suffixes: excluded.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Index of the extension group a path belongs to, if any.
    ///
    /// Matching is case-insensitive: `A.JPG` is in the `jpg` group.
    pub fn group_of(&self, path: &Path) -> Option<usize> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        self.extensions.iter().position(|e| *e == ext)
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        self.group_of(path).is_some()
    }

    /// Whether a file name is on the companion-script exclusion list
    pub fn is_excluded(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.excluded_suffixes.iter().any(|s| lower.ends_with(s.as_str()))
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::for_renaming()
    }
}
