//! # Gallery Module
//!
//! Lists the covers in a folder together with what the gallery needs to
//! show them: size, modification time, real format and used state.

use crate::core::scanner::{DirectoryScanner, ImageFilter, ScanConfig};
use crate::core::sniff::{content_type, sniff_file, DetectedFormat};
use crate::core::used::UsedStore;
use crate::error::{ScanError, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

/// One listed cover image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub name: String,
    /// File size in bytes
    pub size: u64,
    /// Modification time in seconds since the Unix epoch
    pub mtime: f64,
    /// Lower-case extension with its leading dot
    pub ext: String,
    pub detected_format: DetectedFormat,
    /// MIME type to serve the bytes with
    pub content_type: String,
    pub used: bool,
    /// The bytes are HEIC/HEIF, which browsers mostly cannot preview
    pub browser_maybe_unsupported: bool,
}

/// Resolve a user supplied name inside `folder`.
///
/// Returns `None` for empty names, absolute paths and anything containing
/// `..`, so the result never points outside the folder.
pub fn resolve_name(folder: &Path, name: &str) -> Option<PathBuf> {
    let rel = Path::new(name);
    let plain = !name.is_empty()
        && rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    plain.then(|| folder.join(rel))
}

/// The key a name is stored under in the used-marker file: `./3.jpg` and
/// `3.jpg` are the same image.
pub fn store_key(name: &str) -> String {
    Path::new(name)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

/// Mark or unmark an image in `folder` as used.
///
/// The name must resolve to an existing image file inside the folder.
pub fn mark_image(
    folder: &Path,
    store: &mut UsedStore,
    name: &str,
    used: bool,
) -> Result<(), StoreError> {
    let is_image = resolve_name(folder, name)
        .map(|path| path.is_file() && ImageFilter::for_gallery().should_include(&path))
        .unwrap_or(false);

    if !is_image {
        return Err(StoreError::UnknownImage {
            name: name.to_string(),
        });
    }

    let key = store_key(name);
    tracing::debug!(name = %key, used, "updating used marker");
    store.mark(&key, used)
}

/// List the images in `folder`, sorted case-insensitively by name.
///
/// With `only_unused`, images marked in `store` are left out.
pub fn list_images(
    folder: &Path,
    store: &UsedStore,
    only_unused: bool,
) -> Result<Vec<ImageInfo>, ScanError> {
    let scanner = DirectoryScanner::new(ScanConfig::default(), ImageFilter::for_gallery());
    let mut images = scanner.scan(folder)?;
    images.sort_by_cached_key(|image| image.name.to_lowercase());

    let mut items = Vec::with_capacity(images.len());
    for image in images {
        let used = store.is_used(&image.name);
        if only_unused && used {
            continue;
        }

        let metadata = match fs::metadata(&image.full_path) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(name = %image.name, error = %e, "cannot stat image, leaving it out");
                continue;
            }
        };
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        let detected_format = sniff_file(&image.full_path);
        let ext = image.extension.to_lowercase();
        items.push(ImageInfo {
            size: metadata.len(),
            mtime,
            content_type: content_type(detected_format, &ext).to_string(),
            ext,
            browser_maybe_unsupported: detected_format.is_heif_family(),
            detected_format,
            used,
            name: image.name,
        });
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::used::DEFAULT_USED_FILE;
    use tempfile::TempDir;

    const JPEG_HEADER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];
    const HEIC_HEADER: &[u8] = b"\x00\x00\x00\x18ftypheic\x00\x00\x00\x00";

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) {
        fs::write(dir.path().join(name), bytes).unwrap();
    }

    #[test]
    fn lists_images_sorted_case_insensitively() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.jpg", &JPEG_HEADER);
        write(&dir, "A.png", b"\x89PNG\r\n\x1a\n");
        write(&dir, "notes.txt", b"hello");
        let store = UsedStore::in_folder(dir.path(), DEFAULT_USED_FILE);

        let items = list_images(dir.path(), &store, false).unwrap();

        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["A.png", "b.jpg"]);
        assert_eq!(items[0].detected_format, DetectedFormat::Png);
        assert_eq!(items[1].size, 4);
    }

    #[test]
    fn flags_heic_hidden_behind_jpg_extension() {
        let dir = TempDir::new().unwrap();
        write(&dir, "IMG_0001.JPG", HEIC_HEADER);
        write(&dir, "real.heic", HEIC_HEADER);
        let store = UsedStore::in_folder(dir.path(), DEFAULT_USED_FILE);

        let items = list_images(dir.path(), &store, false).unwrap();

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.browser_maybe_unsupported));
        assert_eq!(items[0].ext, ".jpg");
        assert_eq!(items[0].detected_format, DetectedFormat::Heic);
        assert_eq!(items[0].content_type, "image/heic");
    }

    #[test]
    fn only_unused_hides_marked_images() {
        let dir = TempDir::new().unwrap();
        write(&dir, "1.jpg", &JPEG_HEADER);
        write(&dir, "2.jpg", &JPEG_HEADER);
        let mut store = UsedStore::in_folder(dir.path(), DEFAULT_USED_FILE);
        store.mark("1.jpg", true).unwrap();

        let all = list_images(dir.path(), &store, false).unwrap();
        let unused = list_images(dir.path(), &store, true).unwrap();

        assert_eq!(all.len(), 2);
        assert!(all[0].used);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].name, "2.jpg");
    }

    #[test]
    fn resolve_name_rejects_escapes() {
        let root = Path::new("/covers");
        assert!(resolve_name(root, "../etc/passwd").is_none());
        assert!(resolve_name(root, "/etc/passwd").is_none());
        assert!(resolve_name(root, "").is_none());
        assert!(resolve_name(root, "a/../../b.jpg").is_none());
        assert_eq!(resolve_name(root, "1.jpg"), Some(PathBuf::from("/covers/1.jpg")));
    }

    #[test]
    fn mark_image_requires_an_existing_image() {
        let dir = TempDir::new().unwrap();
        write(&dir, "1.jpg", &JPEG_HEADER);
        write(&dir, "notes.txt", b"hello");
        let mut store = UsedStore::in_folder(dir.path(), DEFAULT_USED_FILE);

        mark_image(dir.path(), &mut store, "1.jpg", true).unwrap();
        assert!(store.is_used("1.jpg"));

        for name in ["notes.txt", "missing.jpg", "../1.jpg"] {
            let result = mark_image(dir.path(), &mut store, name, true);
            assert!(matches!(result, Err(StoreError::UnknownImage { .. })));
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn dotted_names_are_marked_under_the_plain_name() {
        let dir = TempDir::new().unwrap();
        write(&dir, "3.jpg", &JPEG_HEADER);
        let mut store = UsedStore::in_folder(dir.path(), DEFAULT_USED_FILE);

        mark_image(dir.path(), &mut store, "./3.jpg", true).unwrap();

        assert!(store.is_used("3.jpg"));
        assert!(!store.is_used("./3.jpg"));
        let items = list_images(dir.path(), &store, false).unwrap();
        assert!(items[0].used);

        mark_image(dir.path(), &mut store, "3.jpg", false).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn store_key_drops_current_dir_components() {
        assert_eq!(store_key("./3.jpg"), "3.jpg");
        assert_eq!(store_key("a/./b.jpg"), "a/b.jpg");
        assert_eq!(store_key("b.jpg"), "b.jpg");
    }

    #[test]
    fn missing_folder_is_an_error() {
        let store = UsedStore::open("/nonexistent/.cover-used.json");
        let result = list_images(Path::new("/nonexistent/covers"), &store, false);
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}
