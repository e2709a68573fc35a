//! Single-level directory listing using walkdir.

use super::{filter::ImageFilter, ImageFile};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::path::Path;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether symbolic links pointing at files count as images
    pub include_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_symlinks: true,
        }
    }
}

/// Lists the images directly inside one directory.
///
/// The result is ordered by extension group (the filter's list order) and
/// then by file name, so repeated runs over the same directory see the
/// files in the same order.
pub struct DirectoryScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl DirectoryScanner {
    /// Create a new scanner with the given configuration and filter
    pub fn new(config: ScanConfig, filter: ImageFilter) -> Self {
        Self { config, filter }
    }

    /// The filter this scanner applies
    pub fn filter(&self) -> &ImageFilter {
        &self.filter
    }

    /// List the directory without progress events
    pub fn scan(&self, root: &Path) -> Result<Vec<ImageFile>, ScanError> {
        self.scan_with_events(root, &crate::events::null_sender())
    }

    /// List the directory, reporting each image found.
    ///
    /// Any failure to read the directory is fatal: no partial listing is
    /// returned.
    pub fn scan_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<Vec<ImageFile>, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            path: root.to_path_buf(),
        }));

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        let mut grouped: Vec<(usize, ImageFile)> = Vec::new();

        for entry_result in walker {
            let entry = entry_result.map_err(|e| {
                let path = e.path().map(|p| p.to_path_buf()).unwrap_or_else(|| root.to_path_buf());
                match e.into_io_error() {
                    Some(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                        ScanError::PermissionDenied { path }
                    }
                    Some(io) => ScanError::ReadDirectory { path, source: io },
                    None => ScanError::ReadDirectory {
                        path,
                        source: std::io::Error::other("filesystem loop detected"),
                    },
                }
            })?;

            if entry.path_is_symlink() && !self.config.include_symlinks {
                continue;
            }

            // Follows symlinks; dangling links and directories fall out here
            if !entry.path().is_file() {
                continue;
            }

            let Some(group) = self.filter.group_of(entry.path()) else {
                continue;
            };

            match ImageFile::from_path(entry.path()) {
                Some(image) => {
                    events.send(Event::Scan(ScanEvent::ImageFound {
                        path: image.full_path.clone(),
                    }));
                    grouped.push((group, image));
                }
                None => {
                    tracing::debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
                }
            }
        }

        // Stable: file-name order from walkdir survives inside each group
        grouped.sort_by_key(|(group, _)| *group);
        let images: Vec<ImageFile> = grouped.into_iter().map(|(_, image)| image).collect();

        events.send(Event::Scan(ScanEvent::Completed {
            total_images: images.len(),
        }));

        Ok(images)
    }
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new(ScanConfig::default(), ImageFilter::for_renaming())
    }
}
