//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the gallery tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory listing events
    Scan(ScanEvent),
    /// Sequential renaming events
    Rename(RenameEvent),
    /// HEIC conversion events
    Convert(ConvertEvent),
}

/// Events while listing the target directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Listing has started
    Started { path: PathBuf },
    /// A recognized image was found
    ImageFound { path: PathBuf },
    /// Listing completed
    Completed { total_images: usize },
}

/// Events during a rename run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenameEvent {
    /// The counter has been seeded from existing numeric names
    Started { max_num: u64, start_number: u64 },
    /// A file was renamed (or would be, in a dry run)
    Renamed { from: String, to: String },
    /// A file was left alone because it already has a final name
    Skipped { name: String },
    /// Renaming a single file failed; the run continues
    Failed { name: String, message: String },
    /// The run finished
    Completed(RenameSummary),
}

/// Summary of a finished rename run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameSummary {
    /// Number of files renamed successfully
    pub renamed: usize,
    /// Number of files skipped as canonical or excluded
    pub skipped: usize,
    /// Number of files whose rename failed
    pub failed: usize,
    /// Whether the run only planned renames
    pub dry_run: bool,
}

/// Events during a HEIC conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConvertEvent {
    /// The external tool is about to run
    Started { input: PathBuf, tool: String },
    /// Conversion finished
    Completed { output_name: String },
    /// The original was moved back after a failure
    Restored { path: PathBuf },
}
