//! Types for the rename module.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration for a rename run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameConfig {
    /// Plan the renames without touching the filesystem
    pub dry_run: bool,
}

/// One file that was given a numeric name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedFile {
    pub from: String,
    pub to: String,
    pub number: u64,
}

/// One file whose rename failed and kept its old name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameFailure {
    pub name: String,
    pub target: String,
    pub message: String,
}

/// Outcome of a rename run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameReport {
    pub directory: PathBuf,
    /// Largest numeric name below the seed limit found before renaming
    pub max_num: u64,
    /// First number the counter tried
    pub start_number: u64,
    pub dry_run: bool,
    /// Successful renames, in processing order
    pub renamed: Vec<RenamedFile>,
    /// Files left alone as canonical or excluded
    pub skipped: Vec<String>,
    pub failures: Vec<RenameFailure>,
    pub duration_ms: u64,
}

impl RenameReport {
    /// Number of files renamed successfully
    pub fn renamed_count(&self) -> usize {
        self.renamed.len()
    }

    /// Old name to new name for every successful rename
    pub fn rename_map(&self) -> HashMap<String, String> {
        self.renamed
            .iter()
            .map(|r| (r.from.clone(), r.to.clone()))
            .collect()
    }
}
