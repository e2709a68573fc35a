//! # Error Module
//!
//! Error types for the cover gallery tools.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Isolate per-file failures** - only directory errors abort a run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Rename error: {0}")]
    Rename(#[from] RenameError),

    #[error("Used store error: {0}")]
    Store(#[from] StoreError),

    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while listing the target directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors for a single file during a rename run (never fatal to the run)
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Refusing to overwrite existing file {target}")]
    TargetExists { target: PathBuf },

    #[error("Failed to rename {from} to {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while persisting the used-marker file
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write used file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize used markers: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("No image named {name} in this folder")]
    UnknownImage { name: String },
}

/// Errors that occur while converting HEIC/HEIF images
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Image not found: {name}")]
    NotFound { name: String },

    #[error("Invalid file name: {name} (must be a plain name inside the folder)")]
    InvalidName { name: String },

    #[error("Not an image: {name}")]
    NotAnImage { name: String },

    #[error("Not HEIC/HEIF (detected: {detected})")]
    NotHeic { detected: String },

    #[error("No HEIC converter available. Install one of: {tried}")]
    ToolUnavailable { tried: String },

    #[error("{tool} failed to convert {input}: {message}")]
    ToolFailed {
        tool: String,
        input: PathBuf,
        message: String,
    },

    #[error("Unable to find a free name for {name}")]
    NoUniqueName { name: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to update used markers: {0}")]
    Store(#[from] StoreError),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, GalleryError>;
