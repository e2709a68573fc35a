//! # Used Module
//!
//! Remembers which covers have already been used, in a small JSON file that
//! lives next to the images.
//!
//! ## File Format
//! ```json
//! {
//!   "version": 1,
//!   "used": {
//!     "12.jpg": { "marked_at": "2024-05-01T09:30:00+00:00" }
//!   }
//! }
//! ```
//!
//! A missing or unreadable file is treated as an empty store. Writes go to
//! a `.tmp` sibling first and are then moved over the real file.

use crate::error::StoreError;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Default name of the used-marker file inside the gallery folder
pub const DEFAULT_USED_FILE: &str = ".cover-used.json";

const FORMAT_VERSION: u32 = 1;

/// Marker for one used image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedEntry {
    /// When the image was marked, RFC 3339 in UTC
    #[serde(default)]
    pub marked_at: String,
}

impl UsedEntry {
    fn now() -> Self {
        Self {
            marked_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UsedFile {
    version: u32,
    #[serde(default)]
    used: BTreeMap<String, UsedEntry>,
}

/// The set of used image names, backed by a JSON file
#[derive(Debug)]
pub struct UsedStore {
    path: PathBuf,
    used: BTreeMap<String, UsedEntry>,
}

impl UsedStore {
    /// Open the store at `path`, starting empty if it cannot be read
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let used = Self::load(&path);
        Self { path, used }
    }

    /// Open `<folder>/<file_name>`
    pub fn in_folder(folder: &Path, file_name: &str) -> Self {
        Self::open(folder.join(file_name))
    }

    fn load(path: &Path) -> BTreeMap<String, UsedEntry> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "cannot read used file, starting empty"
                );
                return BTreeMap::new();
            }
        };

        match serde_json::from_str::<UsedFile>(&content) {
            Ok(file) => file.used,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "used file is malformed, starting empty"
                );
                BTreeMap::new()
            }
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `name` is marked as used
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains_key(name)
    }

    /// The marker for `name`, if any
    pub fn entry(&self, name: &str) -> Option<&UsedEntry> {
        self.used.get(name)
    }

    /// Number of used images
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// Whether nothing is marked
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Mark or unmark `name` and persist immediately
    pub fn mark(&mut self, name: &str, used: bool) -> Result<(), StoreError> {
        if used {
            self.used.insert(name.to_string(), UsedEntry::now());
        } else {
            self.used.remove(name);
        }
        self.save()
    }

    /// Carry markers over to new names.
    ///
    /// When the new name already has its own marker, the old one is
    /// dropped. Saves only if something changed, and returns whether it did.
    pub fn apply_renames(&mut self, renames: &HashMap<String, String>) -> Result<bool, StoreError> {
        let mut updated = false;

        for (old, new) in renames {
            if old == new {
                continue;
            }
            let Some(entry) = self.used.remove(old) else {
                continue;
            };
            if !self.used.contains_key(new) {
                self.used.insert(new.clone(), entry);
            }
            updated = true;
        }

        if updated {
            self.save()?;
        }
        Ok(updated)
    }

    fn save(&self) -> Result<(), StoreError> {
        let payload = UsedFile {
            version: FORMAT_VERSION,
            used: self.used.clone(),
        };
        let mut json = serde_json::to_string_pretty(&payload)?;
        json.push('\n');

        let mut tmp_name = self.path.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);

        fs::write(&tmp, json).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
