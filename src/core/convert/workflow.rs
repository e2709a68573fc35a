//! The HEIC to JPEG conversion workflow.

use super::ImageConverter;
use crate::core::gallery::{resolve_name, store_key};
use crate::core::scanner::ImageFilter;
use crate::core::sniff::{sniff_file, DetectedFormat};
use crate::core::used::UsedStore;
use crate::error::ConvertError;
use crate::events::{ConvertEvent, Event, EventSender};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Folder (inside the gallery folder) that keeps replaced originals
pub const ORIGINALS_DIR: &str = ".originals";

const MAX_UNIQUE_ATTEMPTS: u32 = 10_000;

/// Outcome of a successful conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// The file the converter read (the moved original for mislabeled JPEGs)
    pub input: PathBuf,
    /// Name of the JPEG inside the gallery folder
    pub output_name: String,
    pub detected: DetectedFormat,
}

/// A path in `folder` for `name` that does not exist yet.
///
/// Tries `name` itself, then `<stem>.1<suffix>`, `<stem>.2<suffix>` and so on.
pub fn unique_path(folder: &Path, name: &str) -> Result<PathBuf, ConvertError> {
    let candidate = folder.join(name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = candidate
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..MAX_UNIQUE_ATTEMPTS)
        .map(|i| folder.join(format!("{}.{}{}", stem, i, suffix)))
        .find(|p| !p.exists())
        .ok_or_else(|| ConvertError::NoUniqueName {
            name: name.to_string(),
        })
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ConvertError + '_ {
    move |source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// A mislabeled original parked in `.originals/` during conversion
struct MovedOriginal {
    parked: PathBuf,
    home: PathBuf,
}

impl MovedOriginal {
    /// Put the original back if its old name is still free
    fn restore(&self, events: &EventSender) {
        if self.home.exists() || !self.parked.exists() {
            return;
        }
        match fs::rename(&self.parked, &self.home) {
            Ok(()) => {
                tracing::info!(
                    path = %self.home.display(),
                    "restored original after failed conversion"
                );
                events.send(Event::Convert(ConvertEvent::Restored {
                    path: self.home.clone(),
                }));
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.parked.display(),
                    error = %e,
                    "could not restore original"
                );
            }
        }
    }
}

/// Convert the HEIC/HEIF image `name` in `folder` to a JPEG.
///
/// A file named `.jpg`/`.jpeg` that really holds HEIC is moved to
/// `.originals/<base>.heic` (or `.heif`) and the JPEG is written back as
/// `<base>.jpg`. A real `.heic`/`.heif` file stays put and gains a
/// `<base>.jpg` sibling. Existing files are never replaced: a taken
/// `<base>.jpg` makes the output `<base>.1.jpg` and so on. Whenever the
/// JPEG ends up under a different name, the used marker follows it.
pub fn convert_heic_to_jpg(
    folder: &Path,
    store: &mut UsedStore,
    name: &str,
    converter: &dyn ImageConverter,
    events: &EventSender,
) -> Result<ConversionResult, ConvertError> {
    let file_path = resolve_name(folder, name).ok_or_else(|| ConvertError::InvalidName {
        name: name.to_string(),
    })?;
    if !file_path.is_file() {
        return Err(ConvertError::NotFound {
            name: name.to_string(),
        });
    }
    if !ImageFilter::for_gallery().should_include(&file_path) {
        return Err(ConvertError::NotAnImage {
            name: name.to_string(),
        });
    }

    let detected = sniff_file(&file_path);
    if !detected.is_heif_family() {
        return Err(ConvertError::NotHeic {
            detected: detected.to_string(),
        });
    }

    let originals_dir = folder.join(ORIGINALS_DIR);
    fs::create_dir_all(&originals_dir).map_err(io_err(&originals_dir))?;

    let parent = file_path.parent().unwrap_or(folder).to_path_buf();
    let base = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = file_path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let mislabeled = ext == "jpg" || ext == "jpeg";

    let (input, moved) = if mislabeled {
        let corrected_ext = if detected == DetectedFormat::Heic { "heic" } else { "heif" };
        let parked = unique_path(&originals_dir, &format!("{}.{}", base, corrected_ext))?;
        fs::rename(&file_path, &parked).map_err(io_err(&file_path))?;
        tracing::debug!(
            from = %file_path.display(),
            to = %parked.display(),
            "parked mislabeled original"
        );

        let moved = MovedOriginal {
            parked: parked.clone(),
            home: file_path.clone(),
        };
        (parked, Some(moved))
    } else {
        (file_path.clone(), None)
    };

    events.send(Event::Convert(ConvertEvent::Started {
        input: input.clone(),
        tool: converter.name().to_string(),
    }));

    // A parked original has freed its own name; any other `<base>.jpg` stays
    let outcome = unique_path(&parent, &format!("{}.jpg", base)).and_then(|final_output| {
        write_jpeg(converter, &input, &final_output, &originals_dir, &base).map(|()| final_output)
    });
    let final_output = match outcome {
        Ok(final_output) => final_output,
        Err(e) => {
            if let Some(moved) = &moved {
                moved.restore(events);
            }
            return Err(e);
        }
    };

    let output_name = final_output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let key = store_key(name);
    let new_name = Path::new(&key)
        .with_file_name(&output_name)
        .to_string_lossy()
        .into_owned();
    if new_name != key {
        let renames = HashMap::from([(key, new_name)]);
        store.apply_renames(&renames)?;
    }

    tracing::info!(input = %input.display(), output = %output_name, %detected, "converted to JPEG");
    events.send(Event::Convert(ConvertEvent::Completed {
        output_name: output_name.clone(),
    }));

    Ok(ConversionResult {
        input,
        output_name,
        detected,
    })
}

/// Convert into a temporary file in `.originals/`, then move it into place.
fn write_jpeg(
    converter: &dyn ImageConverter,
    input: &Path,
    final_output: &Path,
    originals_dir: &Path,
    base: &str,
) -> Result<(), ConvertError> {
    // Removed on drop unless persisted
    let tmp = tempfile::Builder::new()
        .prefix(&format!("{}.converted", base))
        .suffix(".jpg")
        .tempfile_in(originals_dir)
        .map_err(io_err(originals_dir))?
        .into_temp_path();

    converter.convert(input, &tmp)?;

    tmp.persist_noclobber(final_output).map_err(|e| ConvertError::Io {
        path: final_output.to_path_buf(),
        source: e.error,
    })
}
