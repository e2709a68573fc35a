//! # Convert Module
//!
//! Turns HEIC/HEIF covers into real JPEGs.
//!
//! Decoding HEIC is left to a platform tool (`sips` on macOS, libheif's
//! `heif-convert`, or ImageMagick) behind the [`ImageConverter`] trait; this
//! module owns the file shuffling around it:
//! - mislabeled `.jpg` files are moved to `.originals/` with the right
//!   extension and the JPEG takes their place
//! - real `.heic`/`.heif` files get a `<base>.jpg` sibling
//! - a failed conversion puts a moved original back

mod command;
mod workflow;

pub use command::{CommandConverter, ConverterTool};
pub use workflow::{convert_heic_to_jpg, unique_path, ConversionResult, ORIGINALS_DIR};

use crate::error::ConvertError;
use std::path::Path;

/// Synchronous image transcoding
pub trait ImageConverter {
    /// Short name used in progress output
    fn name(&self) -> &str;

    /// Decode `input` and write a JPEG to `output`, replacing it if present
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;
}
