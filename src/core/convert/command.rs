//! Converters that shell out to an installed image tool.

use super::ImageConverter;
use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// JPEG quality passed to tools that accept one
const JPEG_QUALITY: &str = "92";

/// External programs that can decode HEIC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConverterTool {
    /// macOS built-in `sips`
    Sips,
    /// `heif-convert` from libheif
    HeifConvert,
    /// ImageMagick 7 `magick`
    Magick,
}

impl ConverterTool {
    /// Tools in the order [`CommandConverter::detect`] tries them
    pub const ALL: [ConverterTool; 3] = [
        ConverterTool::Sips,
        ConverterTool::HeifConvert,
        ConverterTool::Magick,
    ];

    /// Executable name
    pub fn program(&self) -> &'static str {
        match self {
            ConverterTool::Sips => "sips",
            ConverterTool::HeifConvert => "heif-convert",
            ConverterTool::Magick => "magick",
        }
    }

    /// Command line arguments for one conversion
    pub fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let input = input.as_os_str().to_os_string();
        let output = output.as_os_str().to_os_string();
        match self {
            ConverterTool::Sips => vec![
                "-s".into(),
                "format".into(),
                "jpeg".into(),
                input,
                "--out".into(),
                output,
            ],
            ConverterTool::HeifConvert => vec!["-q".into(), JPEG_QUALITY.into(), input, output],
            ConverterTool::Magick => vec![input, "-quality".into(), JPEG_QUALITY.into(), output],
        }
    }

    /// Whether the executable can be found on `PATH`
    pub fn is_available(&self) -> bool {
        find_on_path(self.program()).is_some()
    }
}

fn find_on_path(program: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        let exe = candidate.with_extension("exe");
        exe.is_file().then_some(exe)
    })
}

/// [`ImageConverter`] that runs an external tool
#[derive(Debug, Clone)]
pub struct CommandConverter {
    tool: ConverterTool,
}

impl CommandConverter {
    /// Use a specific tool
    pub fn new(tool: ConverterTool) -> Self {
        Self { tool }
    }

    /// Pick the first tool available on this machine
    pub fn detect() -> Result<Self, ConvertError> {
        ConverterTool::ALL
            .iter()
            .copied()
            .find(ConverterTool::is_available)
            .map(Self::new)
            .ok_or_else(|| ConvertError::ToolUnavailable {
                tried: ConverterTool::ALL
                    .iter()
                    .map(|t| t.program())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl ImageConverter for CommandConverter {
    fn name(&self) -> &str {
        self.tool.program()
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        tracing::debug!(
            tool = self.name(),
            input = %input.display(),
            output = %output.display(),
            "running converter"
        );

        let result = Command::new(self.tool.program())
            .args(self.tool.args(input, output))
            .output();

        let output_status = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConvertError::ToolUnavailable {
                    tried: self.tool.program().to_string(),
                });
            }
            Err(e) => {
                return Err(ConvertError::ToolFailed {
                    tool: self.name().to_string(),
                    input: input.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        if !output_status.status.success() {
            let stdout = String::from_utf8_lossy(&output_status.stdout);
            let stderr = String::from_utf8_lossy(&output_status.stderr);
            let message = format!("{}\n{}", stdout, stderr).trim().to_string();
            return Err(ConvertError::ToolFailed {
                tool: self.name().to_string(),
                input: input.to_path_buf(),
                message: if message.is_empty() {
                    "conversion failed".to_string()
                } else {
                    message
                },
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sips_arguments_write_jpeg_to_output() {
        let args = ConverterTool::Sips.args(Path::new("in.heic"), Path::new("out.jpg"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-s", "format", "jpeg", "in.heic", "--out", "out.jpg"]);
    }

    #[test]
    fn heif_convert_puts_output_last() {
        let args = ConverterTool::HeifConvert.args(Path::new("in.heic"), Path::new("out.jpg"));
        assert_eq!(args.last().unwrap(), "out.jpg");
    }

    #[test]
    fn tool_names_serialize_kebab_case() {
        let json = serde_json::to_string(&ConverterTool::HeifConvert).unwrap();
        assert_eq!(json, "\"heif-convert\"");
    }

    #[test]
    fn missing_program_is_reported_as_unavailable() {
        assert!(find_on_path("definitely-not-a-real-converter-4821").is_none());
    }
}
