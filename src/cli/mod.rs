//! # CLI Module
//!
//! Command-line interface for the cover gallery tools.
//!
//! ## Usage
//! ```bash
//! # Renumber the images next to the executable
//! cover-gallery rename
//!
//! # Renumber another folder, previewing first
//! cover-gallery rename ~/Covers --dry-run
//!
//! # List unused covers
//! cover-gallery list ~/Covers
//!
//! # Mark a cover as used
//! cover-gallery mark 12.jpg --dir ~/Covers
//!
//! # Convert a HEIC cover to JPEG
//! cover-gallery convert IMG_0042.jpg --dir ~/Covers
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use cover_gallery::core::convert::{
    convert_heic_to_jpg, CommandConverter, ConverterTool, ImageConverter,
};
use cover_gallery::core::gallery::{list_images, mark_image, ImageInfo};
use cover_gallery::core::rename::{RenameReport, Renamer};
use cover_gallery::core::used::{UsedStore, DEFAULT_USED_FILE};
use cover_gallery::error::{GalleryError, Result};
use cover_gallery::events::{
    null_sender, ConvertEvent, Event, EventChannel, RenameEvent, ScanEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Cover Gallery - keep a folder of cover images tidy
#[derive(Parser, Debug)]
#[command(name = "cover-gallery")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Name of the used-marker file inside the folder
    #[arg(long, global = true, default_value = DEFAULT_USED_FILE)]
    used_file: String,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rename non-numeric images to the next free number
    Rename {
        /// Folder to renumber (default: the folder containing this program)
        dir: Option<PathBuf>,

        /// Show what would be renamed without renaming
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// List the images in a folder
    List {
        /// Folder to list (default: current directory)
        dir: Option<PathBuf>,

        /// Include images already marked as used
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Mark an image as used (or unused)
    Mark {
        /// Image file name inside the folder
        name: String,

        /// Folder containing the image (default: current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Remove the used marker instead
        #[arg(long)]
        unmark: bool,
    },

    /// Convert a HEIC/HEIF image to a real JPEG
    Convert {
        /// Image file name inside the folder
        name: String,

        /// Folder containing the image (default: current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Converter program to use
        #[arg(short, long, default_value = "auto")]
        tool: Tool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Tool {
    /// First available of sips, heif-convert, magick
    Auto,
    /// macOS sips
    Sips,
    /// libheif heif-convert
    HeifConvert,
    /// ImageMagick
    Magick,
}

impl Tool {
    fn converter(self) -> Result<CommandConverter> {
        let tool = match self {
            Tool::Auto => return Ok(CommandConverter::detect()?),
            Tool::Sips => ConverterTool::Sips,
            Tool::HeifConvert => ConverterTool::HeifConvert,
            Tool::Magick => ConverterTool::Magick,
        };
        Ok(CommandConverter::new(tool))
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    cover_gallery::init_tracing(cli.verbose);

    match cli.command {
        Commands::Rename {
            dir,
            dry_run,
            output,
        } => {
            let dir = match dir {
                Some(dir) => dir,
                None => executable_dir()?,
            };
            run_rename(&dir, dry_run, output, &cli.used_file)
        }
        Commands::List { dir, all, output } => {
            run_list(&dir_or_current(dir)?, !all, output, &cli.used_file)
        }
        Commands::Mark { name, dir, unmark } => {
            run_mark(&dir_or_current(dir)?, &name, !unmark, &cli.used_file)
        }
        Commands::Convert { name, dir, tool } => {
            run_convert(&dir_or_current(dir)?, &name, tool, &cli.used_file)
        }
    }
}

/// Directory containing the running executable
fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| GalleryError::Config(format!("cannot locate executable: {}", e)))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| GalleryError::Config("executable has no parent directory".to_string()))
}

fn dir_or_current(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir()
            .map_err(|e| GalleryError::Config(format!("cannot read current directory: {}", e))),
    }
}

fn run_rename(dir: &Path, dry_run: bool, output: OutputFormat, used_file: &str) -> Result<()> {
    let term = Term::stdout();
    let pretty = matches!(output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Renaming images in").bold().cyan(),
            style(display_path(dir)).bold()
        ))
        .ok();
        if dry_run {
            term.write_line(&format!("{}", style("Dry run: nothing will be renamed").yellow()))
                .ok();
        }
    }

    let renamer = Renamer::builder(dir).dry_run(dry_run).build();

    let report = if pretty {
        let (sender, receiver) = EventChannel::new();

        // Print progress lines as the renamer reports them
        let event_thread = thread::spawn(move || {
            let term = Term::stdout();
            for event in receiver.iter() {
                if let Some(line) = progress_line(&event) {
                    term.write_line(&line).ok();
                }
            }
        });

        let result = renamer.run_with_events(&sender);

        // Drop sender to signal event thread to finish
        drop(sender);
        event_thread.join().ok();
        result?
    } else {
        renamer.run_with_events(&null_sender())?
    };

    if !report.dry_run && !report.renamed.is_empty() {
        let mut store = UsedStore::in_folder(dir, used_file);
        if let Err(e) = store.apply_renames(&report.rename_map()) {
            tracing::warn!(error = %e, "used markers were not updated");
            Term::stderr()
                .write_line(&format!(
                    "{} used markers not updated: {}",
                    style("Warning:").yellow().bold(),
                    e
                ))
                .ok();
        }
    }

    match output {
        OutputFormat::Pretty => print_rename_summary(&term, &report),
        OutputFormat::Json => print_json(&report)?,
    }

    Ok(())
}

/// The terminal line for one progress event, if it gets one
fn progress_line(event: &Event) -> Option<String> {
    let line = match event {
        Event::Scan(ScanEvent::Completed { total_images }) => {
            style(format!("Found {} image(s)", total_images)).dim().to_string()
        }
        Event::Rename(RenameEvent::Started {
            max_num,
            start_number,
        }) => format!(
            "Starting number: {} {}",
            style(start_number).cyan(),
            style(format!("(largest existing: {})", max_num)).dim()
        ),
        Event::Rename(RenameEvent::Renamed { from, to }) => {
            format!("  {} -> {}", from, style(to).green())
        }
        Event::Rename(RenameEvent::Failed { name, message }) => {
            format!("  {} {}: {}", style("✗").red().bold(), name, message)
        }
        _ => return None,
    };
    Some(line)
}

fn summary_lines(report: &RenameReport) -> Vec<String> {
    let verb = if report.dry_run { "Would rename" } else { "Renamed" };
    let mut lines = vec![format!(
        "{} {} {} file(s)",
        style("✓").green().bold(),
        verb,
        style(report.renamed_count()).cyan()
    )];

    if !report.failures.is_empty() {
        lines.push(format!(
            "  {} file(s) could not be renamed and kept their names",
            style(report.failures.len()).red()
        ));
    }
    lines
}

fn print_rename_summary(term: &Term, report: &RenameReport) {
    for line in summary_lines(report) {
        term.write_line(&line).ok();
    }
}

fn run_list(dir: &Path, only_unused: bool, output: OutputFormat, used_file: &str) -> Result<()> {
    let store = UsedStore::in_folder(dir, used_file);
    let images = list_images(dir, &store, only_unused)?;

    match output {
        OutputFormat::Pretty => print_image_list(&Term::stdout(), dir, &images),
        OutputFormat::Json => print_json(&serde_json::json!({
            "folder": dir,
            "images": images,
        }))?,
    }

    Ok(())
}

fn print_image_list(term: &Term, dir: &Path, images: &[ImageInfo]) {
    term.write_line(&format!(
        "{} {}",
        style(display_path(dir)).bold(),
        style(format!("({} images)", images.len())).dim()
    ))
    .ok();

    for image in images {
        let used = if image.used {
            style("used").dim().to_string()
        } else {
            style("unused").green().to_string()
        };
        let mut line = format!(
            "  {:<24} {:>9}  {}  {} / {}",
            image.name,
            format_bytes(image.size),
            used,
            image.ext,
            image.detected_format.to_string().to_uppercase()
        );
        if image.browser_maybe_unsupported {
            line.push_str(&format!("  {}", style("may not preview (convert to JPG)").yellow()));
        }
        term.write_line(&line).ok();
    }
}

fn run_mark(dir: &Path, name: &str, used: bool, used_file: &str) -> Result<()> {
    let mut store = UsedStore::in_folder(dir, used_file);
    mark_image(dir, &mut store, name, used)?;

    let state = if used { "used" } else { "unused" };
    Term::stdout()
        .write_line(&format!("{} {} marked {}", style("✓").green().bold(), name, state))
        .ok();
    Ok(())
}

fn run_convert(dir: &Path, name: &str, tool: Tool, used_file: &str) -> Result<()> {
    let converter = tool.converter()?;
    let mut store = UsedStore::in_folder(dir, used_file);

    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));

    let (sender, receiver) = EventChannel::new();
    let spinner_clone = spinner.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Convert(ConvertEvent::Started { input, tool }) => {
                    spinner_clone.set_message(format!(
                        "Converting {} with {}",
                        display_path(&input),
                        tool
                    ));
                }
                Event::Convert(ConvertEvent::Restored { path }) => {
                    spinner_clone.println(format!("Restored original {}", display_path(&path)));
                }
                _ => {}
            }
        }
    });

    let converter: &dyn ImageConverter = &converter;
    let result = convert_heic_to_jpg(dir, &mut store, name, converter, &sender);

    drop(sender);
    event_thread.join().ok();
    spinner.finish_and_clear();

    let converted = result?;
    Term::stdout()
        .write_line(&format!(
            "{} Converted {} ({}) to {}",
            style("✓").green().bold(),
            name,
            converted.detected,
            style(&converted.output_name).green()
        ))
        .ok();
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| GalleryError::Config(format!("cannot encode output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Show paths under the home directory as `~/...`
fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(&home).ok().map(Path::to_path_buf)) {
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
