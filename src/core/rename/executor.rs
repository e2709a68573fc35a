//! Rename run execution.

use super::allocator::NumberAllocator;
use super::canonical::{is_canonical, max_num};
use super::types::{RenameConfig, RenameFailure, RenameReport, RenamedFile};
use crate::core::scanner::{DirectoryScanner, ImageFile};
use crate::error::{RenameError, ScanError};
use crate::events::{null_sender, Event, EventSender, RenameEvent, RenameSummary};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Filesystem operations the renamer needs.
///
/// Implement this trait to observe or fail renames in tests.
pub trait FileOps {
    /// Whether anything (file, directory or link) exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Move `from` to `to`
    fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()>;
}

/// [`FileOps`] backed by `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileOps for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        fs::rename(from, to)
    }
}

/// Builder for a [`Renamer`]
pub struct RenamerBuilder {
    directory: PathBuf,
    config: RenameConfig,
    fs: Option<Box<dyn FileOps>>,
}

impl RenamerBuilder {
    /// Create a builder for the given target directory
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            config: RenameConfig::default(),
            fs: None,
        }
    }

    /// Plan only, without renaming
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Use custom filesystem operations
    pub fn file_ops(mut self, fs: Box<dyn FileOps>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Build the renamer
    pub fn build(self) -> Renamer {
        Renamer {
            directory: self.directory,
            config: self.config,
            scanner: DirectoryScanner::default(),
            fs: self.fs.unwrap_or_else(|| Box::new(LocalFs)),
        }
    }
}

/// Renames every non-canonical image in one directory to the next free
/// number, keeping its extension.
pub struct Renamer {
    directory: PathBuf,
    config: RenameConfig,
    scanner: DirectoryScanner,
    fs: Box<dyn FileOps>,
}

impl Renamer {
    /// Create a new renamer builder
    pub fn builder(directory: impl Into<PathBuf>) -> RenamerBuilder {
        RenamerBuilder::new(directory)
    }

    /// Run without events
    pub fn run(&self) -> Result<RenameReport, ScanError> {
        self.run_with_events(&null_sender())
    }

    /// Run, reporting progress through `events`.
    ///
    /// Only a directory that cannot be listed is an error; files that fail
    /// to rename are recorded in the report and the run continues.
    pub fn run_with_events(&self, events: &EventSender) -> Result<RenameReport, ScanError> {
        let start = Instant::now();
        let images = self.scanner.scan_with_events(&self.directory, events)?;

        let max_num = max_num(&images);
        let mut allocator = NumberAllocator::seeded_from(max_num);
        let start_number = allocator.next_number();

        tracing::info!(
            directory = %self.directory.display(),
            images = images.len(),
            max_num,
            start_number,
            dry_run = self.config.dry_run,
            "starting rename run"
        );
        events.send(Event::Rename(RenameEvent::Started {
            max_num,
            start_number,
        }));

        let mut renamed = Vec::new();
        let mut skipped = Vec::new();
        let mut failures = Vec::new();

        for image in &images {
            if is_canonical(&image.base_name) || self.scanner.filter().is_excluded(&image.name) {
                tracing::debug!(name = %image.name, "already final, skipping");
                events.send(Event::Rename(RenameEvent::Skipped {
                    name: image.name.clone(),
                }));
                skipped.push(image.name.clone());
                continue;
            }

            let (number, new_name) = allocator.claim(&image.extension, |candidate| {
                self.fs.exists(&self.directory.join(candidate))
            });

            match self.apply(image, &new_name) {
                Ok(()) => {
                    events.send(Event::Rename(RenameEvent::Renamed {
                        from: image.name.clone(),
                        to: new_name.clone(),
                    }));
                    renamed.push(RenamedFile {
                        from: image.name.clone(),
                        to: new_name,
                        number,
                    });
                }
                Err(e) => {
                    tracing::warn!(name = %image.name, error = %e, "rename failed");
                    events.send(Event::Rename(RenameEvent::Failed {
                        name: image.name.clone(),
                        message: e.to_string(),
                    }));
                    failures.push(RenameFailure {
                        name: image.name.clone(),
                        target: new_name,
                        message: e.to_string(),
                    });
                }
            }
        }

        let report = RenameReport {
            directory: self.directory.clone(),
            max_num,
            start_number,
            dry_run: self.config.dry_run,
            renamed,
            skipped,
            failures,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            renamed = report.renamed.len(),
            failed = report.failures.len(),
            "rename run finished"
        );
        events.send(Event::Rename(RenameEvent::Completed(RenameSummary {
            renamed: report.renamed.len(),
            skipped: report.skipped.len(),
            failed: report.failures.len(),
            dry_run: report.dry_run,
        })));

        Ok(report)
    }

    fn apply(&self, image: &ImageFile, new_name: &str) -> Result<(), RenameError> {
        if self.config.dry_run {
            return Ok(());
        }

        let target = self.directory.join(new_name);

        // The name may have been taken since the allocator probed it
        if self.fs.exists(&target) {
            return Err(RenameError::TargetExists { target });
        }

        self.fs
            .rename(&image.full_path, &target)
            .map_err(|source| RenameError::Io {
                from: image.full_path.clone(),
                to: target,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventChannel, ScanEvent};
    use std::collections::HashSet;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) {
        File::create(dir.path().join(name)).unwrap();
    }

    fn listing(dir: &TempDir) -> HashSet<String> {
        fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    /// Fails every rename whose source name is in the list
    struct FailingFs {
        fail_for: Vec<String>,
    }

    impl FileOps for FailingFs {
        fn exists(&self, path: &Path) -> bool {
            LocalFs.exists(path)
        }

        fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()> {
            let name = from.file_name().unwrap().to_string_lossy();
            if self.fail_for.iter().any(|f| *f == name) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "locked by another process",
                ));
            }
            LocalFs.rename(from, to)
        }
    }

    #[test]
    fn canonical_names_are_left_alone() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "1.jpg");
        touch(&dir, "000042.png");
        touch(&dir, "999999.gif");

        let report = Renamer::builder(dir.path()).build().run().unwrap();

        assert_eq!(report.renamed_count(), 0);
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(
            listing(&dir),
            HashSet::from(["1.jpg", "000042.png", "999999.gif"].map(String::from))
        );
    }

    #[test]
    fn counter_is_seeded_from_largest_numeric_name() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "3.jpg");
        touch(&dir, "10.png");
        touch(&dir, "abc.png");

        let report = Renamer::builder(dir.path()).build().run().unwrap();

        assert_eq!(report.max_num, 10);
        assert_eq!(report.start_number, 11);
        assert_eq!(report.renamed.len(), 1);
        assert_eq!(report.renamed[0].from, "abc.png");
        assert_eq!(report.renamed[0].to, "11.png");
        assert!(dir.path().join("11.png").exists());
        assert!(!dir.path().join("abc.png").exists());
    }

    #[test]
    fn taken_numbers_are_skipped() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "5.jpg");
        touch(&dir, "photo.jpg");
        // Directory named like the first candidate also blocks it
        fs::create_dir(dir.path().join("6.jpg")).unwrap();

        let report = Renamer::builder(dir.path()).build().run().unwrap();

        assert_eq!(report.renamed[0].to, "7.jpg");
        assert!(dir.path().join("7.jpg").is_file());
    }

    #[test]
    fn seven_digit_names_are_renamed() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "1234567.png");

        let report = Renamer::builder(dir.path()).build().run().unwrap();

        assert_eq!(report.max_num, 0);
        assert_eq!(report.renamed[0].to, "1.png");
    }

    #[test]
    fn leading_zero_name_seeds_counter_but_is_renamed() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "0000007.jpg");

        let report = Renamer::builder(dir.path()).build().run().unwrap();

        assert_eq!(report.max_num, 7);
        assert_eq!(report.renamed[0].from, "0000007.jpg");
        assert_eq!(report.renamed[0].to, "8.jpg");
    }

    #[test]
    fn extension_case_is_preserved() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "Holiday.JPG");
        touch(&dir, "scan.Png");

        let report = Renamer::builder(dir.path()).build().run().unwrap();

        let targets: Vec<_> = report.renamed.iter().map(|r| r.to.as_str()).collect();
        assert_eq!(targets, vec!["1.JPG", "2.Png"]);
    }

    #[test]
    fn assignments_follow_group_then_name_order() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "b.png");
        touch(&dir, "a.png");
        touch(&dir, "z.jpg");
        touch(&dir, "y.webp");

        let report = Renamer::builder(dir.path()).build().run().unwrap();

        let pairs: Vec<_> = report
            .renamed
            .iter()
            .map(|r| (r.from.as_str(), r.number))
            .collect();
        assert_eq!(pairs, vec![("z.jpg", 1), ("a.png", 2), ("b.png", 3), ("y.webp", 4)]);
    }

    #[test]
    fn dry_run_plans_without_touching_files() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "2.jpg");
        touch(&dir, "a.jpg");
        touch(&dir, "b.jpg");
        let before = listing(&dir);

        let report = Renamer::builder(dir.path()).dry_run(true).build().run().unwrap();

        assert!(report.dry_run);
        let targets: Vec<_> = report.renamed.iter().map(|r| r.to.as_str()).collect();
        assert_eq!(targets, vec!["3.jpg", "4.jpg"]);
        assert_eq!(listing(&dir), before);
    }

    #[test]
    fn failed_rename_is_recorded_and_run_continues() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.jpg");
        touch(&dir, "b.jpg");
        touch(&dir, "c.jpg");

        let renamer = Renamer::builder(dir.path())
            .file_ops(Box::new(FailingFs {
                fail_for: vec!["b.jpg".to_string()],
            }))
            .build();
        let report = renamer.run().unwrap();

        assert_eq!(report.renamed_count(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "b.jpg");
        assert!(report.failures[0].message.contains("locked"));
        assert!(dir.path().join("b.jpg").exists());
        // The failed attempt consumed number 2
        let numbers: Vec<_> = report.renamed.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn missing_directory_is_fatal() {
        let result = Renamer::builder("/nonexistent/covers/12345").build().run();
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn events_report_start_each_rename_and_summary() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "4.jpg");
        touch(&dir, "x.jpg");

        let (sender, receiver) = EventChannel::new();
        Renamer::builder(dir.path())
            .build()
            .run_with_events(&sender)
            .unwrap();
        drop(sender);

        let rename_events: Vec<_> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Rename(r) => Some(r),
                _ => None,
            })
            .collect();

        assert!(matches!(
            rename_events.first(),
            Some(RenameEvent::Started { start_number: 5, .. })
        ));
        assert!(rename_events.iter().any(|e| matches!(
            e,
            RenameEvent::Renamed { from, to } if from == "x.jpg" && to == "5.jpg"
        )));
        assert!(matches!(
            rename_events.last(),
            Some(RenameEvent::Completed(RenameSummary { renamed: 1, skipped: 1, .. }))
        ));
    }

    #[test]
    fn listing_events_precede_the_run() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.jpg");
        touch(&dir, "b.png");
        touch(&dir, "notes.txt");

        let (sender, receiver) = EventChannel::new();
        Renamer::builder(dir.path())
            .dry_run(true)
            .build()
            .run_with_events(&sender)
            .unwrap();
        drop(sender);

        let events: Vec<_> = receiver.iter().collect();
        assert!(matches!(events.first(), Some(Event::Scan(ScanEvent::Started { .. }))));
        let found = events
            .iter()
            .filter(|e| matches!(e, Event::Scan(ScanEvent::ImageFound { .. })))
            .count();
        assert_eq!(found, 2);

        let completed = events
            .iter()
            .position(|e| matches!(e, Event::Scan(ScanEvent::Completed { total_images: 2 })))
            .unwrap();
        let started = events
            .iter()
            .position(|e| matches!(e, Event::Rename(RenameEvent::Started { .. })))
            .unwrap();
        assert!(completed < started);
    }
}
