use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::catalog::CatalogIndex;
use crate::config::RenameConfig;
use crate::error::RenameError;
use crate::formatter::NameFormatter;
use crate::matcher::Matcher;
use crate::resolver::{Operator, ResolutionOutcome, Resolver};

/// A regular file found in the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: String,
    pub basename: String,
    /// Including the leading dot, empty when there is none.
    pub extension: String,
}

impl SourceFile {
    pub fn new(path: PathBuf, file_name: String) -> Self {
        let (basename, extension) = split_extension(&file_name);
        Self {
            path,
            basename: basename.to_string(),
            extension: extension.to_string(),
            file_name,
        }
    }
}

/// Split `name` at its last dot. Leading dots belong to the base name, so
/// `.hidden` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if name[..pos].chars().any(|c| c != '.') => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub original_path: PathBuf,
    pub new_basename: String,
    pub extension: String,
}

impl RenamePlan {
    pub fn target_file_name(&self) -> String {
        format!("{}{}", self.new_basename, self.extension)
    }

    pub fn target_path(&self) -> PathBuf {
        self.original_path.with_file_name(self.target_file_name())
    }

    pub fn is_noop(&self) -> bool {
        self.target_path() == self.original_path
    }
}

#[derive(Debug)]
pub enum FileStatus {
    Renamed(PathBuf),
    /// Dry run: this rename would have happened.
    Planned(PathBuf),
    /// The new name equals the current one.
    Unchanged,
    /// The operator picked "None of above".
    Skipped,
    NoMatch,
    Failed(RenameError),
}

#[derive(Debug)]
pub struct FileReport {
    pub file_name: String,
    pub new_basename: Option<String>,
    pub status: FileStatus,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub renamed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub no_match: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, status: &FileStatus) {
        self.total += 1;
        match status {
            FileStatus::Renamed(_) | FileStatus::Planned(_) => self.renamed += 1,
            FileStatus::Unchanged => self.unchanged += 1,
            FileStatus::Skipped => self.skipped += 1,
            FileStatus::NoMatch => self.no_match += 1,
            FileStatus::Failed(_) => self.failed += 1,
        }
    }
}

/// Drives a whole directory through matching, resolution and renaming.
pub struct RenameEngine<'a> {
    config: RenameConfig,
    index: &'a CatalogIndex,
    matcher: Matcher,
    formatter: NameFormatter,
    outcomes: HashMap<String, ResolutionOutcome>,
    resolutions: usize,
}

impl<'a> RenameEngine<'a> {
    pub fn new(config: RenameConfig, index: &'a CatalogIndex) -> Self {
        Self {
            matcher: Matcher::from_config(&config),
            formatter: NameFormatter::new(config.series_name.clone()),
            config,
            index,
            outcomes: HashMap::new(),
            resolutions: 0,
        }
    }

    /// How many base names went through matcher and resolver so far.
    pub fn resolutions(&self) -> usize {
        self.resolutions
    }

    /// Regular files in listing order. The order is whatever the filesystem
    /// returns and is not sorted.
    pub fn scan_directory(&self) -> Result<Vec<SourceFile>> {
        let directory = &self.config.directory;
        if !directory.is_dir() {
            return Err(anyhow::anyhow!("Directory does not exist: {:?}", directory));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(directory)
            .with_context(|| format!("Failed to list directory {:?}", directory))?
            .filter_map(|entry| readable_entry(entry, directory))
        {
            let path = entry.path();
            if !fs::metadata(&path).map(|meta| meta.is_file()).unwrap_or(false) {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(file_name) => files.push(SourceFile::new(path, file_name)),
                Err(name) => warn!(?name, "Skipping file with a non UTF-8 name"),
            }
        }

        debug!(count = files.len(), directory = %directory.display(), "Scanned directory");
        Ok(files)
    }

    /// Resolve a base name once per run; later calls reuse the outcome.
    pub fn resolve_basename(
        &mut self,
        basename: &str,
        operator: &mut dyn Operator,
    ) -> io::Result<ResolutionOutcome> {
        if let Some(outcome) = self.outcomes.get(basename) {
            debug!(basename, "Reusing earlier resolution");
            return Ok(outcome.clone());
        }

        let candidates = self.matcher.find(basename, self.index);
        let resolver = Resolver::from_config(self.index, &self.config);
        let outcome = resolver.resolve(basename, &candidates, operator)?;
        self.resolutions += 1;
        self.outcomes.insert(basename.to_string(), outcome.clone());
        Ok(outcome)
    }

    pub fn plan(&self, file: &SourceFile, outcome: &ResolutionOutcome) -> Option<RenamePlan> {
        let new_basename = match outcome {
            ResolutionOutcome::Resolved(entry) => self.formatter.format(entry),
            ResolutionOutcome::Skipped => file.basename.clone(),
            ResolutionOutcome::NoMatch => return None,
        };
        Some(RenamePlan {
            original_path: file.path.clone(),
            new_basename,
            extension: file.extension.clone(),
        })
    }

    pub fn process_file(
        &mut self,
        file: &SourceFile,
        operator: &mut dyn Operator,
    ) -> io::Result<FileReport> {
        let outcome = self.resolve_basename(&file.basename, operator)?;
        let plan = self.plan(file, &outcome);

        let new_basename = plan.as_ref().map(|plan| plan.new_basename.clone());
        match &new_basename {
            Some(name) => operator.notify(&format!("{} -> {}", file.basename, name))?,
            None => operator.notify(&format!("{} -> (no match, not renamed)", file.basename))?,
        }

        let status = match (plan, outcome) {
            (None, _) => FileStatus::NoMatch,
            (Some(_), ResolutionOutcome::Skipped) => FileStatus::Skipped,
            (Some(plan), _) if plan.is_noop() => FileStatus::Unchanged,
            (Some(plan), _) if self.config.dry_run => FileStatus::Planned(plan.target_path()),
            (Some(plan), _) => match execute_plan(&plan) {
                Ok(target) => {
                    info!(from = %file.file_name, to = %plan.target_file_name(), "Renamed file");
                    FileStatus::Renamed(target)
                }
                Err(e) => {
                    warn!(file = %file.file_name, error = %e, "Rename failed");
                    operator.notify(&format!("✗ Error renaming '{}': {}", file.file_name, e))?;
                    FileStatus::Failed(e)
                }
            },
        };

        Ok(FileReport {
            file_name: file.file_name.clone(),
            new_basename,
            status,
        })
    }

    /// Process every file of the configured directory. Per-file failures are
    /// reported and counted; only operator I/O errors abort the batch.
    pub fn run(&mut self, operator: &mut dyn Operator) -> Result<BatchSummary> {
        let files = self.scan_directory()?;
        info!(files = files.len(), dry_run = self.config.dry_run, "Processing directory");

        let mut summary = BatchSummary::default();
        for file in &files {
            let report = self.process_file(file, operator).with_context(|| {
                format!("Operator I/O failed while processing '{}'", file.file_name)
            })?;
            summary.record(&report.status);
        }

        Ok(summary)
    }
}

/// Keep a listed entry, or log why it could not be read and drop it.
fn readable_entry<T>(entry: io::Result<T>, directory: &Path) -> Option<T> {
    match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!(
                directory = %directory.display(),
                error = %e,
                "Skipping unreadable directory entry"
            );
            None
        }
    }
}

/// Rename in place. Never replaces an existing file.
pub fn execute_plan(plan: &RenamePlan) -> Result<PathBuf, RenameError> {
    let target = plan.target_path();
    if target.exists() {
        return Err(RenameError::AlreadyExists(target));
    }
    fs::rename(&plan.original_path, &target)
        .map_err(|e| RenameError::from_io(plan.original_path.clone(), e))?;
    Ok(target)
}

pub fn print_summary(summary: &BatchSummary, dry_run: bool, directory: &Path) {
    println!("===================");
    println!("Directory: {}", directory.display());
    let verb = if dry_run {
        "would be renamed"
    } else {
        "renamed"
    };
    println!("Summary: {} of {} files {}", summary.renamed, summary.total, verb);
    println!(
        "  unchanged: {}, skipped: {}, no match: {}, failed: {}",
        summary.unchanged, summary.skipped, summary.no_match, summary.failed
    );

    println!("{}", summary_verdict(summary));
}

/// Closing line of the summary. Failures outrank unmatched files.
pub fn summary_verdict(summary: &BatchSummary) -> &'static str {
    if summary.total == 0 {
        "✗ No files found."
    } else if summary.failed > 0 {
        "⚠ Some files could not be renamed."
    } else if summary.no_match > 0 {
        "⚠ Some files had no catalog match and were left unchanged."
    } else {
        "✓ All files processed successfully!"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("Taxi nach Leipzig.mkv"), ("Taxi nach Leipzig", ".mkv"));
        assert_eq!(split_extension("a.b.mkv"), ("a.b", ".mkv"));
        assert_eq!(split_extension("noext"), ("noext", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("..hidden"), ("..hidden", ""));
        assert_eq!(split_extension("trailing."), ("trailing", "."));
    }

    #[test]
    fn test_plan_target_keeps_extension() {
        let plan = RenamePlan {
            original_path: PathBuf::from("/media/taxi.mkv"),
            new_basename: "Tatort 0015 - 03x07 - Taxi nach Leipzig".to_string(),
            extension: ".mkv".to_string(),
        };
        assert_eq!(
            plan.target_path(),
            PathBuf::from("/media/Tatort 0015 - 03x07 - Taxi nach Leipzig.mkv")
        );
        assert!(!plan.is_noop());
    }

    #[test]
    fn test_unchanged_basename_is_noop() {
        let plan = RenamePlan {
            original_path: PathBuf::from("/media/taxi.mkv"),
            new_basename: "taxi".to_string(),
            extension: ".mkv".to_string(),
        };
        assert!(plan.is_noop());
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchSummary::default();
        summary.record(&FileStatus::Renamed(PathBuf::from("a")));
        summary.record(&FileStatus::Skipped);
        summary.record(&FileStatus::NoMatch);
        summary.record(&FileStatus::Failed(RenameError::SourceNotFound(PathBuf::from("b"))));
        assert_eq!(
            summary,
            BatchSummary { total: 4, renamed: 1, unchanged: 0, skipped: 1, no_match: 1, failed: 1 }
        );
    }

    #[test]
    fn test_summary_verdict() {
        let empty = BatchSummary::default();
        assert_eq!(summary_verdict(&empty), "✗ No files found.");

        let clean = BatchSummary { total: 2, renamed: 1, skipped: 1, ..Default::default() };
        assert_eq!(summary_verdict(&clean), "✓ All files processed successfully!");

        let unmatched = BatchSummary { total: 2, renamed: 1, no_match: 1, ..Default::default() };
        assert_eq!(
            summary_verdict(&unmatched),
            "⚠ Some files had no catalog match and were left unchanged."
        );

        let failed = BatchSummary { total: 2, no_match: 1, failed: 1, ..Default::default() };
        assert_eq!(summary_verdict(&failed), "⚠ Some files could not be renamed.");
    }

    #[test]
    fn test_unreadable_entry_is_dropped() {
        let dir = Path::new("/media");
        let failed: io::Result<u8> = Err(io::Error::other("stale handle"));
        assert_eq!(readable_entry(failed, dir), None);
        assert_eq!(readable_entry(Ok(7u8), dir), Some(7));
    }
}
