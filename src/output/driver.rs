use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::schema_set::SchemaSet;
use crate::qualifier::engine::{ContextSet, Qualifier, RuleApplication};

/// How one target file fared during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// The file was rewritten (or would be, under `dry_run`).
    Rewritten {
        /// Number of sites rewritten across all rules.
        rewrites: usize,
    },
    /// The file was read but nothing was left to qualify.
    Unchanged,
    /// The file was absent and skipped.
    SkippedMissing,
}

/// Per-file outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// The file path as configured, relative to the run root.
    pub path: PathBuf,
    /// Name of the schema that owns the file.
    pub schema: String,
    /// What happened to the file.
    pub status: FileStatus,
    /// Per-rule counts from the qualification pass; empty for skipped files.
    pub applications: Vec<RuleApplication>,
}

/// Outcome of one run over a schema set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Per-file reports, in processing order.
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    /// Number of files rewritten (or pending rewrite under `dry_run`).
    pub fn rewritten(&self) -> usize {
        self.count(|status| matches!(status, FileStatus::Rewritten { .. }))
    }

    /// Number of files that were already fully qualified.
    pub fn unchanged(&self) -> usize {
        self.count(|status| matches!(status, FileStatus::Unchanged))
    }

    /// Number of files skipped because they were missing.
    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, FileStatus::SkippedMissing))
    }

    /// Total rewrites across all files.
    pub fn total_rewrites(&self) -> usize {
        self.reports
            .iter()
            .map(|report| match report.status {
                FileStatus::Rewritten { rewrites } => rewrites,
                _ => 0,
            })
            .sum()
    }

    /// True when any file was (or would be) rewritten.
    pub fn pending(&self) -> bool {
        self.rewritten() > 0
    }

    fn count(&self, matches: impl Fn(&FileStatus) -> bool) -> usize {
        self.reports
            .iter()
            .filter(|report| matches(&report.status))
            .count()
    }
}

/// Options for a driver run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory the configured file paths are resolved against.
    pub root: PathBuf,
    /// Report pending rewrites without touching any file.
    pub dry_run: bool,
    /// Restrict the run to the named schema.
    pub schema: Option<String>,
}

/// Walk the schema set in order and qualify every target file.
///
/// Missing files are recorded as skipped rather than failing the run; read and
/// write errors abort with a diagnostic. Files whose qualification is a no-op
/// are never rewritten.
pub fn process(set: &SchemaSet, options: &RunOptions) -> Result<RunSummary, String> {
    let mut reports = Vec::new();

    for schema in &set.schemas {
        if let Some(only) = &options.schema {
            if &schema.name != only {
                continue;
            }
        }
        let search_path = set.search_path(schema);

        for file in &schema.files {
            let path = options.root.join(file);
            if !path.exists() {
                reports.push(FileReport {
                    path: file.clone(),
                    schema: schema.name.clone(),
                    status: FileStatus::SkippedMissing,
                    applications: Vec::new(),
                });
                continue;
            }

            let document = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;

            let contexts = ContextSet::for_path(file);
            let qualifier = Qualifier::new(schema, &search_path, &contexts)?;
            let outcome = qualifier.qualify(&document);

            let status = if outcome.text == document {
                FileStatus::Unchanged
            } else {
                if !options.dry_run {
                    write_atomic(&path, &outcome.text)?;
                }
                FileStatus::Rewritten {
                    rewrites: outcome.total_rewrites(),
                }
            };
            reports.push(FileReport {
                path: file.clone(),
                schema: schema.name.clone(),
                status,
                applications: outcome.applications,
            });
        }
    }

    Ok(RunSummary { reports })
}

/// Replace `path` with `contents` via a temp file in the same directory and an
/// atomic rename, so a fault mid-write never leaves a truncated target.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), String> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| format!("Failed to create temporary file in {}: {e}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| format!("Failed to write temporary file for {}: {e}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| format!("Failed to replace {}: {e}", path.display()))?;
    Ok(())
}
