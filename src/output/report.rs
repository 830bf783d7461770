use std::fmt::Write;

use crate::output::driver::{FileStatus, RunSummary};

/// Render the human-readable completion summary for a run.
pub fn build_summary(summary: &RunSummary, dry_run: bool) -> String {
    let mut out = String::new();
    let fixed_verb = if dry_run { "would fix" } else { "fixed" };

    for report in &summary.reports {
        match &report.status {
            FileStatus::Rewritten { rewrites } => writeln!(
                out,
                "{fixed_verb} {} ({rewrites} rewrites, schema {})",
                report.path.display(),
                report.schema,
            )
            .unwrap(),
            FileStatus::Unchanged => writeln!(
                out,
                "ok    {} (already qualified)",
                report.path.display()
            )
            .unwrap(),
            FileStatus::SkippedMissing => writeln!(
                out,
                "skip  {} (not found)",
                report.path.display()
            )
            .unwrap(),
        }
    }

    writeln!(out).unwrap();
    writeln!(
        out,
        "{} files {}, {} already qualified, {} missing; {} rewrites total.",
        summary.rewritten(),
        if dry_run { "pending" } else { "fixed" },
        summary.unchanged(),
        summary.skipped(),
        summary.total_rewrites(),
    )
    .unwrap();

    out
}
