//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Unresolved placeholders grouped by file
//! - Per-batch deployment summaries
//! - Secret injection and rewrite results

use console::style;
use rollout_core::{Batch, InjectionReport, RewrittenFile, UnresolvedFile};
use rollout_kube::{ReleaseAction, RunSummary};
use std::path::Path;

/// Print every file that still holds placeholders, with its keys
pub fn unresolved_report(files: &[UnresolvedFile]) {
    let total: usize = files.iter().map(|f| f.keys.len()).sum();

    println!();
    for file in files {
        println!("{} {}", style("✗").red().bold(), style(file.path.display()).bold());
        for key in &file.keys {
            println!("    {} {{{{ {} }}}}", style("│").dim(), style(key).yellow());
        }
    }
    println!();
    println!(
        "{} {} unresolved placeholder(s) in {} file(s)",
        style("✗").red().bold(),
        total,
        files.len()
    );
}

/// Print the releases a batch declares
pub fn release_table(batch: &Batch) {
    println!(
        "{} {} ({} release(s))",
        style("→").blue(),
        style(batch.source().display()).bold(),
        batch.len()
    );

    if batch.is_empty() {
        println!("  No releases declared");
        return;
    }

    println!(
        "  {:<30} {:<20} {:<40} {}",
        style("NAME").bold(),
        style("NAMESPACE").bold(),
        style("CHART").bold(),
        style("VALUES").bold()
    );
    for release in batch {
        println!(
            "  {:<30} {:<20} {:<40} {}",
            release.name,
            release.namespace,
            release.chart_path,
            release.values_file.as_deref().unwrap_or("-")
        );
    }
}

/// Print what happened to each release of a batch
pub fn run_summary(summary: &RunSummary) {
    for outcome in &summary.outcomes {
        let icon = match outcome.action {
            ReleaseAction::Installed | ReleaseAction::Upgraded => style("✓").green(),
            ReleaseAction::Skipped => style("-").dim(),
        };
        println!(
            "  {} {} ({}) {}",
            icon,
            outcome.name,
            outcome.namespace,
            style(outcome.action).dim()
        );
    }
    println!(
        "  {} installed, {} upgraded, {} skipped",
        summary.count(ReleaseAction::Installed),
        summary.count(ReleaseAction::Upgraded),
        summary.count(ReleaseAction::Skipped)
    );
}

/// Print per-file substitution counts
pub fn injection_report(report: &InjectionReport, root: &Path) {
    if !report.any_changes() {
        println!(
            "{} No placeholders to replace in {} file(s)",
            style("✓").green(),
            report.files.len()
        );
        return;
    }

    for file in report.changed_files() {
        let path = file.path.strip_prefix(root).unwrap_or(&file.path);
        println!("{} {}", style("✓").green(), style(path.display()).bold());
        for (key, count) in &file.substitutions {
            println!("    {} {} ({} replacement(s))", style("│").dim(), key, count);
        }
    }
}

/// Print per-file literal replacement counts
pub fn rewrite_report(files: &[RewrittenFile]) {
    if files.is_empty() {
        println!("{} No matching text found", style("⚠").yellow());
        return;
    }

    for file in files {
        println!(
            "{} {} ({} replacement(s))",
            style("✓").green(),
            file.path.display(),
            file.replacements
        );
    }
}
