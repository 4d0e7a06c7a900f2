//! Output for mutating commands (increment, prepare, set, inject)

use colored::Colorize;
use verstamp_core::{SyncReport, WriteAction};

/// Print what a pass did, then the resulting record on its own line.
pub fn print_report(report: &SyncReport) {
    let header = if report.dry_run {
        format!("{} (dry run)", report.operation)
    } else {
        report.operation.to_string()
    };
    eprintln!("{} {}", "=>".blue().bold(), header);

    for outcome in &report.outcomes {
        let action = match outcome.action {
            WriteAction::Written if report.dry_run => "would change".yellow(),
            WriteAction::Written => "updated".green(),
            WriteAction::Unchanged => "unchanged".dimmed(),
            WriteAction::Skipped => "skipped (not found)".yellow(),
        };
        eprintln!("   {} {} {}", "-".blue(), outcome.path.cyan(), action);
    }

    for diff in report.outcomes.iter().filter_map(|o| o.diff.as_deref()) {
        println!("{diff}");
    }

    println!("{}", report.record.full());
    if report.release_advised() {
        println!("release: recommended");
    }
}
