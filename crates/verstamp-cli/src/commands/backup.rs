//! Restore, cleanup and backup listing

use colored::Colorize;
use verstamp_core::{BackupState, JournalState, SyncEngine};

use crate::error::Result;

pub fn run_restore(engine: &mut SyncEngine) -> Result<()> {
    let restored = engine.restore()?;
    if restored.is_empty() {
        println!("{} No backups to restore.", "OK".green().bold());
        return Ok(());
    }

    for path in &restored {
        println!("   {} {}", "-".blue(), path.cyan());
    }
    println!(
        "{} Restored {} file(s). Version is now {}",
        "OK".green().bold(),
        restored.len(),
        engine.record()?.full()
    );
    Ok(())
}

pub fn run_cleanup(engine: &mut SyncEngine) -> Result<()> {
    let removed = engine.cleanup()?;
    println!("{} Removed {} backup(s).", "OK".green().bold(), removed);
    Ok(())
}

pub fn run_backups(engine: &SyncEngine) -> Result<()> {
    let report = engine.backups()?;

    match report.journal {
        Some(JournalState::Writing) => println!(
            "{} last run was interrupted; run {} or {}",
            "INTERRUPTED".red().bold(),
            "verstamp restore".cyan(),
            "verstamp cleanup".cyan()
        ),
        Some(JournalState::Settled) => println!("{} backups present", "journal:".bold()),
        None => println!("{} none", "journal:".bold()),
    }

    for file in &report.files {
        match file.state {
            BackupState::BackedUp => println!(
                "   {} {} -> {}",
                "backed up".yellow(),
                file.path.cyan(),
                file.backup.as_deref().unwrap_or_default()
            ),
            BackupState::Clean => println!("   {} {}", "clean    ".green(), file.path.cyan()),
        }
    }
    Ok(())
}
