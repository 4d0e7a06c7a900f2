//! Consistency check and release classification

use colored::Colorize;
use verstamp_core::{CheckStatus, SemanticVersion, SyncEngine, classify};

use crate::error::{CliError, Result};

/// Exits non-zero when representations disagree or cannot be read.
pub fn run_check(engine: &SyncEngine, json: bool) -> Result<()> {
    let report = engine.check()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match report.status {
            CheckStatus::Healthy => {
                println!("{} All representations agree.", "OK".green().bold());
            }
            CheckStatus::Pending => {
                println!(
                    "{} All representations agree; build identifier is pending. Run {}.",
                    "PENDING".yellow().bold(),
                    "verstamp inject".cyan()
                );
            }
            CheckStatus::Drifted => {
                println!("{} Representations disagree:", "DRIFTED".red().bold());
                for item in &report.drifted {
                    println!(
                        "   {} {} ({}): {}",
                        "!".red(),
                        item.path.cyan(),
                        item.kind.to_string().dimmed(),
                        item.description
                    );
                }
                println!();
                println!(
                    "Run {} to rewrite every representation from the manifest.",
                    "verstamp inject".cyan()
                );
            }
            CheckStatus::Broken => {
                println!("{} Project is in a broken state:", "BROKEN".red().bold());
                for msg in &report.messages {
                    println!("   {} {}", "!".red(), msg);
                }
                for item in &report.drifted {
                    println!("   {} {}: {}", "!".red(), item.path.cyan(), item.description);
                }
            }
        }
    }

    if report.is_consistent() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "check failed: project is {}",
            report.status.as_str()
        )))
    }
}

pub fn run_classify(old: &str, new: &str, json: bool) -> Result<()> {
    let parse = |input: &str| SemanticVersion::parse(input).map_err(verstamp_core::Error::from);
    let classification = classify(&parse(old)?, &parse(new)?);

    if json {
        println!("{}", serde_json::to_string_pretty(&classification)?);
        return Ok(());
    }

    println!("kind: {}", classification.kind);
    println!(
        "release: {}",
        if classification.release_advised {
            "recommended"
        } else {
            "not recommended"
        }
    );
    println!("direction: {}", classification.direction);
    Ok(())
}
