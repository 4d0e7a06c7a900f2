//! Read-only record queries
//!
//! `get*` print bare values so scripts can capture them.

use colored::Colorize;
use serde_json::json;
use verstamp_core::SyncEngine;

use crate::error::Result;

pub fn run_get(engine: &SyncEngine) -> Result<()> {
    println!("{}", engine.record()?.full());
    Ok(())
}

pub fn run_get_semantic(engine: &SyncEngine) -> Result<()> {
    println!("{}", engine.record()?.semantic);
    Ok(())
}

pub fn run_get_build(engine: &SyncEngine) -> Result<()> {
    println!("{}", engine.record()?.build);
    Ok(())
}

pub fn run_info(engine: &SyncEngine, json: bool) -> Result<()> {
    let record = engine.record()?;

    if json {
        let value = json!({
            "version": record.full(),
            "semantic": record.semantic,
            "build": record.build,
            "pending": record.build.is_pending(),
            "timestamp": record.timestamp,
            "revision": record.revision_or_unknown(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}  {}", "version:  ".bold(), record.full().cyan());
    println!("{}  {}", "semantic: ".bold(), record.semantic);
    println!("{}  {}", "build:    ".bold(), record.build);
    match &record.timestamp {
        Some(timestamp) => println!("{}  {}", "timestamp:".bold(), timestamp),
        None => println!("{}  {}", "timestamp:".bold(), "pending".yellow()),
    }
    println!("{}  {}", "revision: ".bold(), record.revision_or_unknown());
    Ok(())
}

/// Succeeds only when the manifest's version parses.
pub fn run_validate(engine: &SyncEngine) -> Result<()> {
    let record = engine.validate()?;
    println!("{} {}", "OK".green().bold(), record.full());
    Ok(())
}
