//! Log command implementation

use anyhow::Result;
use std::path::Path;

use super::open_engine;

/// Show the most recent XP awards
pub async fn log_command(config_path: Option<&Path>, limit: usize) -> Result<()> {
    let engine = open_engine(config_path)?;
    let log = engine.log();

    if log.is_empty() {
        println!("No XP awarded yet.");
        return Ok(());
    }

    let skip = log.len().saturating_sub(limit);
    println!("XP log ({} of {}):\n", log.len() - skip, log.len());
    for entry in &log[skip..] {
        println!(
            "  {} {:>+6}  {:<20} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.amount,
            entry.source,
            entry.description
        );
        if let Some(id) = &entry.source_id {
            println!("    source id: {}", id);
        }
    }

    let total: i64 = log.iter().map(|e| e.amount).sum();
    println!("\n  Logged total: {}  (state total: {})", total, engine.state().xp_total);
    Ok(())
}
