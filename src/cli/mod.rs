//! CLI command implementations

pub mod award;
pub mod init;
pub mod log;
pub mod status;
pub mod streak;

use std::path::Path;

use anyhow::{Context, Result};

use grove::config::Config;
use grove::progress::{Engine, SystemClock};
use grove::store::SqliteStore;

/// Open the configured database and load the user's progress
pub fn open_engine(config_path: Option<&Path>) -> Result<Engine> {
    let config = Config::load(config_path)?;
    let db_path = config.database_path();
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open progress db: {}", db_path.display()))?;

    let engine = Engine::load(store, SystemClock, config.engine_settings())?;
    Ok(engine)
}

/// Text progress bar, e.g. `[#####-----]`
pub fn progress_bar(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
