//! Init command implementation

use anyhow::{bail, Result};
use std::path::Path;

use grove::config::{write_config_file, Config};

/// Default configuration content for grove init
pub const DEFAULT_CONFIG: &str = r#"# Grove Configuration
# ===================
#
# Progress (XP, level, streak, unlocks) for the forest village.

# ============================================================================
# ENGINE
# ============================================================================
#
#   user_id             - Key of the progress row; one per user (default: "default")
#   mood_transient_secs - How long excited/determined/shining moods stay
#                         before returning to the recency mood (default: 4)

[engine]
user_id = "default"
mood_transient_secs = 4

# ============================================================================
# STORAGE
# ============================================================================
#
#   database - SQLite file holding progress and the XP log
#              (default: ~/.grove/grove.db)

[storage]
# database = "/path/to/grove.db"
"#;

/// Write a commented default config file
pub async fn init_command(config_path: Option<&Path>, force: bool) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    write_config_file(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        init_command(Some(&path), false).await.unwrap();
        assert!(init_command(Some(&path), false).await.is_err());
        init_command(Some(&path), true).await.unwrap();
        assert!(Config::load(Some(&path)).is_ok());
    }
}
