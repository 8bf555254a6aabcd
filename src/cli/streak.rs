//! Streak command implementation

use anyhow::Result;
use std::path::Path;

use grove::progress::StreakTransition;

use super::open_engine;

/// Count today toward the daily streak
pub async fn streak_command(config_path: Option<&Path>) -> Result<()> {
    let mut engine = open_engine(config_path)?;
    let report = engine.check_streak();

    match report.transition {
        StreakTransition::Started => println!("Streak started!"),
        StreakTransition::AlreadyCounted => {
            println!("Today already counts ({} day(s)).", report.streak_current)
        }
        StreakTransition::Extended { count } => println!("Streak extended to {count} day(s)."),
        StreakTransition::Grace { count } => {
            println!("You missed a day, but your {count}-day streak is safe.")
        }
        StreakTransition::Broken { previous } => {
            println!("Your {previous}-day streak ended. Welcome back!")
        }
    }

    if let Some(bonus) = &report.bonus {
        println!("  +{} XP ({})", bonus.entry.amount, bonus.entry.source);
    }
    if let Some(level_up) = engine.take_level_up() {
        println!("Level up! {} -> {}", level_up.old_level, level_up.new_level);
    }
    if !report.persisted() {
        eprintln!("Warning: progress not saved");
    }
    Ok(())
}
