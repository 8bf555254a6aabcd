//! Status command implementation

use anyhow::Result;
use std::path::Path;

use grove::progress::{Unlock, UNLOCKS};

use super::{open_engine, progress_bar};

/// Show level, XP, streak, mood and unlocks
pub async fn status_command(config_path: Option<&Path>) -> Result<()> {
    let mut engine = open_engine(config_path)?;
    let mood = engine.refresh_mood();
    let state = engine.state();
    let progress = state.level_progress();

    println!("Level {}  (mood: {})", state.level, mood);
    println!(
        "  {} {}/{} XP  ({} total)",
        progress_bar(progress.fraction(), 20),
        state.xp_current_level,
        state.xp_for_next_level,
        state.xp_total
    );
    if state.xp_debt > 0 {
        println!("  {} XP owed before XP grows again", state.xp_debt);
    }
    println!(
        "  Streak: {} day(s), longest {}",
        state.streak_current, state.streak_longest
    );

    if state.unlocked_creatures.is_empty() && state.unlocked_decorations.is_empty() {
        println!("  No unlocks yet.");
    } else {
        let names = |ids: &std::collections::BTreeSet<String>| {
            ids.iter()
                .map(|id| Unlock::get(id).map(|u| u.name).unwrap_or(id.as_str()))
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("  Creatures:   {}", names(&state.unlocked_creatures));
        println!("  Decorations: {}", names(&state.unlocked_decorations));
    }

    if let Some(next) = UNLOCKS.iter().find(|u| u.level > state.level) {
        println!("  Next unlock: {} at level {}", next.name, next.level);
    }

    Ok(())
}
