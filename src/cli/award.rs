//! Award, complete and undo commands

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use std::path::Path;

use grove::progress::{AwardOutcome, Engine, TaskComplexity, XpRewards, XpSource};

use super::open_engine;

/// Award a raw XP amount
pub async fn award_command(
    config_path: Option<&Path>,
    amount: i64,
    source: &str,
    description: &str,
    source_id: Option<&str>,
) -> Result<()> {
    let mut engine = open_engine(config_path)?;
    let outcome = engine.add_xp(amount, source, description, source_id)?;
    print_outcome(&mut engine, &outcome);
    Ok(())
}

/// Options for a module completion
pub struct CompleteArgs<'a> {
    pub kind: &'a str,
    pub description: &'a str,
    pub source_id: Option<&'a str>,
    pub complexity: Option<&'a str>,
    pub deadline: Option<&'a str>,
    pub habit_streak: u32,
}

/// Record a completed action, computing the reward with the module's rule
pub async fn complete_command(config_path: Option<&Path>, args: CompleteArgs<'_>) -> Result<()> {
    let Some(source) = XpSource::from_str(args.kind) else {
        bail!("Unknown source: {}", args.kind);
    };

    let amount = match source {
        XpSource::TaskCompletion => {
            let complexity = match args.complexity {
                Some(c) => TaskComplexity::from_str(c)
                    .with_context(|| format!("Unknown complexity: {c}"))?,
                None => TaskComplexity::default(),
            };
            let deadline = args
                .deadline
                .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
                .transpose()
                .with_context(|| "Deadline must be YYYY-MM-DD")?;
            XpRewards::task_completion(complexity, deadline, Local::now().date_naive())
        }
        XpSource::HabitCompletion => XpRewards::habit_completion(args.habit_streak),
        other => match XpRewards::fixed(other) {
            Some(amount) => amount,
            None => bail!("{} is awarded by the engine itself", other.as_str()),
        },
    };

    let mut engine = open_engine(config_path)?;
    let completion =
        engine.record_completion(source, amount, args.description, args.source_id)?;
    print_outcome(&mut engine, &completion.award);

    if let Some(streak) = completion.streak {
        println!(
            "Streak: {} ({} day(s))",
            streak.transition.as_str(),
            streak.streak_current
        );
        if let Some(bonus) = &streak.bonus {
            println!("  Bonus: +{} XP ({})", bonus.entry.amount, bonus.entry.source);
        }
    }
    Ok(())
}

/// Reverse the XP recorded for a source id
pub async fn undo_command(
    config_path: Option<&Path>,
    source: &str,
    source_id: &str,
) -> Result<()> {
    let mut engine = open_engine(config_path)?;
    match engine.reverse_award(source, source_id, "Reversed")? {
        Some(outcome) => print_outcome(&mut engine, &outcome),
        None => println!("Nothing to reverse for {source} {source_id}."),
    }
    Ok(())
}

fn print_outcome(engine: &mut Engine, outcome: &AwardOutcome) {
    println!(
        "{:+} XP ({}) -> {} total",
        outcome.entry.amount,
        outcome.entry.source,
        engine.state().xp_total
    );
    if let Some(level_up) = engine.take_level_up() {
        println!("Level up! {} -> {}", level_up.old_level, level_up.new_level);
        for unlock in level_up.unlocked {
            println!("  Unlocked {}: {}", unlock.kind.as_str(), unlock.name);
        }
    }
    if let Some(e) = &outcome.persist_error {
        eprintln!("Warning: progress not saved: {e}");
    }
}
