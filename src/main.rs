use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "Grove - XP, levels and streaks for the forest village")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.grove/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show level, XP, streak, mood and unlocks
    Status,

    /// Award a raw XP amount (negative to take XP back)
    Award {
        #[arg(allow_negative_numbers = true)]
        amount: i64,

        /// Source recorded in the XP log
        #[arg(long, default_value = "manual")]
        source: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Id of the item the award belongs to (used by `undo`)
        #[arg(long)]
        source_id: Option<String>,
    },

    /// Record a completed action and award XP by the module's rule
    Complete {
        /// Source kind, e.g. task_completion, habit_completion, diary_entry
        kind: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(long)]
        source_id: Option<String>,

        /// Task complexity: simple, medium or complex
        #[arg(long)]
        complexity: Option<String>,

        /// Task deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,

        /// Current streak of the habit being completed
        #[arg(long, default_value_t = 0)]
        habit_streak: u32,
    },

    /// Count today toward the daily streak
    Streak,

    /// Reverse the XP recorded for an item
    Undo {
        source: String,
        source_id: String,
    },

    /// Show recent XP awards
    Log {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Initialize a new ~/.grove/config.toml configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Some(Commands::Status) | None => {
            cli::status::status_command(config).await?;
        }
        Some(Commands::Award {
            amount,
            source,
            description,
            source_id,
        }) => {
            cli::award::award_command(config, amount, &source, &description, source_id.as_deref())
                .await?;
        }
        Some(Commands::Complete {
            kind,
            description,
            source_id,
            complexity,
            deadline,
            habit_streak,
        }) => {
            let args = cli::award::CompleteArgs {
                kind: &kind,
                description: &description,
                source_id: source_id.as_deref(),
                complexity: complexity.as_deref(),
                deadline: deadline.as_deref(),
                habit_streak,
            };
            cli::award::complete_command(config, args).await?;
        }
        Some(Commands::Streak) => {
            cli::streak::streak_command(config).await?;
        }
        Some(Commands::Undo { source, source_id }) => {
            cli::award::undo_command(config, &source, &source_id).await?;
        }
        Some(Commands::Log { limit }) => {
            cli::log::log_command(config, limit).await?;
        }
        Some(Commands::Init { force }) => {
            cli::init::init_command(config, force).await?;
        }
    }

    Ok(())
}
