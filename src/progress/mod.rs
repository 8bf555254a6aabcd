//! Gamification engine: XP, Levels, Streaks, Unlocks and Mood
//!
//! One [`Engine`] owns a user's progress. Module stores (tasks, habits,
//! diary, finance, ...) compute a reward with [`XpRewards`] and report it;
//! the engine is the only writer of level, XP and streak state.
//!
//! # Data flow
//!
//! ```text
//! module store ──add_xp──▶ Engine ──derive_level──▶ level / unlocks / mood
//!                            │
//!                            └──write / append──▶ RowStore
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let engine = Engine::load(store, SystemClock, EngineSettings::default())?;
//! let engine = SharedEngine::new(engine);
//!
//! engine.record_completion(XpSource::TaskCompletion, 25, "Write report", Some("task-7"))?;
//! if let Some(level_up) = engine.take_level_up() {
//!     println!("Reached level {}", level_up.new_level);
//! }
//! ```

mod clock;
mod engine;
mod error;
mod levels;
mod mood;
mod rewards;
mod shared;
mod state;
mod streaks;
mod unlocks;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{AwardOutcome, Completion, Engine, EngineSettings, LevelUp, StreakReport};
pub use error::EngineError;
pub use levels::{cost_for_level, derive_level, total_xp_for_level, LevelProgress, BASE_LEVEL_COST};
pub use mood::{Mood, TransientMood};
pub use rewards::{TaskComplexity, XpRewards, XpSource};
pub use shared::SharedEngine;
pub use state::{EngineState, StateRecord, XpLogEntry};
pub use streaks::{milestone_bonus, StreakTransition, RETURN_BONUS_XP, STREAK_MILESTONES};
pub use unlocks::{grant_up_to, Unlock, UnlockKind, UNLOCKS};
