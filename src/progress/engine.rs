//! Progress engine - core gamification logic
//!
//! Owns one user's [`EngineState`], applies XP awards and streak checks, and
//! writes the result back to its [`RowStore`]. Updates are local-first: the
//! in-memory state changes before the store is touched, and a failed write is
//! logged and reported without rolling anything back.

use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::clock::Clock;
use super::error::EngineError;
use super::mood::{Mood, TransientMood};
use super::rewards::XpSource;
use super::state::{EngineState, StateRecord, XpLogEntry};
use super::streaks::{milestone_bonus, StreakTransition, RETURN_BONUS_XP};
use super::unlocks::{grant_up_to, Unlock};
use crate::store::{Row, RowStore, StoreError, KEY_COLUMN, STATE_TABLE, XP_LOG_TABLE};

/// Engine behaviour that differs between deployments
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Key of the state row
    pub user_id: String,
    /// How long event moods (excited, determined, ...) stay visible
    pub mood_transient: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            user_id: "default".to_string(),
            mood_transient: Duration::from_secs(4),
        }
    }
}

/// A level up event
#[derive(Debug, Clone, PartialEq)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
    /// Unlocks granted by this level change
    pub unlocked: Vec<&'static Unlock>,
}

/// Result of one XP award
#[derive(Debug)]
pub struct AwardOutcome {
    pub entry: XpLogEntry,
    pub level_up: Option<LevelUp>,
    /// Set when the store could not be updated; local state is kept anyway
    pub persist_error: Option<StoreError>,
}

impl AwardOutcome {
    pub fn persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

/// Result of one streak check
#[derive(Debug)]
pub struct StreakReport {
    pub transition: StreakTransition,
    pub streak_current: u32,
    /// Milestone or return bonus awarded by this check
    pub bonus: Option<AwardOutcome>,
    /// Persistence failure of a check that awarded nothing
    pub persist_error: Option<StoreError>,
}

impl StreakReport {
    pub fn persisted(&self) -> bool {
        self.persist_error.is_none() && self.bonus.as_ref().is_none_or(AwardOutcome::persisted)
    }
}

/// Result of [`Engine::record_completion`]
#[derive(Debug)]
pub struct Completion {
    pub award: AwardOutcome,
    /// Present when the source drives the daily streak
    pub streak: Option<StreakReport>,
}

pub struct Engine {
    settings: EngineSettings,
    store: Box<dyn RowStore>,
    clock: Box<dyn Clock>,
    state: EngineState,
    log: Vec<XpLogEntry>,
    /// Log entries not yet appended to the store
    unsynced: Vec<XpLogEntry>,
    transient: Option<TransientMood>,
    pending_level_up: Option<LevelUp>,
    /// Requested amounts of the unsynced entries, kept while the saved
    /// progress could not be read at load
    replay: Option<Vec<i64>>,
}

impl Engine {
    /// Load the user's progress from the store.
    ///
    /// A missing row yields a fresh level 1 state. So does an unreachable
    /// store, but then the session is merged into the saved progress by the
    /// first write that can read it again. Level fields are re-derived from
    /// `xp_total`, unlocks are caught up to the derived level (and saved) and
    /// the mood is recomputed from recency.
    pub fn load(
        store: impl RowStore + 'static,
        clock: impl Clock + 'static,
        settings: EngineSettings,
    ) -> Result<Self, EngineError> {
        let now = clock.now();

        let (saved, log, replay) = match read_saved(&store, &settings.user_id) {
            Ok((saved, log)) => (saved, log, None),
            Err(e) => {
                warn!(
                    error = %e,
                    "Progress store unavailable, starting from a fresh state until it can be read"
                );
                (None, Vec::new(), Some(Vec::new()))
            }
        };

        let mut state = match saved {
            Some(row) => StateRecord::from_row(&row)?.into_state(),
            None => {
                if replay.is_none() {
                    info!(user = %settings.user_id, "No saved progress, starting at level 1");
                }
                EngineState::new()
            }
        };

        let logged: i128 = log.iter().map(|e| i128::from(e.amount)).sum();
        if replay.is_none() && logged != i128::from(state.xp_total) {
            warn!(
                logged = %logged,
                xp_total = state.xp_total,
                "XP log does not match saved total; keeping saved total"
            );
        }

        let caught_up = grant_up_to(
            state.level,
            &mut state.unlocked_creatures,
            &mut state.unlocked_decorations,
        );
        state.mood = Mood::from_recency(state.last_activity, now);

        debug!(
            level = state.level,
            xp_total = state.xp_total,
            streak = state.streak_current,
            "Loaded progress"
        );

        let mut engine = Self {
            settings,
            store: Box::new(store),
            clock: Box::new(clock),
            state,
            log,
            unsynced: Vec::new(),
            transient: None,
            pending_level_up: None,
            replay,
        };

        if !caught_up.is_empty() {
            info!(
                count = caught_up.len(),
                level = engine.state.level,
                "Caught up missing unlocks"
            );
            // failure is logged by persist and retried with the next write
            let _ = engine.persist();
        }

        Ok(engine)
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// XP awards known to this engine, oldest first
    pub fn log(&self) -> &[XpLogEntry] {
        &self.log
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Number of log entries still waiting to be appended to the store
    pub fn unsynced_len(&self) -> usize {
        self.unsynced.len()
    }

    // ========================================
    // XP & LEVEL OPERATIONS
    // ========================================

    /// Award (or with a negative amount, take back) XP.
    ///
    /// Lifetime XP never drops below zero; XP taken beyond that is owed and
    /// repaid by later awards. The log entry records the change that was
    /// actually applied.
    pub fn add_xp(
        &mut self,
        amount: i64,
        source: &str,
        description: &str,
        source_id: Option<&str>,
    ) -> Result<AwardOutcome, EngineError> {
        if source.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "XP source must not be empty".to_string(),
            ));
        }
        Ok(self.award(amount, source, description, source_id))
    }

    fn award(
        &mut self,
        amount: i64,
        source: &str,
        description: &str,
        source_id: Option<&str>,
    ) -> AwardOutcome {
        let now = self.clock.now();
        let old_level = self.state.level;
        let applied = self.state.apply_xp(amount);

        let entry = XpLogEntry {
            id: Uuid::new_v4().to_string(),
            user_id: self.settings.user_id.clone(),
            timestamp: now,
            source: source.to_string(),
            source_id: source_id.map(str::to_string),
            amount: applied,
            description: description.to_string(),
        };

        self.state.last_activity = Some(now);
        debug_assert!(
            amount < 0 || self.state.level >= old_level,
            "level dropped from {old_level} to {} on a non-negative award",
            self.state.level
        );

        let level_up = if self.state.level > old_level {
            let unlocked = grant_up_to(
                self.state.level,
                &mut self.state.unlocked_creatures,
                &mut self.state.unlocked_decorations,
            );
            info!(
                old_level,
                new_level = self.state.level,
                unlocked = unlocked.len(),
                "Level up"
            );
            self.set_transient(Mood::Excited);
            let level_up = LevelUp {
                old_level,
                new_level: self.state.level,
                unlocked,
            };
            self.queue_level_up(level_up.clone());
            Some(level_up)
        } else {
            None
        };

        debug!(source, amount = applied, xp_total = self.state.xp_total, "XP awarded");
        self.refresh_mood();

        self.log.push(entry.clone());
        self.unsynced.push(entry.clone());
        if let Some(replay) = &mut self.replay {
            replay.push(amount);
        }
        let persist_error = self.persist().err();

        AwardOutcome {
            entry,
            level_up,
            persist_error,
        }
    }

    /// Undo the net XP recorded for `source_id`.
    ///
    /// Logs one offsetting negative entry; returns `None` when nothing is left
    /// to reverse (never awarded, or already reversed).
    pub fn reverse_award(
        &mut self,
        source: &str,
        source_id: &str,
        description: &str,
    ) -> Result<Option<AwardOutcome>, EngineError> {
        let net: i128 = self
            .log
            .iter()
            .filter(|e| e.source == source && e.source_id.as_deref() == Some(source_id))
            .map(|e| i128::from(e.amount))
            .sum();

        if net <= 0 {
            debug!(source, source_id, "Nothing to reverse");
            return Ok(None);
        }
        let net = i64::try_from(net).unwrap_or(i64::MAX);
        self.add_xp(-net, source, description, Some(source_id)).map(Some)
    }

    /// Award XP for a completed action and, if the source counts toward the
    /// streak, check the streak afterwards.
    pub fn record_completion(
        &mut self,
        source: XpSource,
        amount: i64,
        description: &str,
        source_id: Option<&str>,
    ) -> Result<Completion, EngineError> {
        let award = self.add_xp(amount, source.as_str(), description, source_id)?;
        let streak = source.drives_streak().then(|| self.check_streak());
        Ok(Completion { award, streak })
    }

    /// Consume the level up that happened since the last call, if any
    pub fn take_level_up(&mut self) -> Option<LevelUp> {
        self.pending_level_up.take()
    }

    fn queue_level_up(&mut self, level_up: LevelUp) {
        self.pending_level_up = Some(match self.pending_level_up.take() {
            Some(mut pending) => {
                pending.new_level = level_up.new_level;
                pending.unlocked.extend(level_up.unlocked);
                pending
            }
            None => level_up,
        });
    }

    // ========================================
    // STREAK OPERATIONS
    // ========================================

    /// Count today toward the daily streak.
    ///
    /// Calling it again on the same calendar day changes nothing.
    pub fn check_streak(&mut self) -> StreakReport {
        let now = self.clock.now();
        let today = now.date_naive();
        let current = self.state.streak_current;
        let transition = StreakTransition::evaluate(self.state.streak_day, today, current);

        if transition == StreakTransition::AlreadyCounted {
            return StreakReport {
                transition,
                streak_current: current,
                bonus: None,
                persist_error: None,
            };
        }

        let count = transition.resulting_count(current);
        self.state.streak_current = count;
        self.state.streak_longest = self.state.streak_longest.max(count);
        self.state.streak_day = Some(today);
        self.state.last_activity = Some(now);

        let bonus = match transition {
            StreakTransition::Extended { count } => milestone_bonus(count).map(|xp| {
                info!(count, xp, "Streak milestone reached");
                self.set_transient(Mood::Shining);
                self.award(
                    xp,
                    XpSource::StreakMilestone.as_str(),
                    &format!("{count}-day streak"),
                    None,
                )
            }),
            StreakTransition::Grace { count } => {
                info!(count, "Missed one day, streak kept");
                self.set_transient(Mood::Sleepy);
                None
            }
            StreakTransition::Broken { previous } => {
                info!(previous, "Streak broken, welcome back");
                self.set_transient(Mood::Determined);
                Some(self.award(
                    RETURN_BONUS_XP,
                    XpSource::ReturnBonus.as_str(),
                    "Welcome back",
                    None,
                ))
            }
            StreakTransition::Started | StreakTransition::AlreadyCounted => None,
        };

        let persist_error = match bonus {
            Some(_) => None,
            None => {
                self.refresh_mood();
                self.persist().err()
            }
        };

        StreakReport {
            transition,
            streak_current: self.state.streak_current,
            bonus,
            persist_error,
        }
    }

    // ========================================
    // MOOD
    // ========================================

    /// Mood right now: an unexpired event mood, else the recency mood
    pub fn current_mood(&self) -> Mood {
        let now = self.clock.now();
        match self.transient {
            Some(transient) if transient.is_active(now) => transient.mood,
            _ => Mood::from_recency(self.state.last_activity, now),
        }
    }

    /// Drop an expired event mood and update the cached mood
    pub fn refresh_mood(&mut self) -> Mood {
        let now = self.clock.now();
        if self.transient.is_some_and(|t| !t.is_active(now)) {
            self.transient = None;
        }
        self.state.mood = self.current_mood();
        self.state.mood
    }

    fn set_transient(&mut self, mood: Mood) {
        let until = self.clock.now()
            + chrono::Duration::from_std(self.settings.mood_transient)
                .unwrap_or_else(|_| chrono::Duration::seconds(4));
        self.transient = Some(TransientMood { mood, until });
        self.state.mood = mood;
    }

    // ========================================
    // PERSISTENCE
    // ========================================

    /// Write the full state (and any unsynced log entries) to the store
    pub fn save_state(&mut self) -> Result<(), EngineError> {
        self.persist().map_err(EngineError::from)
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let result = self.reconcile().and_then(|()| {
            let log_result = self.flush_log();
            let state_result = self.write_state();
            log_result.and(state_result)
        });
        if let Err(e) = &result {
            warn!(
                error = %e,
                unsynced = self.unsynced.len(),
                "Failed to persist progress, keeping local state"
            );
        }
        result
    }

    /// Merge this session into the saved progress once it can be read.
    ///
    /// Only does work after a load that could not read the store. Nothing is
    /// written until then, so every award of the session is still unsynced
    /// and is replayed onto the saved total with its requested amount.
    fn reconcile(&mut self) -> Result<(), StoreError> {
        let Some(requested) = self.replay.take() else {
            return Ok(());
        };
        let (saved, stored_log) = match read_saved(self.store.as_ref(), &self.settings.user_id) {
            Ok(found) => found,
            Err(e) => {
                self.replay = Some(requested);
                return Err(e);
            }
        };

        let record = match saved.map(|row| StateRecord::from_row(&row)) {
            Some(Ok(record)) => Some(record),
            Some(Err(e)) => {
                warn!(error = %e, "Saved progress unreadable, keeping this session's progress");
                None
            }
            None => None,
        };

        if let Some(record) = record {
            let session = std::mem::replace(&mut self.state, record.into_state());
            for (entry, amount) in self.unsynced.iter_mut().zip(requested) {
                entry.amount = self.state.apply_xp(amount);
            }
            self.merge_session(session);
            self.refresh_mood();
            info!(
                xp_total = self.state.xp_total,
                replayed = self.unsynced.len(),
                "Merged progress made while the store was unreachable"
            );
        }

        self.log = stored_log;
        self.log.extend(self.unsynced.iter().cloned());
        Ok(())
    }

    /// Fold the non-XP parts of a session state into the saved state
    fn merge_session(&mut self, session: EngineState) {
        let state = &mut self.state;
        state.last_activity = state.last_activity.max(session.last_activity);

        state.unlocked_creatures.extend(session.unlocked_creatures);
        state.unlocked_decorations.extend(session.unlocked_decorations);
        grant_up_to(
            state.level,
            &mut state.unlocked_creatures,
            &mut state.unlocked_decorations,
        );

        // only the last day counted this session is carried over
        if let Some(day) = session.streak_day {
            let transition = StreakTransition::evaluate(state.streak_day, day, state.streak_current);
            if transition != StreakTransition::AlreadyCounted {
                state.streak_current = transition.resulting_count(state.streak_current);
                state.streak_longest = state.streak_longest.max(state.streak_current);
                state.streak_day = Some(day);
            }
        }
    }

    fn flush_log(&mut self) -> Result<(), StoreError> {
        while let Some(entry) = self.unsynced.first() {
            self.store.append(XP_LOG_TABLE, &entry.to_row()?)?;
            self.unsynced.remove(0);
        }
        Ok(())
    }

    /// Write the state row; event moods are not stored
    fn write_state(&self) -> Result<(), StoreError> {
        let mut record = StateRecord::from_state(&self.settings.user_id, &self.state);
        record.mood = Mood::from_recency(self.state.last_activity, self.clock.now());
        self.store.write(STATE_TABLE, &record.to_row()?)
    }
}

/// Saved state row and XP log of one user
fn read_saved(
    store: &dyn RowStore,
    user_id: &str,
) -> Result<(Option<Row>, Vec<XpLogEntry>), StoreError> {
    let saved = store
        .read(STATE_TABLE)?
        .into_iter()
        .find(|row| row.get(KEY_COLUMN).and_then(|v| v.as_str()) == Some(user_id));

    let log = store
        .read(XP_LOG_TABLE)?
        .iter()
        .filter_map(|row| match XpLogEntry::from_row(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable XP log row");
                None
            }
        })
        .filter(|entry| entry.user_id == user_id)
        .collect();

    Ok((saved, log))
}
