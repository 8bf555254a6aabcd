//! Thread-safe engine handle
//!
//! Module stores may report completions from different threads; every call
//! goes through one mutex so no award is lost to a race.

use std::sync::{Arc, Mutex, MutexGuard};

use super::engine::{AwardOutcome, Completion, Engine, LevelUp, StreakReport};
use super::error::EngineError;
use super::mood::Mood;
use super::rewards::XpSource;
use super::state::EngineState;

#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Engine> {
        self.inner.lock().expect("Engine lock poisoned")
    }

    pub fn add_xp(
        &self,
        amount: i64,
        source: &str,
        description: &str,
        source_id: Option<&str>,
    ) -> Result<AwardOutcome, EngineError> {
        self.lock().add_xp(amount, source, description, source_id)
    }

    pub fn check_streak(&self) -> StreakReport {
        self.lock().check_streak()
    }

    pub fn record_completion(
        &self,
        source: XpSource,
        amount: i64,
        description: &str,
        source_id: Option<&str>,
    ) -> Result<Completion, EngineError> {
        self.lock()
            .record_completion(source, amount, description, source_id)
    }

    pub fn reverse_award(
        &self,
        source: &str,
        source_id: &str,
        description: &str,
    ) -> Result<Option<AwardOutcome>, EngineError> {
        self.lock().reverse_award(source, source_id, description)
    }

    pub fn take_level_up(&self) -> Option<LevelUp> {
        self.lock().take_level_up()
    }

    pub fn current_mood(&self) -> Mood {
        self.lock().current_mood()
    }

    pub fn save_state(&self) -> Result<(), EngineError> {
        self.lock().save_state()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> EngineState {
        self.lock().state().clone()
    }

    /// Run a closure with exclusive access to the engine
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        f(&mut self.lock())
    }
}
