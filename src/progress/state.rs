//! Engine state and its persisted records

use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::levels::{derive_level, LevelProgress};
use super::mood::Mood;
use crate::store::{Row, STATE_TABLE, XP_LOG_TABLE};

/// Progress of a single user
///
/// `level`, `xp_current_level` and `xp_for_next_level` are a cache of
/// [`derive_level`] applied to `xp_total` and are only ever set through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    pub level: u32,
    pub xp_current_level: u64,
    pub xp_total: u64,
    pub xp_for_next_level: u64,
    /// XP taken away below zero, paid back from later awards
    pub xp_debt: u64,
    pub streak_current: u32,
    pub streak_longest: u32,
    pub last_activity: Option<DateTime<Local>>,
    /// Calendar day the streak was last counted on
    pub streak_day: Option<NaiveDate>,
    pub unlocked_creatures: BTreeSet<String>,
    pub unlocked_decorations: BTreeSet<String>,
    pub mood: Mood,
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineState {
    /// Fresh level 1 state with no XP
    pub fn new() -> Self {
        let progress = derive_level(0);
        Self {
            level: progress.level,
            xp_current_level: progress.xp_current_level,
            xp_total: 0,
            xp_for_next_level: progress.xp_for_next_level,
            xp_debt: 0,
            streak_current: 0,
            streak_longest: 0,
            last_activity: None,
            streak_day: None,
            unlocked_creatures: BTreeSet::new(),
            unlocked_decorations: BTreeSet::new(),
            mood: Mood::Happy,
        }
    }

    pub fn level_progress(&self) -> LevelProgress {
        LevelProgress {
            level: self.level,
            xp_current_level: self.xp_current_level,
            xp_for_next_level: self.xp_for_next_level,
        }
    }

    /// Set lifetime XP and re-derive the level cache
    pub(crate) fn set_xp_total(&mut self, xp_total: u64) {
        let progress = derive_level(xp_total);
        self.xp_total = xp_total;
        self.level = progress.level;
        self.xp_current_level = progress.xp_current_level;
        self.xp_for_next_level = progress.xp_for_next_level;
    }

    /// Apply an XP change and return the change made to `xp_total`.
    ///
    /// `xp_total` stops at zero; whatever a negative amount could not take
    /// becomes debt, and positive amounts repay debt before adding XP. Over
    /// any sequence of amounts `xp_total == max(0, sum)`.
    pub(crate) fn apply_xp(&mut self, amount: i64) -> i64 {
        let old_total = self.xp_total;
        let magnitude = amount.unsigned_abs();

        if amount >= 0 {
            let repaid = magnitude.min(self.xp_debt);
            self.xp_debt -= repaid;
            self.set_xp_total(old_total.saturating_add(magnitude - repaid));
        } else {
            let taken = magnitude.min(old_total);
            self.xp_debt = self.xp_debt.saturating_add(magnitude - taken);
            self.set_xp_total(old_total - taken);
        }

        (i128::from(self.xp_total) - i128::from(old_total)) as i64
    }
}

/// Flat record of [`EngineState`] as written to the state table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateRecord {
    pub id: String,
    pub level: u32,
    pub xp_total: u64,
    pub xp_current_level: u64,
    pub xp_for_next_level: u64,
    pub xp_debt: u64,
    pub streak_current: u32,
    pub streak_longest: u32,
    pub last_activity: Option<DateTime<Local>>,
    pub streak_day: Option<NaiveDate>,
    #[serde(with = "comma_list")]
    pub unlocked_creatures: BTreeSet<String>,
    #[serde(with = "comma_list")]
    pub unlocked_decorations: BTreeSet<String>,
    pub mood: Mood,
}

impl StateRecord {
    pub fn from_state(user_id: &str, state: &EngineState) -> Self {
        Self {
            id: user_id.to_string(),
            level: state.level,
            xp_total: state.xp_total,
            xp_current_level: state.xp_current_level,
            xp_for_next_level: state.xp_for_next_level,
            xp_debt: state.xp_debt,
            streak_current: state.streak_current,
            streak_longest: state.streak_longest,
            last_activity: state.last_activity,
            streak_day: state.streak_day,
            unlocked_creatures: state.unlocked_creatures.clone(),
            unlocked_decorations: state.unlocked_decorations.clone(),
            mood: state.mood,
        }
    }

    /// Rebuild state from the record.
    ///
    /// The stored level fields are ignored; they are re-derived from
    /// `xp_total`. Records written before `streak_day` existed count the
    /// streak from the day of the last activity.
    pub fn into_state(self) -> EngineState {
        let mut state = EngineState {
            xp_debt: self.xp_debt,
            streak_current: self.streak_current,
            streak_longest: self.streak_longest.max(self.streak_current),
            last_activity: self.last_activity,
            streak_day: self
                .streak_day
                .or_else(|| self.last_activity.map(|t| t.date_naive())),
            unlocked_creatures: self.unlocked_creatures,
            unlocked_decorations: self.unlocked_decorations,
            mood: self.mood,
            ..EngineState::new()
        };
        state.set_xp_total(self.xp_total);
        state
    }

    pub fn to_row(&self) -> Result<Row, serde_json::Error> {
        to_row(self)
    }

    pub fn from_row(row: &Row) -> Result<Self, EngineError> {
        from_row(STATE_TABLE, row)
    }
}

/// One XP award, positive or negative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpLogEntry {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub timestamp: DateTime<Local>,
    pub source: String,
    #[serde(default)]
    pub source_id: Option<String>,
    /// Applied change to lifetime XP
    pub amount: i64,
    #[serde(default)]
    pub description: String,
}

impl XpLogEntry {
    pub fn to_row(&self) -> Result<Row, serde_json::Error> {
        to_row(self)
    }

    pub fn from_row(row: &Row) -> Result<Self, EngineError> {
        from_row(XP_LOG_TABLE, row)
    }
}

fn to_row<T: Serialize>(value: &T) -> Result<Row, serde_json::Error> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(row) => Ok(row),
        other => Err(serde::ser::Error::custom(format!(
            "expected a flat record, got {other}"
        ))),
    }
}

fn from_row<T: DeserializeOwned>(table: &'static str, row: &Row) -> Result<T, EngineError> {
    serde_json::from_value(serde_json::Value::Object(row.clone())).map_err(|e| {
        EngineError::CorruptRecord {
            table,
            reason: e.to_string(),
        }
    })
}

/// Sets stored as one comma-separated cell
mod comma_list {
    use std::collections::BTreeSet;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(set: &BTreeSet<String>, serializer: S) -> Result<S::Ok, S::Error> {
        let joined = set.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        serializer.serialize_str(&joined)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<String>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_fresh_state() {
        let state = EngineState::new();
        assert_eq!(state.level, 1);
        assert_eq!(state.xp_total, 0);
        assert_eq!(state.xp_for_next_level, 100);
        assert_eq!(state.mood, Mood::Happy);
    }

    #[test]
    fn test_debt_is_repaid_before_xp_grows() {
        let mut state = EngineState::new();
        assert_eq!(state.apply_xp(40), 40);
        assert_eq!(state.apply_xp(-100), -40);
        assert_eq!(state.xp_debt, 60);

        assert_eq!(state.apply_xp(50), 0);
        assert_eq!(state.xp_debt, 10);
        assert_eq!(state.apply_xp(30), 20);
        assert_eq!(state.xp_total, 20);
        assert_eq!(state.xp_debt, 0);
    }

    #[test]
    fn test_debt_round_trips_through_record() {
        let mut state = EngineState::new();
        state.apply_xp(-25);

        let row = StateRecord::from_state("u1", &state).to_row().unwrap();
        let restored = StateRecord::from_row(&row).unwrap().into_state();
        assert_eq!(restored.xp_debt, 25);
        assert_eq!(restored.xp_total, 0);
    }

    #[test]
    fn test_record_is_flat() {
        let mut state = EngineState::new();
        state.set_xp_total(250);
        state.unlocked_creatures.insert("hedgehog".to_string());
        state.unlocked_decorations.insert("flower_bed".to_string());
        state.unlocked_decorations.insert("mushroom_lantern".to_string());

        let row = StateRecord::from_state("u1", &state).to_row().unwrap();
        assert_eq!(row["id"], json!("u1"));
        assert_eq!(row["level"], json!(3));
        assert_eq!(row["unlocked_creatures"], json!("hedgehog"));
        assert_eq!(
            row["unlocked_decorations"],
            json!("flower_bed,mushroom_lantern")
        );
        assert!(row.values().all(|v| !v.is_object() && !v.is_array()));
    }

    #[test]
    fn test_stored_level_is_not_trusted() {
        let row = json!({"id": "u1", "level": 42, "xp_total": 250, "xp_current_level": 7})
            .as_object()
            .cloned()
            .unwrap();
        let state = StateRecord::from_row(&row).unwrap().into_state();
        assert_eq!(state.level, 3);
        assert_eq!(state.xp_current_level, 30);
        assert_eq!(state.xp_for_next_level, 144);
    }

    #[test]
    fn test_missing_fields_default_and_streak_day_falls_back() {
        let last = Local.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).single().unwrap();
        let record = StateRecord {
            id: "u1".to_string(),
            streak_current: 4,
            last_activity: Some(last),
            ..StateRecord::default()
        };
        let row = record.to_row().unwrap();

        let state = StateRecord::from_row(&row).unwrap().into_state();
        assert_eq!(state.streak_day, Some(last.date_naive()));
        assert_eq!(state.streak_longest, 4);
        assert!(state.unlocked_creatures.is_empty());
    }

    #[test]
    fn test_corrupt_row_is_reported() {
        let row = json!({"id": "u1", "xp_total": "lots"})
            .as_object()
            .cloned()
            .unwrap();
        let err = StateRecord::from_row(&row).unwrap_err();
        assert!(matches!(
            err,
            EngineError::CorruptRecord {
                table: STATE_TABLE,
                ..
            }
        ));
    }
}
