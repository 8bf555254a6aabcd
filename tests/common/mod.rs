//! Shared test utilities for engine integration tests

#![allow(dead_code)]

use chrono::{DateTime, Local, TimeZone};

use grove::progress::{Engine, EngineSettings, ManualClock, StateRecord};
use grove::store::{MemoryStore, RowStore, STATE_TABLE};

/// Local noon on the given day (noon keeps DST shifts on the same date)
pub fn noon(year: i32, month: u32, day: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("noon is unambiguous")
}

/// A start date used across tests
pub fn day_one() -> DateTime<Local> {
    noon(2026, 3, 10)
}

/// Creates an engine on an empty in-memory store
pub fn fresh_engine() -> (Engine, MemoryStore, ManualClock) {
    let store = MemoryStore::new();
    let clock = ManualClock::new(day_one());
    let engine = Engine::load(store.clone(), clock.clone(), EngineSettings::default())
        .expect("Failed to load fresh engine");
    (engine, store, clock)
}

/// Creates an engine whose saved state is `record`
pub fn engine_from_record(record: StateRecord, now: DateTime<Local>) -> (Engine, MemoryStore, ManualClock) {
    let store = MemoryStore::new();
    store
        .write(STATE_TABLE, &record.to_row().expect("Failed to encode record"))
        .expect("Failed to seed store");
    let clock = ManualClock::new(now);
    let engine = Engine::load(store.clone(), clock.clone(), EngineSettings::default())
        .expect("Failed to load seeded engine");
    (engine, store, clock)
}

/// Saved state of a user who last counted their streak at `last`
pub fn streak_record(streak_current: u32, streak_longest: u32, last: DateTime<Local>) -> StateRecord {
    StateRecord {
        id: EngineSettings::default().user_id,
        streak_current,
        streak_longest,
        last_activity: Some(last),
        streak_day: Some(last.date_naive()),
        ..StateRecord::default()
    }
}
