//! Integration tests for XP awards, level derivation and unlocks

mod common;

use std::thread;

use chrono::Duration;

use grove::progress::{
    derive_level, total_xp_for_level, Mood, SharedEngine, StateRecord, UnlockKind, XpSource,
};

use grove::store::{RowStore, STATE_TABLE};

use common::{day_one, engine_from_record, fresh_engine};

#[test]
fn test_fresh_user_reaches_level_two_at_exactly_100() {
    let (mut engine, _, _) = fresh_engine();
    engine.add_xp(100, "task_completion", "x", None).unwrap();

    let state = engine.state();
    assert_eq!(state.level, 2);
    assert_eq!(state.xp_current_level, 0);
    assert_eq!(state.xp_for_next_level, 120);
}

#[test]
fn test_fresh_user_250_xp() {
    let (mut engine, _, _) = fresh_engine();
    engine.add_xp(250, "task_completion", "x", None).unwrap();

    let state = engine.state();
    assert_eq!(state.level, 3);
    assert_eq!(state.xp_current_level, 30);
    assert_eq!(state.xp_for_next_level, 144);
}

#[test]
fn test_xp_total_matches_sum_of_awards() {
    let (mut engine, _, _) = fresh_engine();
    let amounts = [5, 40, -10, 200, -30, 7, 0, 1];
    for amount in amounts {
        engine.add_xp(amount, "diary_entry", "entry", None).unwrap();
    }

    let expected: i64 = amounts.iter().sum();
    assert_eq!(engine.state().xp_total as i64, expected);

    let logged: i64 = engine.log().iter().map(|e| e.amount).sum();
    assert_eq!(logged, expected);
    assert_eq!(engine.log().len(), amounts.len());
    assert_eq!(engine.state().level_progress(), derive_level(expected as u64));
}

#[test]
fn test_xp_total_is_sum_floored_at_zero_when_dipping_below() {
    let (mut engine, _, _) = fresh_engine();
    for amount in [40, -100, 70] {
        engine.add_xp(amount, "finance_entry", "budget", None).unwrap();
    }

    assert_eq!(engine.state().xp_total, 10);
    assert_eq!(engine.state().xp_debt, 0);
    let logged: Vec<i64> = engine.log().iter().map(|e| e.amount).collect();
    assert_eq!(logged, vec![40, -40, 10]);
}

#[test]
fn test_xp_total_tracks_running_sum_over_mixed_sequence() {
    let (mut engine, _, _) = fresh_engine();
    let amounts = [-30, 10, 25, -5, -50, 120, -200, 90, 15];
    let mut running: i64 = 0;
    for amount in amounts {
        engine.add_xp(amount, "health_record", "walk", None).unwrap();
        running += amount;
        assert_eq!(engine.state().xp_total as i64, running.max(0));
    }

    let logged: i64 = engine.log().iter().map(|e| e.amount).sum();
    assert_eq!(logged, engine.state().xp_total as i64);
}

#[test]
fn test_multi_level_jump_unlocks_skipped_levels() {
    let (mut engine, _, _) = fresh_engine();
    assert!(engine.state().unlocked_creatures.is_empty());

    let outcome = engine
        .add_xp(total_xp_for_level(5) as i64, "travel_plan", "big trip", None)
        .unwrap();

    let state = engine.state();
    assert_eq!(state.level, 5);
    assert!(state.unlocked_creatures.contains("hedgehog")); // level 3
    assert!(state.unlocked_creatures.contains("fox")); // level 5
    assert!(state.unlocked_decorations.contains("flower_bed"));
    assert!(!state.unlocked_creatures.contains("owl"));

    let level_up = outcome.level_up.unwrap();
    assert_eq!((level_up.old_level, level_up.new_level), (1, 5));
    assert!(
        level_up
            .unlocked
            .iter()
            .any(|u| u.id == "hedgehog" && u.kind == UnlockKind::Creature)
    );
}

#[test]
fn test_unlocks_survive_xp_reversal() {
    let (mut engine, _, _) = fresh_engine();
    engine
        .add_xp(300, "task_completion", "sprint", Some("task-1"))
        .unwrap();
    assert_eq!(engine.state().level, 3);

    engine
        .reverse_award("task_completion", "task-1", "reopened")
        .unwrap()
        .unwrap();

    let state = engine.state();
    assert_eq!(state.xp_total, 0);
    assert_eq!(state.level, 1);
    assert!(state.unlocked_creatures.contains("hedgehog"));

    // earning the level again grants nothing twice
    let outcome = engine.add_xp(300, "task_completion", "again", None).unwrap();
    assert!(outcome.level_up.unwrap().unlocked.is_empty());
    assert_eq!(engine.state().unlocked_creatures.len(), 1);
}

#[test]
fn test_habit_toggle_reverses_xp() {
    let (mut engine, _, _) = fresh_engine();
    engine
        .record_completion(XpSource::HabitCompletion, 9, "meditate", Some("habit-3"))
        .unwrap();
    engine
        .reverse_award(XpSource::HabitCompletion.as_str(), "habit-3", "unchecked")
        .unwrap();

    assert_eq!(engine.state().xp_total, 0);
    let amounts: Vec<i64> = engine.log().iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![9, -9]);
}

#[test]
fn test_load_rederives_level_and_catches_up_unlocks() {
    let record = StateRecord {
        id: "default".to_string(),
        level: 1,
        xp_total: 700,
        xp_current_level: 700,
        xp_for_next_level: 100,
        ..StateRecord::default()
    };
    let (engine, store, _) = engine_from_record(record, day_one());

    let state = engine.state();
    assert_eq!(state.level, 5);
    assert_eq!(state.xp_current_level, 700 - total_xp_for_level(5));
    assert!(state.unlocked_creatures.contains("hedgehog"));
    assert!(state.unlocked_creatures.contains("fox"));

    // the catch-up is written back right away
    let rows = store.read(STATE_TABLE).unwrap();
    let saved = StateRecord::from_row(&rows[0]).unwrap();
    assert!(saved.unlocked_creatures.contains("fox"));
    assert_eq!(saved.level, 5);
}

#[test]
fn test_load_drops_transient_mood() {
    let record = StateRecord {
        id: "default".to_string(),
        last_activity: Some(day_one() - Duration::days(1)),
        mood: Mood::Excited,
        ..StateRecord::default()
    };
    let (engine, _, _) = engine_from_record(record, day_one());
    assert_eq!(engine.state().mood, Mood::Sleepy);
    assert_eq!(engine.current_mood(), Mood::Sleepy);
}

#[test]
fn test_mood_follows_recency() {
    let (mut engine, _, clock) = fresh_engine();
    engine.add_xp(5, "finance_entry", "coffee", None).unwrap();
    assert_eq!(engine.current_mood(), Mood::Happy);

    clock.advance(Duration::days(1));
    assert_eq!(engine.current_mood(), Mood::Sleepy);

    clock.advance(Duration::days(1));
    assert_eq!(engine.refresh_mood(), Mood::Sad);
}

#[test]
fn test_concurrent_awards_are_not_lost() {
    let (engine, _, _) = fresh_engine();
    let engine = SharedEngine::new(engine);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let engine = engine.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    let id = format!("w{worker}-{i}");
                    engine
                        .add_xp(5, "diary_entry", "entry", Some(id.as_str()))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let state = engine.snapshot();
    assert_eq!(state.xp_total, 8 * 25 * 5);
    assert_eq!(engine.with(|e| e.log().len()), 200);
}
