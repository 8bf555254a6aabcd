//! Grove - progress engine for the forest village life organizer
//!
//! Every tracked action in the organizer (tasks, habits, diary, finances,
//! recipes, health, relationships, insurance, travel, calendar) earns XP.
//! This crate owns what that XP turns into: a level with a geometric cost
//! curve, a daily streak with a one-day grace period, cosmetic creatures and
//! decorations unlocked along the way, and the mood of the village avatar.
//!
//! ## Layout
//!
//! - [`progress`]: the engine, its state, and the level/streak/unlock rules
//! - [`store`]: row storage the engine persists through (SQLite, in-memory)
//! - [`config`]: `~/.grove/config.toml`

pub mod config;
pub mod progress;
pub mod store;
