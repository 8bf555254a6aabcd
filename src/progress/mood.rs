//! Avatar mood projection
//!
//! Mood is presentation-only: it follows the recency of the last activity,
//! with short-lived overrides after notable events.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::streaks::days_between;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Happy,
    Sleepy,
    Sad,
    Excited,
    Shining,
    Determined,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sleepy => "sleepy",
            Self::Sad => "sad",
            Self::Excited => "excited",
            Self::Shining => "shining",
            Self::Determined => "determined",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "happy" => Some(Self::Happy),
            "sleepy" => Some(Self::Sleepy),
            "sad" => Some(Self::Sad),
            "excited" => Some(Self::Excited),
            "shining" => Some(Self::Shining),
            "determined" => Some(Self::Determined),
            _ => None,
        }
    }

    /// Mood derived from how long ago the user was last active.
    ///
    /// No activity at all reads as a fresh start, so `happy`.
    pub fn from_recency(last_activity: Option<DateTime<Local>>, now: DateTime<Local>) -> Self {
        let Some(last) = last_activity else {
            return Self::Happy;
        };
        match days_between(last.date_naive(), now.date_naive()) {
            0 => Self::Happy,
            1 => Self::Sleepy,
            _ => Self::Sad,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mood override that expires at a fixed instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransientMood {
    pub mood: Mood,
    pub until: DateTime<Local>,
}

impl TransientMood {
    pub fn is_active(&self, now: DateTime<Local>) -> bool {
        now < self.until
    }
}
