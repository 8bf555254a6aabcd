//! Streak tracking system
//!
//! Tracks consecutive days with at least one streak-relevant completion.
//! A single missed day is forgiven (grace day); a longer gap breaks the streak.

use chrono::NaiveDate;

/// XP awarded when the user comes back after a broken streak
pub const RETURN_BONUS_XP: i64 = 30;

/// Streak lengths that pay out bonus XP, with their reward
pub static STREAK_MILESTONES: &[(u32, i64)] = &[
    (3, 15),
    (7, 40),
    (14, 80),
    (30, 200),
    (60, 400),
    (100, 1000),
    (365, 5000),
];

/// Bonus XP for reaching exactly `streak` days, if it is a milestone
pub fn milestone_bonus(streak: u32) -> Option<i64> {
    STREAK_MILESTONES
        .iter()
        .find(|(days, _)| *days == streak)
        .map(|(_, xp)| *xp)
}

/// Calendar days between two dates, clamped at zero for clock skew
pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days().max(0)
}

/// Result of applying one streak check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// First streak check ever
    Started,
    /// Already counted today
    AlreadyCounted,
    /// Activity on the day after the last counted day
    Extended { count: u32 },
    /// One missed day; streak kept
    Grace { count: u32 },
    /// Gap too long; streak restarts at 1
    Broken { previous: u32 },
}

impl StreakTransition {
    /// Decide the transition for a check on `today`
    pub fn evaluate(last_day: Option<NaiveDate>, today: NaiveDate, current: u32) -> Self {
        let Some(last_day) = last_day else {
            return Self::Started;
        };

        match days_between(last_day, today) {
            0 => Self::AlreadyCounted,
            1 => Self::Extended {
                count: current.saturating_add(1),
            },
            2 => Self::Grace { count: current },
            _ => Self::Broken { previous: current },
        }
    }

    /// Streak length after the transition
    pub fn resulting_count(&self, current: u32) -> u32 {
        match self {
            Self::Started | Self::Broken { .. } => 1,
            Self::AlreadyCounted => current,
            Self::Extended { count } | Self::Grace { count } => *count,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::AlreadyCounted => "already_counted",
            Self::Extended { .. } => "extended",
            Self::Grace { .. } => "grace",
            Self::Broken { .. } => "broken",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_first_check_starts() {
        assert_eq!(
            StreakTransition::evaluate(None, day(10), 0),
            StreakTransition::Started
        );
    }

    #[test]
    fn test_transitions_by_gap() {
        assert_eq!(
            StreakTransition::evaluate(Some(day(10)), day(10), 4),
            StreakTransition::AlreadyCounted
        );
        assert_eq!(
            StreakTransition::evaluate(Some(day(10)), day(11), 4),
            StreakTransition::Extended { count: 5 }
        );
        assert_eq!(
            StreakTransition::evaluate(Some(day(10)), day(12), 4),
            StreakTransition::Grace { count: 4 }
        );
        assert_eq!(
            StreakTransition::evaluate(Some(day(10)), day(13), 4),
            StreakTransition::Broken { previous: 4 }
        );
    }

    #[test]
    fn test_month_rollover_is_consecutive() {
        let last = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(
            StreakTransition::evaluate(Some(last), today, 2),
            StreakTransition::Extended { count: 3 }
        );
    }

    #[test]
    fn test_clock_skew_counts_as_same_day() {
        assert_eq!(days_between(day(12), day(10)), 0);
        assert_eq!(
            StreakTransition::evaluate(Some(day(12)), day(10), 3),
            StreakTransition::AlreadyCounted
        );
    }

    #[test]
    fn test_milestones() {
        assert_eq!(milestone_bonus(3), Some(15));
        assert_eq!(milestone_bonus(7), Some(40));
        assert_eq!(milestone_bonus(365), Some(5000));
        assert_eq!(milestone_bonus(6), None);
        assert_eq!(milestone_bonus(8), None);
    }

    #[test]
    fn test_resulting_count() {
        assert_eq!(StreakTransition::Started.resulting_count(0), 1);
        assert_eq!(StreakTransition::Broken { previous: 9 }.resulting_count(9), 1);
        assert_eq!(StreakTransition::Grace { count: 9 }.resulting_count(9), 9);
        assert_eq!(StreakTransition::AlreadyCounted.resulting_count(9), 9);
    }
}
