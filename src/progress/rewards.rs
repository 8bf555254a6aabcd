//! XP sources and per-module reward rules
//!
//! Module stores compute their own award with these rules and hand the
//! amount to the engine together with the source name.

use chrono::NaiveDate;

/// Where an XP award came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XpSource {
    TaskCompletion,
    HabitCompletion,
    DiaryEntry,
    FinanceEntry,
    RecipeAdded,
    HealthRecord,
    RelationshipContact,
    InsurancePolicy,
    TravelPlan,
    CalendarEvent,
    StreakMilestone,
    ReturnBonus,
}

impl XpSource {
    /// Get the string ID used in the XP log
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskCompletion => "task_completion",
            Self::HabitCompletion => "habit_completion",
            Self::DiaryEntry => "diary_entry",
            Self::FinanceEntry => "finance_entry",
            Self::RecipeAdded => "recipe_added",
            Self::HealthRecord => "health_record",
            Self::RelationshipContact => "relationship_contact",
            Self::InsurancePolicy => "insurance_policy",
            Self::TravelPlan => "travel_plan",
            Self::CalendarEvent => "calendar_event",
            Self::StreakMilestone => "streak_milestone",
            Self::ReturnBonus => "return_bonus",
        }
    }

    /// Parse from log string
    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|source| source.as_str() == s)
    }

    pub fn all() -> &'static [XpSource] {
        &[
            Self::TaskCompletion,
            Self::HabitCompletion,
            Self::DiaryEntry,
            Self::FinanceEntry,
            Self::RecipeAdded,
            Self::HealthRecord,
            Self::RelationshipContact,
            Self::InsurancePolicy,
            Self::TravelPlan,
            Self::CalendarEvent,
            Self::StreakMilestone,
            Self::ReturnBonus,
        ]
    }

    /// Whether completing this kind of action counts toward the daily streak
    pub fn drives_streak(&self) -> bool {
        matches!(self, Self::TaskCompletion | Self::HabitCompletion)
    }
}

/// How demanding a task is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskComplexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

impl TaskComplexity {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "simple" | "easy" => Some(Self::Simple),
            "medium" => Some(Self::Medium),
            "complex" | "hard" => Some(Self::Complex),
            _ => None,
        }
    }
}

/// XP rewards for the organizer modules
pub struct XpRewards;

impl XpRewards {
    pub const DIARY_ENTRY: i64 = 10;
    pub const FINANCE_ENTRY: i64 = 5;
    pub const RECIPE_ADDED: i64 = 8;
    pub const HEALTH_RECORD: i64 = 5;
    pub const RELATIONSHIP_CONTACT: i64 = 5;
    pub const INSURANCE_POLICY: i64 = 10;
    pub const TRAVEL_PLAN: i64 = 15;
    pub const CALENDAR_EVENT: i64 = 3;

    /// Base XP for a habit check-in
    pub const HABIT_BASE: i64 = 5;

    /// Task XP by complexity, adjusted for the deadline.
    ///
    /// Finishing on or before the deadline adds 25%; finishing late halves
    /// the base. Tasks without a deadline get the base amount.
    pub fn task_completion(
        complexity: TaskComplexity,
        deadline: Option<NaiveDate>,
        completed_on: NaiveDate,
    ) -> i64 {
        let base: i64 = match complexity {
            TaskComplexity::Simple => 10,
            TaskComplexity::Medium => 25,
            TaskComplexity::Complex => 50,
        };
        match deadline {
            Some(deadline) if completed_on <= deadline => base + (base + 2) / 4,
            Some(_) => (base / 2).max(1),
            None => base,
        }
    }

    /// Habit XP: one extra point per day of the habit's own streak, capped at 10
    pub fn habit_completion(habit_streak: u32) -> i64 {
        Self::HABIT_BASE + i64::from(habit_streak.min(10))
    }

    /// Fixed reward for a module that has no special rule
    pub fn fixed(source: XpSource) -> Option<i64> {
        match source {
            XpSource::DiaryEntry => Some(Self::DIARY_ENTRY),
            XpSource::FinanceEntry => Some(Self::FINANCE_ENTRY),
            XpSource::RecipeAdded => Some(Self::RECIPE_ADDED),
            XpSource::HealthRecord => Some(Self::HEALTH_RECORD),
            XpSource::RelationshipContact => Some(Self::RELATIONSHIP_CONTACT),
            XpSource::InsurancePolicy => Some(Self::INSURANCE_POLICY),
            XpSource::TravelPlan => Some(Self::TRAVEL_PLAN),
            XpSource::CalendarEvent => Some(Self::CALENDAR_EVENT),
            _ => None,
        }
    }
}
