//! XP and Level system
//!
//! Level costs grow geometrically: advancing from level 1 costs 100 XP and
//! every following level costs 20% more than the one before, rounded half-up
//! at each step. Levels are never stored authoritatively; they are always
//! derived from lifetime XP with [`derive_level`].

use serde::{Deserialize, Serialize};

/// XP needed to advance from level 1 to level 2
pub const BASE_LEVEL_COST: u64 = 100;

/// Cost of the step following `cost`, i.e. `round_half_up(cost * 1.2)`.
///
/// Integer-only so the curve never drifts from the reference growth.
fn next_cost(cost: u64) -> u64 {
    cost.saturating_mul(12).saturating_add(5) / 10
}

/// XP required to advance from `level` to `level + 1`.
///
/// Level 0 is treated as level 1.
pub fn cost_for_level(level: u32) -> u64 {
    let mut cost = BASE_LEVEL_COST;
    for _ in 1..level {
        cost = next_cost(cost);
    }
    cost
}

/// Lifetime XP at which `level` is reached (0 for level 1).
pub fn total_xp_for_level(level: u32) -> u64 {
    let mut total = 0u64;
    let mut cost = BASE_LEVEL_COST;
    for _ in 1..level {
        total = total.saturating_add(cost);
        cost = next_cost(cost);
    }
    total
}

/// Level projection derived from lifetime XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    /// XP accumulated inside the current level
    pub xp_current_level: u64,
    /// XP needed inside the current level to reach the next one
    pub xp_for_next_level: u64,
}

impl LevelProgress {
    /// Progress toward the next level (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        if self.xp_for_next_level == 0 {
            return 1.0;
        }
        (self.xp_current_level as f32 / self.xp_for_next_level as f32).min(1.0)
    }
}

/// Derive level, in-level XP and next-level cost from lifetime XP.
///
/// Pure: the same `xp_total` always yields the same projection.
pub fn derive_level(xp_total: u64) -> LevelProgress {
    let mut level = 1u32;
    let mut accumulated = 0u64;
    let mut cost = BASE_LEVEL_COST;

    loop {
        match accumulated.checked_add(cost) {
            Some(next) if next <= xp_total => {
                accumulated = next;
                level += 1;
                cost = next_cost(cost);
            }
            _ => break,
        }
    }

    LevelProgress {
        level,
        xp_current_level: xp_total - accumulated,
        xp_for_next_level: cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_table_start() {
        assert_eq!(cost_for_level(1), 100);
        assert_eq!(cost_for_level(2), 120);
        assert_eq!(cost_for_level(3), 144);
        assert_eq!(cost_for_level(4), 173); // 172.8 rounds up
        assert_eq!(cost_for_level(5), 208); // 207.6 rounds up
    }

    #[test]
    fn test_cost_growth_is_monotonic() {
        let mut previous = cost_for_level(1);
        for level in 2..200 {
            let cost = cost_for_level(level);
            assert!(cost >= previous, "cost({level}) = {cost} < {previous}");
            previous = cost;
        }
    }

    #[test]
    fn test_derive_level_fresh() {
        let progress = derive_level(0);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.xp_current_level, 0);
        assert_eq!(progress.xp_for_next_level, 100);
    }

    #[test]
    fn test_derive_level_exact_boundary() {
        let progress = derive_level(100);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.xp_current_level, 0);
        assert_eq!(progress.xp_for_next_level, 120);

        assert_eq!(derive_level(99).level, 1);
        assert_eq!(derive_level(219).level, 2);
        assert_eq!(derive_level(220).level, 3);
    }

    #[test]
    fn test_derive_level_with_remainder() {
        let progress = derive_level(250);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.xp_current_level, 30);
        assert_eq!(progress.xp_for_next_level, 144);
    }

    #[test]
    fn test_derive_level_is_idempotent() {
        for xp in [0, 1, 99, 100, 101, 250, 12_345, 9_999_999] {
            assert_eq!(derive_level(xp), derive_level(xp));
        }
    }

    #[test]
    fn test_level_round_trip() {
        for level in 1..80 {
            let total = total_xp_for_level(level);
            let progress = derive_level(total);
            assert_eq!(progress.level, level);
            assert_eq!(progress.xp_current_level, 0);
            assert_eq!(progress.xp_for_next_level, cost_for_level(level));
            if total > 0 {
                assert_eq!(derive_level(total - 1).level, level - 1);
            }
        }
    }

    #[test]
    fn test_derive_level_huge_xp_terminates() {
        let progress = derive_level(u64::MAX);
        assert!(progress.level > 100);
        assert!(progress.xp_current_level < progress.xp_for_next_level);
    }

    #[test]
    fn test_fraction() {
        let progress = derive_level(160); // level 2, 60 of 120
        assert!((progress.fraction() - 0.5).abs() < 0.001);
    }
}
