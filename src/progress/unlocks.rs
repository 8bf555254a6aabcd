//! Cosmetic unlocks for the forest village
//!
//! A sparse table mapping levels to the creatures and decorations they grant.

use std::collections::BTreeSet;

/// What a cosmetic unlock adds to the village
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnlockKind {
    Creature,
    Decoration,
}

impl UnlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creature => "creature",
            Self::Decoration => "decoration",
        }
    }
}

/// Unlock definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unlock {
    pub level: u32,
    pub kind: UnlockKind,
    pub id: &'static str,
    pub name: &'static str,
}

/// All unlock definitions (must be sorted by level)
pub static UNLOCKS: &[Unlock] = &[
    Unlock {
        level: 2,
        kind: UnlockKind::Decoration,
        id: "mushroom_lantern",
        name: "Mushroom Lantern",
    },
    Unlock {
        level: 3,
        kind: UnlockKind::Creature,
        id: "hedgehog",
        name: "Hedgehog",
    },
    Unlock {
        level: 3,
        kind: UnlockKind::Decoration,
        id: "flower_bed",
        name: "Flower Bed",
    },
    Unlock {
        level: 5,
        kind: UnlockKind::Creature,
        id: "fox",
        name: "Fox",
    },
    Unlock {
        level: 5,
        kind: UnlockKind::Decoration,
        id: "stone_path",
        name: "Stone Path",
    },
    Unlock {
        level: 7,
        kind: UnlockKind::Decoration,
        id: "wishing_well",
        name: "Wishing Well",
    },
    Unlock {
        level: 8,
        kind: UnlockKind::Creature,
        id: "owl",
        name: "Owl",
    },
    Unlock {
        level: 10,
        kind: UnlockKind::Creature,
        id: "deer",
        name: "Deer",
    },
    Unlock {
        level: 10,
        kind: UnlockKind::Decoration,
        id: "treehouse",
        name: "Treehouse",
    },
    Unlock {
        level: 12,
        kind: UnlockKind::Decoration,
        id: "fairy_lights",
        name: "Fairy Lights",
    },
    Unlock {
        level: 15,
        kind: UnlockKind::Creature,
        id: "bear",
        name: "Bear",
    },
    Unlock {
        level: 15,
        kind: UnlockKind::Decoration,
        id: "windmill",
        name: "Windmill",
    },
    Unlock {
        level: 20,
        kind: UnlockKind::Creature,
        id: "white_stag",
        name: "White Stag",
    },
    Unlock {
        level: 20,
        kind: UnlockKind::Decoration,
        id: "crystal_pond",
        name: "Crystal Pond",
    },
    Unlock {
        level: 25,
        kind: UnlockKind::Decoration,
        id: "ancient_oak",
        name: "Ancient Oak",
    },
    Unlock {
        level: 30,
        kind: UnlockKind::Creature,
        id: "phoenix",
        name: "Phoenix",
    },
];

impl Unlock {
    /// All unlocks granted at or below `level`
    pub fn up_to(level: u32) -> impl Iterator<Item = &'static Unlock> {
        UNLOCKS.iter().filter(move |u| u.level <= level)
    }

    /// Look up an unlock by identifier
    pub fn get(id: &str) -> Option<&'static Unlock> {
        UNLOCKS.iter().find(|u| u.id == id)
    }
}

/// Insert every unlock up to `level` into the given sets.
///
/// Returns the unlocks that were not present before, so repeated calls are
/// no-ops.
pub fn grant_up_to(
    level: u32,
    creatures: &mut BTreeSet<String>,
    decorations: &mut BTreeSet<String>,
) -> Vec<&'static Unlock> {
    let mut granted = Vec::new();
    for unlock in Unlock::up_to(level) {
        let set = match unlock.kind {
            UnlockKind::Creature => &mut *creatures,
            UnlockKind::Decoration => &mut *decorations,
        };
        if set.insert(unlock.id.to_string()) {
            granted.push(unlock);
        }
    }
    granted
}
