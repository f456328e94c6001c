//! Static catalog of characters and aurora dice.
//!
//! Both sets are closed and immutable for the lifetime of the process.
//! Behavior is attached by identity: the ability resolver matches on
//! [`CharacterId`] / [`AuroraDieId`] rather than storing callbacks.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EngineError;

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// Identity of a playable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterId {
    /// Growth on heavy hits, retaliation on light ones.
    Xiadie,
    /// Pierces when every selected attack die is a 4.
    Huangquan,
    /// Upgrades pool dice after an all-even attack.
    Zhigengniao,
    /// Gains aurora uses each round and ascends after four bonus triggers.
    Daheita,
    /// Once-per-match guard on defense, lifesteal on attack.
    Baie,
}

impl CharacterId {
    /// Every character, in catalog order.
    pub const ALL: [CharacterId; 5] = [
        Self::Xiadie,
        Self::Huangquan,
        Self::Zhigengniao,
        Self::Daheita,
        Self::Baie,
    ];

    /// The wire id (`"xiadie"`, `"huangquan"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xiadie => "xiadie",
            Self::Huangquan => "huangquan",
            Self::Zhigengniao => "zhigengniao",
            Self::Daheita => "daheita",
            Self::Baie => "baie",
        }
    }

    /// The static catalog entry for this id.
    pub fn character(self) -> &'static Character {
        match self {
            Self::Xiadie => &XIADIE,
            Self::Huangquan => &HUANGQUAN,
            Self::Zhigengniao => &ZHIGENGNIAO,
            Self::Daheita => &DAHEITA,
            Self::Baie => &BAIE,
        }
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| EngineError::UnknownCharacter(s.to_string()))
    }
}

/// A catalog character: base stats plus the dice pool it rolls.
#[derive(Debug)]
pub struct Character {
    pub id: CharacterId,
    pub name: &'static str,
    pub max_hp: i32,
    /// Side counts of the pool dice, one entry per slot.
    pub dice_sides: &'static [u32],
    /// Aurora die uses at match start. Zero means the character cannot
    /// equip an aurora die at all.
    pub aurora_uses: u32,
    pub attack_level: usize,
    pub defense_level: usize,
    pub skill_text: &'static str,
}

impl Character {
    /// Whether a loadout with this character must carry an aurora die.
    pub fn requires_aurora(&self) -> bool {
        self.aurora_uses > 0
    }

    /// Compact stat line, e.g. `"2x8 1x6 2x4 2A 3+2"`.
    pub fn short_spec(&self) -> String {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for &sides in self.dice_sides {
            *counts.entry(sides).or_default() += 1;
        }
        let pool: Vec<String> = counts
            .iter()
            .rev()
            .map(|(sides, count)| format!("{count}x{sides}"))
            .collect();
        format!(
            "{} {}A {}+{}",
            pool.join(" "),
            self.aurora_uses,
            self.attack_level,
            self.defense_level
        )
    }

    pub fn summary(&self) -> CharacterSummary {
        CharacterSummary {
            id: self.id,
            name: self.name.to_string(),
            hp: self.max_hp,
            dice_sides: self.dice_sides.to_vec(),
            aurora_uses: self.aurora_uses,
            attack_level: self.attack_level,
            defense_level: self.defense_level,
            short_spec: self.short_spec(),
            skill_text: self.skill_text.to_string(),
        }
    }
}

static XIADIE: Character = Character {
    id: CharacterId::Xiadie,
    name: "遐蝶",
    max_hp: 27,
    dice_sides: &[8, 8, 6, 4, 4],
    aurora_uses: 2,
    attack_level: 3,
    defense_level: 2,
    skill_text: "Defending: a single hit of 8+ raises attack and defense level by 1; \
                 a single hit of 1-5 deals 3 instant damage back to the attacker.",
};

static HUANGQUAN: Character = Character {
    id: CharacterId::Huangquan,
    name: "黄泉",
    max_hp: 33,
    dice_sides: &[8, 6, 4, 4, 4],
    aurora_uses: 2,
    attack_level: 2,
    defense_level: 3,
    skill_text: "Attacking: if every selected die is a 4 the attack pierces \
                 (ignores defense and force fields) and attack level rises by 1.",
};

static ZHIGENGNIAO: Character = Character {
    id: CharacterId::Zhigengniao,
    name: "知更鸟",
    max_hp: 30,
    dice_sides: &[6, 6, 4, 4, 4],
    aurora_uses: 0,
    attack_level: 4,
    defense_level: 3,
    skill_text: "Attacking: if every selected die is even, those pool dice \
                 upgrade one step (4 -> 6 -> 8 -> 12).",
};

static DAHEITA: Character = Character {
    id: CharacterId::Daheita,
    name: "大黑塔",
    max_hp: 42,
    dice_sides: &[8, 8, 6, 6, 6],
    aurora_uses: 2,
    attack_level: 3,
    defense_level: 2,
    skill_text: "Round end: +1 aurora use. After four aurora bonus triggers, \
                 every confirmed selection ascends its lowest die to its maximum.",
};

static BAIE: Character = Character {
    id: CharacterId::Baie,
    name: "白厄",
    max_hp: 20,
    dice_sides: &[8, 8, 6, 6, 6],
    aurora_uses: 2,
    attack_level: 4,
    defense_level: 2,
    skill_text: "Attacking: heal half the damage dealt (rounded down). Defending with \
                 all-equal dice: HP cannot drop below 1 this round (once per match).",
};

// ---------------------------------------------------------------------------
// Aurora dice
// ---------------------------------------------------------------------------

/// Identity of an aurora die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuroraDieId {
    Starshield,
    Legacy,
    Repeater,
    Medic,
}

impl AuroraDieId {
    pub const ALL: [AuroraDieId; 4] = [
        Self::Starshield,
        Self::Legacy,
        Self::Repeater,
        Self::Medic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starshield => "starshield",
            Self::Legacy => "legacy",
            Self::Repeater => "repeater",
            Self::Medic => "medic",
        }
    }

    pub fn aurora_die(self) -> &'static AuroraDie {
        match self {
            Self::Starshield => &STARSHIELD,
            Self::Legacy => &LEGACY,
            Self::Repeater => &REPEATER,
            Self::Medic => &MEDIC,
        }
    }
}

impl fmt::Display for AuroraDieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuroraDieId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| EngineError::UnknownAuroraDie(s.to_string()))
    }
}

/// One face of an aurora die. Weighting is expressed by repeating faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub value: u32,
    pub has_bonus: bool,
}

impl Face {
    const fn plain(value: u32) -> Self {
        Self { value, has_bonus: false }
    }

    const fn bonus(value: u32) -> Self {
        Self { value, has_bonus: true }
    }

    /// `"4"` for a plain face, `"4A"` for a bonus face.
    pub fn label(&self) -> String {
        die_label(self.value, self.has_bonus)
    }
}

pub(crate) fn die_label(value: u32, has_bonus: bool) -> String {
    if has_bonus {
        format!("{value}A")
    } else {
        value.to_string()
    }
}

#[derive(Debug)]
pub struct AuroraDie {
    pub id: AuroraDieId,
    pub name: &'static str,
    pub faces: &'static [Face],
    pub effect_text: &'static str,
    pub condition_text: &'static str,
}

impl AuroraDie {
    /// Highest value any face can show.
    pub fn max_value(&self) -> u32 {
        self.faces.iter().map(|f| f.value).max().unwrap_or(0)
    }

    pub fn summary(&self) -> AuroraSummary {
        let faces: Vec<String> = self.faces.iter().map(Face::label).collect();
        AuroraSummary {
            id: self.id,
            name: self.name.to_string(),
            faces_text: faces.join(" "),
            effect_text: self.effect_text.to_string(),
            condition_text: self.condition_text.to_string(),
        }
    }
}

static STARSHIELD: AuroraDie = AuroraDie {
    id: AuroraDieId::Starshield,
    name: "星盾",
    faces: &[
        Face::plain(7),
        Face::plain(7),
        Face::plain(7),
        Face::bonus(1),
        Face::bonus(1),
        Face::bonus(1),
    ],
    effect_text: "A: if selected, gain a force field this round (blocks regular attack damage).",
    condition_text: "Defense only.",
};

static LEGACY: AuroraDie = AuroraDie {
    id: AuroraDieId::Legacy,
    name: "遗语",
    faces: &[
        Face::plain(4),
        Face::plain(5),
        Face::plain(5),
        Face::bonus(1),
        Face::bonus(2),
        Face::bonus(4),
    ],
    effect_text: "A: if selected, double the committed attack or defense value.",
    condition_text: "Usable at HP <= 8.",
};

static REPEATER: AuroraDie = AuroraDie {
    id: AuroraDieId::Repeater,
    name: "复读",
    faces: &[
        Face::plain(1),
        Face::plain(1),
        Face::plain(4),
        Face::plain(4),
        Face::bonus(4),
        Face::bonus(4),
    ],
    effect_text: "A: if selected, attack once more this round with the same value.",
    condition_text: "Attack only, after selecting fours twice.",
};

static MEDIC: AuroraDie = AuroraDie {
    id: AuroraDieId::Medic,
    name: "医嘱",
    faces: &[
        Face::bonus(1),
        Face::bonus(2),
        Face::bonus(3),
        Face::bonus(4),
        Face::bonus(6),
        Face::bonus(6),
    ],
    effect_text: "A: if selected, heal by the face value (up to max HP).",
    condition_text: "Always usable.",
};

// ---------------------------------------------------------------------------
// Summaries sent to clients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub id: CharacterId,
    pub name: String,
    pub hp: i32,
    pub dice_sides: Vec<u32>,
    pub aurora_uses: u32,
    pub attack_level: usize,
    pub defense_level: usize,
    pub short_spec: String,
    pub skill_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuroraSummary {
    pub id: AuroraDieId,
    pub name: String,
    pub faces_text: String,
    pub effect_text: String,
    pub condition_text: String,
}

/// Summaries of every character, in catalog order.
pub fn character_summaries() -> Vec<CharacterSummary> {
    CharacterId::ALL
        .iter()
        .map(|id| id.character().summary())
        .collect()
}

/// Summaries of every aurora die, in catalog order.
pub fn aurora_summaries() -> Vec<AuroraSummary> {
    AuroraDieId::ALL
        .iter()
        .map(|id| id.aurora_die().summary())
        .collect()
}
