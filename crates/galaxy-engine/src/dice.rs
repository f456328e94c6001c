//! The `Die` value object, rolling, ordering, and selection validation.
//!
//! Dice are values: every roll or reroll produces a fresh [`Die`]. The one
//! exception to "replace, never edit" is the ascend effect, which is still
//! expressed as building a new die ([`Die::ascended`]) and swapping it into
//! its index.

use std::cmp::Ordering;
use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{die_label, AuroraDie, AuroraDieId};
use crate::EngineError;

/// Where a die came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DieOrigin {
    /// A die from the owner's pool; `slot` indexes the owner's side list.
    Pool { sides: u32, slot: usize },
    /// An aurora die; the id is kept so hooks can be looked up on confirm.
    Aurora { aurora_id: AuroraDieId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Die {
    pub value: u32,
    pub label: String,
    /// Highest value this die can show.
    pub max_value: u32,
    /// True when this is an aurora face marked as bonus-triggering.
    pub has_bonus: bool,
    #[serde(flatten)]
    pub origin: DieOrigin,
}

impl Die {
    pub fn pool(value: u32, sides: u32, slot: usize) -> Self {
        Self {
            value,
            label: die_label(value, false),
            max_value: sides,
            has_bonus: false,
            origin: DieOrigin::Pool { sides, slot },
        }
    }

    pub fn aurora(aurora: &AuroraDie, value: u32, has_bonus: bool) -> Self {
        Self {
            value,
            label: die_label(value, has_bonus),
            max_value: aurora.max_value(),
            has_bonus,
            origin: DieOrigin::Aurora { aurora_id: aurora.id },
        }
    }

    /// Draws a pool die uniformly from `1..=sides`.
    pub fn roll_pool<R: Rng + ?Sized>(sides: u32, slot: usize, rng: &mut R) -> Self {
        let value = rng.random_range(1..=sides.max(1));
        Self::pool(value, sides, slot)
    }

    /// Draws one face uniformly from the aurora die's face list.
    pub fn roll_aurora<R: Rng + ?Sized>(aurora: &AuroraDie, rng: &mut R) -> Self {
        let idx = rng.random_range(0..aurora.faces.len().max(1));
        match aurora.faces.get(idx) {
            Some(face) => Self::aurora(aurora, face.value, face.has_bonus),
            None => Self::aurora(aurora, 0, false),
        }
    }

    /// A fresh roll of the same die: same side count and slot for a pool
    /// die, a new face from the same aurora die otherwise.
    pub fn reroll<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        match self.origin {
            DieOrigin::Pool { sides, slot } => Self::roll_pool(sides, slot, rng),
            DieOrigin::Aurora { aurora_id } => Self::roll_aurora(aurora_id.aurora_die(), rng),
        }
    }

    /// This die raised to its own maximum value.
    pub fn ascended(&self) -> Self {
        Self {
            value: self.max_value,
            label: die_label(self.max_value, self.has_bonus),
            ..self.clone()
        }
    }

    pub fn is_aurora(&self) -> bool {
        matches!(self.origin, DieOrigin::Aurora { .. })
    }

    pub fn sides(&self) -> Option<u32> {
        match self.origin {
            DieOrigin::Pool { sides, .. } => Some(sides),
            DieOrigin::Aurora { .. } => None,
        }
    }

    pub fn slot(&self) -> Option<usize> {
        match self.origin {
            DieOrigin::Pool { slot, .. } => Some(slot),
            DieOrigin::Aurora { .. } => None,
        }
    }

    pub fn aurora_id(&self) -> Option<AuroraDieId> {
        match self.origin {
            DieOrigin::Aurora { aurora_id } => Some(aurora_id),
            DieOrigin::Pool { .. } => None,
        }
    }

    /// True for an aurora die showing a bonus face.
    pub fn triggers_bonus(&self) -> bool {
        self.is_aurora() && self.has_bonus
    }
}

/// Display order: ascending value, pool before aurora, then ascending sides.
fn display_order(a: &Die, b: &Die) -> Ordering {
    a.value
        .cmp(&b.value)
        .then_with(|| a.is_aurora().cmp(&b.is_aurora()))
        .then_with(|| a.sides().unwrap_or(0).cmp(&b.sides().unwrap_or(0)))
}

pub fn sort_dice(dice: &mut [Die]) {
    dice.sort_by(display_order);
}

/// Rolls one die per pool slot and returns them in display order.
pub fn roll_pool<R: Rng + ?Sized>(sides: &[u32], rng: &mut R) -> Vec<Die> {
    let mut dice: Vec<Die> = sides
        .iter()
        .enumerate()
        .map(|(slot, &s)| Die::roll_pool(s, slot, rng))
        .collect();
    sort_dice(&mut dice);
    dice
}

/// Checks that every index is in `0..len` and none repeats.
pub fn check_distinct(indices: &[usize], len: usize) -> Result<(), EngineError> {
    let mut seen = HashSet::with_capacity(indices.len());
    for &index in indices {
        if index >= len {
            return Err(EngineError::IndexOutOfRange { index, len });
        }
        if !seen.insert(index) {
            return Err(EngineError::DuplicateIndex(index));
        }
    }
    Ok(())
}

/// Checks a confirmation: exactly `need` distinct, in-range indices.
pub fn check_selection(indices: &[usize], need: usize, len: usize) -> Result<(), EngineError> {
    if indices.len() != need {
        return Err(EngineError::WrongSelectionCount {
            expected: need,
            got: indices.len(),
        });
    }
    check_distinct(indices, len)
}

/// Sum of the dice at `indices`. Callers validate the indices first.
pub fn sum_selected(dice: &[Die], indices: &[usize]) -> u32 {
    indices
        .iter()
        .filter_map(|&i| dice.get(i))
        .map(|d| d.value)
        .sum()
}

/// Next step on the 4 -> 6 -> 8 -> 12 ladder, capped at 12.
pub fn upgrade_side(sides: u32) -> u32 {
    match sides {
        0..=4 => 6,
        5..=6 => 8,
        _ => 12,
    }
}
