//! Bounded, sequenced log of resolved combat effects.
//!
//! The journal exists for presentation only: clients replay it to animate
//! hits and heals. Nothing in the engine ever reads it back, so dropping or
//! replaying entries cannot change HP, levels, or phase.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// Default number of entries kept before the oldest is evicted.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EffectEvent {
    /// The outcome of one round's attack against the defender.
    DamageResolution {
        attacker_id: PlayerId,
        defender_id: PlayerId,
        attack_value: u32,
        defense_value: u32,
        /// Per-hit damage after force field and guard adjustments.
        hits: Vec<u32>,
        /// True when an active force field zeroed the hits.
        force_field: bool,
        hp_before: i32,
        hp_after: i32,
        pierce: bool,
    },
    Heal {
        player_id: PlayerId,
        amount: u32,
        hp_before: i32,
        hp_after: i32,
    },
    /// Damage dealt outside the attack/defense exchange.
    InstantDamage {
        source_player_id: PlayerId,
        target_player_id: PlayerId,
        amount: u32,
        hp_before: i32,
        hp_after: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    #[serde(flatten)]
    pub event: EffectEvent,
}

#[derive(Debug, Clone)]
pub struct EffectJournal {
    capacity: usize,
    last_id: u64,
    entries: VecDeque<JournalEntry>,
}

impl EffectJournal {
    /// Creates an empty journal. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            last_id: 0,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends an event, evicting the oldest entry if full. Returns the id
    /// assigned to the new entry.
    pub fn push(&mut self, event: EffectEvent) -> u64 {
        self.last_id += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(JournalEntry {
            id: self.last_id,
            event,
        });
        self.last_id
    }

    /// Id of the most recent entry, or 0 if nothing was ever pushed.
    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn snapshot(&self) -> Vec<JournalEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for EffectJournal {
    fn default() -> Self {
        Self::new(DEFAULT_JOURNAL_CAPACITY)
    }
}
