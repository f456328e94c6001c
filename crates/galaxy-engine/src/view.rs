//! Serializable snapshot of a game, sent to clients inside `room_state`.

use serde::{Deserialize, Serialize};

use crate::catalog::{AuroraDieId, CharacterId};
use crate::dice::Die;
use crate::game::{Combatant, Game, GameStatus, Phase};
use crate::journal::JournalEntry;
use crate::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantView {
    pub player_id: PlayerId,
    pub name: String,
    pub character_id: CharacterId,
    pub aurora_dice_id: Option<AuroraDieId>,
    pub hp: i32,
    pub max_hp: i32,
    pub attack_level: usize,
    pub defense_level: usize,
    pub aurora_uses_remaining: u32,
    pub selected_fours: u32,
    pub bonus_triggers: u32,
    pub aurora_used_this_round: bool,
    pub force_field: bool,
    pub guard_used: bool,
    pub guard_active: bool,
    pub dice_sides: Vec<u32>,
}

impl From<&Combatant> for CombatantView {
    fn from(c: &Combatant) -> Self {
        Self {
            player_id: c.player_id,
            name: c.name.clone(),
            character_id: c.character,
            aurora_dice_id: c.aurora,
            hp: c.hp,
            max_hp: c.max_hp,
            attack_level: c.attack_level,
            defense_level: c.defense_level,
            aurora_uses_remaining: c.aurora_uses,
            selected_fours: c.selected_fours,
            bonus_triggers: c.bonus_triggers,
            aurora_used_this_round: c.aurora_used_this_round,
            force_field: c.force_field,
            guard_used: c.guard_used,
            guard_active: c.guard_active,
            dice_sides: c.dice_sides.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub status: GameStatus,
    pub round: u32,
    pub attacker_id: PlayerId,
    pub defender_id: PlayerId,
    pub phase: Phase,
    pub rerolls_left: u32,
    pub attack_dice: Vec<Die>,
    pub defense_dice: Vec<Die>,
    pub attack_selection: Option<Vec<usize>>,
    pub defense_selection: Option<Vec<usize>>,
    pub attack_preview_selection: Vec<usize>,
    pub defense_preview_selection: Vec<usize>,
    pub attack_value: Option<u32>,
    pub defense_value: Option<u32>,
    pub pierce: bool,
    pub extra_attack_queued: bool,
    pub last_damage: Option<u32>,
    pub winner_id: Option<PlayerId>,
    pub combatants: Vec<CombatantView>,
    pub effect_events: Vec<JournalEntry>,
    pub last_effect_id: u64,
    pub log: Vec<String>,
}

impl Game {
    pub fn view(&self) -> GameView {
        GameView {
            status: self.status,
            round: self.round,
            attacker_id: self.attacker_id(),
            defender_id: self.defender_id(),
            phase: self.phase,
            rerolls_left: self.rerolls_left,
            attack_dice: self.attack_dice.clone(),
            defense_dice: self.defense_dice.clone(),
            attack_selection: self.attack_selection.clone(),
            defense_selection: self.defense_selection.clone(),
            attack_preview_selection: self.attack_preview.clone(),
            defense_preview_selection: self.defense_preview.clone(),
            attack_value: self.attack_value,
            defense_value: self.defense_value,
            pierce: self.pierce,
            extra_attack_queued: self.extra_attack_queued,
            last_damage: self.last_damage,
            winner_id: self.winner,
            combatants: self.seats.iter().map(CombatantView::from).collect(),
            effect_events: self.journal.snapshot(),
            last_effect_id: self.journal.last_id(),
            log: self.log.iter().cloned().collect(),
        }
    }
}
