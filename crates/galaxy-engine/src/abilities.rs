//! Character and aurora die hooks.
//!
//! Each hook is a plain function matched on catalog identity and called at
//! a fixed point of the confirm or resolution pipeline. Hooks may push
//! journal entries but never advance the phase.

use crate::catalog::{AuroraDie, AuroraDieId, CharacterId};
use crate::dice::upgrade_side;
use crate::game::{Combatant, Game, Role, Seat};
use crate::journal::EffectEvent;
use crate::EngineError;

/// Legacy is usable at or below this HP.
pub const LEGACY_HP_THRESHOLD: i32 = 8;
/// Selected fours needed before Repeater can be used.
pub const REPEATER_REQUIRED_FOURS: u32 = 2;
/// Bonus triggers after which Daheita's selections ascend.
pub const ASCEND_TRIGGER_COUNT: u32 = 4;
/// A single hit at or above this grows Xiadie's levels.
pub const GROWTH_HIT: u32 = 8;
/// A single hit in `1..=RETALIATION_MAX_HIT` makes Xiadie strike back.
pub const RETALIATION_MAX_HIT: u32 = 5;
pub const RETALIATION_DAMAGE: u32 = 3;

/// Checks every aurora die precondition for `combatant` acting in `role`.
pub(crate) fn check_aurora_use(
    combatant: &Combatant,
    role: Role,
) -> Result<&'static AuroraDie, EngineError> {
    let id = combatant.aurora.ok_or(EngineError::NoAuroraEquipped)?;
    if combatant.aurora_uses == 0 {
        return Err(EngineError::AuroraUsesExhausted);
    }
    if combatant.aurora_used_this_round {
        return Err(EngineError::AuroraAlreadyUsed);
    }

    let die = id.as_str();
    match id {
        AuroraDieId::Starshield if role != Role::Defense => {
            return Err(EngineError::AuroraWrongRole { die, role });
        }
        AuroraDieId::Legacy if combatant.hp > LEGACY_HP_THRESHOLD => {
            return Err(EngineError::AuroraHpTooHigh {
                die,
                max_hp: LEGACY_HP_THRESHOLD,
                hp: combatant.hp,
            });
        }
        AuroraDieId::Repeater if role != Role::Attack => {
            return Err(EngineError::AuroraWrongRole { die, role });
        }
        AuroraDieId::Repeater if combatant.selected_fours < REPEATER_REQUIRED_FOURS => {
            return Err(EngineError::AuroraNeedsFours {
                die,
                required: REPEATER_REQUIRED_FOURS,
                have: combatant.selected_fours,
            });
        }
        _ => {}
    }
    Ok(id.aurora_die())
}

/// Daheita: once enough bonus faces have been confirmed, the lowest die of
/// every selection is raised to its maximum. Ties go to the first index in
/// selection order. The dice are not re-sorted afterwards.
pub(crate) fn ascend(game: &mut Game, role: Role, indices: &[usize]) {
    let seat = game.role_seat(role);
    let combatant = game.seat(seat);
    if combatant.character != CharacterId::Daheita || combatant.bonus_triggers < ASCEND_TRIGGER_COUNT {
        return;
    }

    let dice = game.dice(role);
    let Some(lowest) = indices.iter().copied().min_by_key(|&i| dice[i].value) else {
        return;
    };
    let raised = dice[lowest].ascended();
    let line = format!(
        "{} ascends a {} to {}.",
        combatant.name, dice[lowest].label, raised.label
    );
    game.dice_mut(role)[lowest] = raised;
    game.note(line);
}

pub(crate) fn on_attack_confirm(game: &mut Game, indices: &[usize]) {
    let seat = game.attacker;
    match game.seat(seat).character {
        CharacterId::Huangquan => {
            let all_fours = indices.iter().all(|&i| game.attack_dice[i].value == 4);
            if all_fours {
                game.pierce = true;
                let attacker = game.seat_mut(seat);
                attacker.attack_level += 1;
                let line = format!(
                    "{} pierces! Attack level is now {}.",
                    attacker.name, attacker.attack_level
                );
                game.note(line);
            }
        }
        CharacterId::Zhigengniao => {
            let all_even = indices.iter().all(|&i| game.attack_dice[i].value % 2 == 0);
            if !all_even {
                return;
            }
            let slots: Vec<usize> = indices
                .iter()
                .filter_map(|&i| game.attack_dice[i].slot())
                .collect();
            let attacker = game.seat_mut(seat);
            for slot in &slots {
                if let Some(sides) = attacker.dice_sides.get_mut(*slot) {
                    *sides = upgrade_side(*sides);
                }
            }
            if !slots.is_empty() {
                let line = format!("{} upgrades {} dice.", attacker.name, slots.len());
                game.note(line);
            }
        }
        _ => {}
    }
}

pub(crate) fn on_defense_confirm(game: &mut Game, indices: &[usize]) {
    let seat = game.attacker.other();
    let defender = game.seat(seat);
    if defender.character != CharacterId::Baie || defender.guard_used {
        return;
    }

    let mut values = indices.iter().map(|&i| game.defense_dice[i].value);
    let all_equal = match values.next() {
        Some(first) => values.all(|v| v == first),
        None => false,
    };
    if all_equal {
        let defender = game.seat_mut(seat);
        defender.guard_active = true;
        defender.guard_used = true;
        let line = format!("{} raises a guard.", defender.name);
        game.note(line);
    }
}

/// Runs aurora bonus effects for every bonus face in the confirmed
/// selection. Called after the role's value has been committed.
pub(crate) fn on_aurora_bonus(game: &mut Game, role: Role, indices: &[usize]) {
    let seat = game.role_seat(role);
    let bonuses: Vec<(AuroraDieId, u32)> = indices
        .iter()
        .filter_map(|&i| {
            let die = &game.dice(role)[i];
            match die.aurora_id() {
                Some(id) if die.triggers_bonus() => Some((id, die.value)),
                _ => None,
            }
        })
        .collect();

    for (id, face_value) in bonuses {
        game.seat_mut(seat).bonus_triggers += 1;
        match id {
            AuroraDieId::Starshield => {
                game.seat_mut(seat).force_field = true;
            }
            AuroraDieId::Legacy => {
                if let Some(value) = game.role_value_mut(role).as_mut() {
                    *value *= 2;
                }
            }
            AuroraDieId::Repeater => {
                game.extra_attack_queued = true;
            }
            AuroraDieId::Medic => {
                heal(game, seat, face_value);
            }
        }
        let line = format!("{} triggers {}.", game.seat(seat).name, id.aurora_die().name);
        game.note(line);
    }
}

/// Post-damage hooks, defender's first. `hits` is the resolved hit list.
pub(crate) fn on_damage_resolved(game: &mut Game, hits: &[u32], total: u32) {
    let attacker = game.attacker;
    let defender = attacker.other();

    if game.seat(defender).character == CharacterId::Xiadie {
        for &hit in hits {
            if hit >= GROWTH_HIT {
                let d = game.seat_mut(defender);
                d.attack_level += 1;
                d.defense_level += 1;
                let line = format!("{} grows stronger.", d.name);
                game.note(line);
            } else if (1..=RETALIATION_MAX_HIT).contains(&hit) {
                instant_damage(game, defender, attacker, RETALIATION_DAMAGE);
            }
        }
    }

    if game.seat(attacker).character == CharacterId::Baie && total > 0 {
        heal(game, attacker, total / 2);
    }
}

/// Daheita regains one aurora use at the end of every round.
pub(crate) fn on_round_end(game: &mut Game) {
    for combatant in &mut game.seats {
        if combatant.character == CharacterId::Daheita {
            combatant.aurora_uses += 1;
        }
    }
}

/// Heals `seat` by up to `amount`, journaling only a non-zero heal.
fn heal(game: &mut Game, seat: Seat, amount: u32) {
    let combatant = game.seat_mut(seat);
    let hp_before = combatant.hp;
    let healed = combatant.heal(amount);
    if healed == 0 {
        return;
    }
    let event = EffectEvent::Heal {
        player_id: combatant.player_id,
        amount: healed,
        hp_before,
        hp_after: combatant.hp,
    };
    let line = format!("{} heals {}.", combatant.name, healed);
    game.journal.push(event);
    game.note(line);
}

fn instant_damage(game: &mut Game, source: Seat, target: Seat, amount: u32) {
    let source_player_id = game.seat(source).player_id;
    let victim = game.seat_mut(target);
    let hp_before = victim.hp;
    victim.hp -= amount as i32;
    let event = EffectEvent::InstantDamage {
        source_player_id,
        target_player_id: victim.player_id,
        amount,
        hp_before,
        hp_after: victim.hp,
    };
    let line = format!("{} takes {} instant damage.", victim.name, amount);
    game.journal.push(event);
    game.note(line);
}
