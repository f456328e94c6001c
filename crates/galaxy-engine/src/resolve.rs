//! Damage resolution, win detection and round rollover.

use tracing::{debug, info};

use crate::abilities;
use crate::game::{Game, GameStatus, Phase};
use crate::journal::EffectEvent;

/// The ordered hit list before any defensive adjustment.
pub fn compute_hits(attack_value: u32, defense_value: u32, pierce: bool, extra_attack: bool) -> Vec<u32> {
    let base = if pierce {
        attack_value
    } else {
        attack_value.saturating_sub(defense_value)
    };
    if extra_attack {
        vec![base, base]
    } else {
        vec![base]
    }
}

/// Caps the total of `hits` so that `hp_before - total >= 1`, taking from
/// each hit in order until the budget runs out.
pub fn apply_guard(hits: &[u32], hp_before: i32) -> Vec<u32> {
    let max_loss = u32::try_from((hp_before - 1).max(0)).unwrap_or(0);
    let total: u32 = hits.iter().sum();
    if total <= max_loss {
        return hits.to_vec();
    }

    let mut budget = max_loss;
    hits.iter()
        .map(|&hit| {
            let taken = hit.min(budget);
            budget -= taken;
            taken
        })
        .collect()
}

/// Resolves the round after the defender has confirmed.
pub(crate) fn resolve_round(game: &mut Game) {
    let attacker = game.attacker;
    let defender = attacker.other();
    let attack_value = game.attack_value.unwrap_or(0);
    let defense_value = game.defense_value.unwrap_or(0);
    let pierce = game.pierce;

    let mut hits = compute_hits(attack_value, defense_value, pierce, game.extra_attack_queued);

    let target = game.seat(defender);
    let force_field = target.force_field && !pierce;
    if force_field {
        hits.iter_mut().for_each(|h| *h = 0);
    }
    let hp_before = target.hp;
    if target.guard_active {
        hits = apply_guard(&hits, hp_before);
    }

    let total: u32 = hits.iter().sum();
    let target = game.seat_mut(defender);
    target.hp -= total as i32;
    let hp_after = target.hp;
    let event = EffectEvent::DamageResolution {
        attacker_id: game.seat(attacker).player_id,
        defender_id: game.seat(defender).player_id,
        attack_value,
        defense_value,
        hits: hits.clone(),
        force_field,
        hp_before,
        hp_after,
        pierce,
    };
    game.journal.push(event);
    game.last_damage = Some(total);
    let line = format!(
        "{} takes {} damage ({} -> {}).",
        game.seat(defender).name,
        total,
        hp_before,
        hp_after
    );
    game.note(line);

    abilities::on_damage_resolved(game, &hits, total);

    for combatant in &mut game.seats {
        combatant.hp = combatant.hp.max(0);
    }

    // The attacker wins a simultaneous knockout.
    let winner = if game.seat(defender).hp <= 0 {
        Some(attacker)
    } else if game.seat(attacker).hp <= 0 {
        Some(defender)
    } else {
        None
    };

    match winner {
        Some(seat) => {
            let winner_id = game.seat(seat).player_id;
            game.status = GameStatus::Ended;
            game.phase = Phase::Ended;
            game.winner = Some(winner_id);
            let line = format!("{} wins the match.", game.seat(seat).name);
            game.note(line);
            info!(round = game.round, winner = %winner_id, "match ended");
        }
        None => roll_over(game),
    }
}

/// Swaps roles and starts the next round.
fn roll_over(game: &mut Game) {
    abilities::on_round_end(game);
    game.attacker = game.attacker.other();
    game.reset_round_state();
    game.round += 1;
    game.phase = Phase::AttackRoll;
    let line = format!("Round {}: {} attacks.", game.round, game.seat(game.attacker).name);
    game.note(line);
    debug!(round = game.round, attacker = %game.attacker_id(), "round rollover");
}
