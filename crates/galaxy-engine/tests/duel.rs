//! Whole-match tests driven only through the public API.

use galaxy_engine::{
    AuroraDieId, CharacterId, EffectEvent, EngineError, Game, GameConfig, Loadout, Phase,
    PlayerId, Seat,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

fn loadout(id: PlayerId, character: CharacterId) -> Loadout {
    let aurora = if character.character().requires_aurora() {
        Some(AuroraDieId::ALL[(id.0 as usize) % AuroraDieId::ALL.len()])
    } else {
        None
    };
    Loadout {
        player_id: id,
        name: format!("player{}", id.0),
        character,
        aurora,
    }
}

/// A level above the dice on the table cannot be confirmed. The match
/// waits on that player, and any short confirm is refused.
fn stalled(game: &mut Game, actor: PlayerId, need: usize, len: usize) -> bool {
    let indices: Vec<usize> = (0..len).collect();
    let refused = match game.phase() {
        Phase::AttackRerollOrSelect => game.confirm_attack(actor, &indices),
        _ => game.confirm_defense(actor, &indices),
    };
    assert_eq!(refused, Err(EngineError::WrongSelectionCount { expected: need, got: len }));
    false
}

/// Plays one legal move for whoever must act. Returns false once the game
/// has ended or is waiting on a confirm nobody can make.
fn step(game: &mut Game, rng: &mut StdRng) -> bool {
    let Some(actor) = game.acting_player() else {
        return false;
    };
    match game.phase() {
        Phase::AttackRoll => game.roll_attack(actor, rng).unwrap(),
        Phase::AttackRerollOrSelect => {
            let need = game.combatant(actor).unwrap().attack_level;
            if rng.random_bool(0.3) || need > game.attack_dice().len() {
                // May be refused; refusal must leave the phase untouched.
                let _ = game.use_aurora_die(actor, rng);
            }
            let len = game.attack_dice().len();
            if game.rerolls_left() > 0 && rng.random_bool(0.4) {
                let indices: Vec<usize> = (0..len).filter(|_| rng.random_bool(0.5)).collect();
                game.reroll_attack(actor, &indices, rng).unwrap();
            } else if need > len {
                return stalled(game, actor, need, len);
            } else {
                let indices: Vec<usize> = (0..need).collect();
                game.confirm_attack(actor, &indices).unwrap();
            }
        }
        Phase::DefenseRoll => game.roll_defense(actor, rng).unwrap(),
        Phase::DefenseSelect => {
            let need = game.combatant(actor).unwrap().defense_level;
            if rng.random_bool(0.3) || need > game.defense_dice().len() {
                let _ = game.use_aurora_die(actor, rng);
            }
            let len = game.defense_dice().len();
            if need > len {
                return stalled(game, actor, need, len);
            }
            let indices: Vec<usize> = (len - need..len).collect();
            game.confirm_defense(actor, &indices).unwrap();
        }
        Phase::Ended => return false,
    }
    true
}

fn assert_invariants(game: &Game, config: &GameConfig) {
    for c in game.combatants() {
        assert!(c.hp >= 0, "{c:?}");
        assert!(c.hp <= c.max_hp, "{c:?}");
    }
    assert!(game.journal().len() <= config.journal_capacity);
    let ids: Vec<u64> = game.journal().entries().map(|e| e.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "{ids:?}");
    assert_ne!(game.attacker_id(), game.defender_id());
}

#[test]
fn test_random_matches_keep_invariants() {
    let config = GameConfig {
        rerolls_per_round: 2,
        journal_capacity: 8,
    };
    for seed in 0..40u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = CharacterId::ALL[(seed as usize) % CharacterId::ALL.len()];
        let b = CharacterId::ALL[(seed as usize / 5) % CharacterId::ALL.len()];
        let mut game = Game::start([loadout(P1, a), loadout(P2, b)], config.clone(), &mut rng);

        let mut round = game.round();
        let mut attacker = game.attacker_id();
        for _ in 0..5_000 {
            if !step(&mut game, &mut rng) {
                break;
            }
            assert_invariants(&game, &config);
            if game.round() != round && !game.is_over() {
                assert_eq!(game.round(), round + 1);
                assert_ne!(game.attacker_id(), attacker, "roles swap each round");
                assert_eq!(game.rerolls_left(), 2);
                assert!(game.combatants().iter().all(|c| !c.aurora_used_this_round && !c.force_field));
                round = game.round();
                attacker = game.attacker_id();
            }
        }

        if game.is_over() {
            let winner = game.winner().unwrap();
            let loser = if winner == P1 { P2 } else { P1 };
            assert_eq!(game.combatant(loser).unwrap().hp, 0);
        }
    }
}

#[test]
fn test_out_of_turn_intents_change_nothing() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut game = Game::new(
        loadout(P1, CharacterId::Huangquan),
        loadout(P2, CharacterId::Baie),
        Seat::First,
        GameConfig::default(),
    );
    game.roll_attack(P1, &mut rng).unwrap();
    let before = game.view();

    assert_eq!(game.roll_defense(P2, &mut rng), Err(EngineError::WrongPhase(Phase::AttackRerollOrSelect)));
    assert_eq!(game.confirm_attack(P2, &[0, 1]), Err(EngineError::NotYourTurn));
    assert_eq!(game.reroll_attack(P2, &[0], &mut rng), Err(EngineError::NotYourTurn));
    assert_eq!(game.update_live_selection(P2, &[0]), Err(EngineError::NotYourTurn));
    assert!(game.confirm_attack(P1, &[0, 0]).is_err());
    assert!(game.confirm_attack(P1, &[0, 9]).is_err());

    assert_eq!(game.view(), before);
}

#[test]
fn test_full_round_emits_damage_resolution() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut game = Game::new(
        loadout(P1, CharacterId::Daheita),
        loadout(P2, CharacterId::Daheita),
        Seat::First,
        GameConfig::default(),
    );
    game.roll_attack(P1, &mut rng).unwrap();
    game.confirm_attack(P1, &[2, 3, 4]).unwrap();
    assert_eq!(game.phase(), Phase::DefenseRoll);
    game.roll_defense(P2, &mut rng).unwrap();
    game.confirm_defense(P2, &[0, 1]).unwrap();

    let event = &game.journal().entries().next().unwrap().event;
    match event {
        EffectEvent::DamageResolution {
            attacker_id,
            defender_id,
            hp_before,
            hp_after,
            ..
        } => {
            assert_eq!((*attacker_id, *defender_id), (P1, P2));
            assert_eq!(*hp_before, 42);
            assert_eq!(*hp_after, game.combatant(P2).unwrap().hp);
        }
        other => panic!("unexpected first event {other:?}"),
    }
    assert_eq!(game.round(), 2);
    assert_eq!(game.attacker_id(), P2);
}
