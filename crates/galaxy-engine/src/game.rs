//! The per-room duel: state, phases, and the intent operations that drive
//! the phase machine.
//!
//! Every public operation validates completely before touching state, so a
//! rejected intent is always a no-op. Randomness is injected by the caller;
//! nothing here blocks or awaits.

use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::abilities;
use crate::catalog::{AuroraDieId, CharacterId};
use crate::dice::{self, Die};
use crate::journal::{EffectJournal, DEFAULT_JOURNAL_CAPACITY};
use crate::resolve;
use crate::{EngineError, PlayerId};

/// Player-facing log lines kept per game.
const LOG_CAPACITY: usize = 100;

/// Where the current round stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AttackRoll,
    AttackRerollOrSelect,
    DefenseRoll,
    DefenseSelect,
    Ended,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AttackRoll => "attack_roll",
            Self::AttackRerollOrSelect => "attack_reroll_or_select",
            Self::DefenseRoll => "defense_roll",
            Self::DefenseSelect => "defense_select",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InGame,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Attack,
    Defense,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => f.write_str("attack"),
            Self::Defense => f.write_str("defense"),
        }
    }
}

/// One of the two fixed participant slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// What a player brings into a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loadout {
    pub player_id: PlayerId,
    pub name: String,
    pub character: CharacterId,
    pub aurora: Option<AuroraDieId>,
}

/// Tunables for a single game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Rerolls the attacker gets each round.
    pub rerolls_per_round: u32,
    /// Maximum number of effect journal entries kept.
    pub journal_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rerolls_per_round: 2,
            journal_capacity: DEFAULT_JOURNAL_CAPACITY,
        }
    }
}

/// Per-player match state. Levels, pool sides and aurora uses start from
/// the catalog and are then mutated by abilities.
#[derive(Debug, Clone)]
pub struct Combatant {
    pub player_id: PlayerId,
    pub name: String,
    pub character: CharacterId,
    pub aurora: Option<AuroraDieId>,
    pub hp: i32,
    pub max_hp: i32,
    pub attack_level: usize,
    pub defense_level: usize,
    pub aurora_uses: u32,
    /// Fours selected and confirmed across the match.
    pub selected_fours: u32,
    /// Bonus faces confirmed across the match.
    pub bonus_triggers: u32,
    pub aurora_used_this_round: bool,
    pub force_field: bool,
    pub guard_used: bool,
    pub guard_active: bool,
    pub dice_sides: Vec<u32>,
}

impl Combatant {
    pub fn new(loadout: Loadout) -> Self {
        let character = loadout.character.character();
        Self {
            player_id: loadout.player_id,
            name: loadout.name,
            character: loadout.character,
            aurora: loadout.aurora,
            hp: character.max_hp,
            max_hp: character.max_hp,
            attack_level: character.attack_level,
            defense_level: character.defense_level,
            aurora_uses: character.aurora_uses,
            selected_fours: 0,
            bonus_triggers: 0,
            aurora_used_this_round: false,
            force_field: false,
            guard_used: false,
            guard_active: false,
            dice_sides: character.dice_sides.to_vec(),
        }
    }

    /// The number of dice this combatant must confirm in `role`.
    pub fn level(&self, role: Role) -> usize {
        match role {
            Role::Attack => self.attack_level,
            Role::Defense => self.defense_level,
        }
    }

    /// Raises HP by up to `amount` without passing max HP. Returns the
    /// amount actually healed.
    pub(crate) fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.hp = self.hp.saturating_add(amount).min(self.max_hp).max(before);
        (self.hp - before) as u32
    }

    fn reset_round_flags(&mut self) {
        self.aurora_used_this_round = false;
        self.force_field = false;
        self.guard_active = false;
    }
}

/// A running or finished duel between exactly two combatants.
#[derive(Debug, Clone)]
pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) status: GameStatus,
    pub(crate) round: u32,
    pub(crate) seats: [Combatant; 2],
    pub(crate) attacker: Seat,
    pub(crate) phase: Phase,
    pub(crate) rerolls_left: u32,
    pub(crate) attack_dice: Vec<Die>,
    pub(crate) defense_dice: Vec<Die>,
    pub(crate) attack_selection: Option<Vec<usize>>,
    pub(crate) defense_selection: Option<Vec<usize>>,
    pub(crate) attack_preview: Vec<usize>,
    pub(crate) defense_preview: Vec<usize>,
    pub(crate) attack_value: Option<u32>,
    pub(crate) defense_value: Option<u32>,
    pub(crate) pierce: bool,
    pub(crate) extra_attack_queued: bool,
    pub(crate) last_damage: Option<u32>,
    pub(crate) winner: Option<PlayerId>,
    pub(crate) journal: EffectJournal,
    pub(crate) log: VecDeque<String>,
}

impl Game {
    /// Creates a game at round 1 with `first_attacker` attacking.
    pub fn new(first: Loadout, second: Loadout, first_attacker: Seat, config: GameConfig) -> Self {
        let journal = EffectJournal::new(config.journal_capacity);
        let rerolls_left = config.rerolls_per_round;
        let mut game = Self {
            config,
            status: GameStatus::InGame,
            round: 1,
            seats: [Combatant::new(first), Combatant::new(second)],
            attacker: first_attacker,
            phase: Phase::AttackRoll,
            rerolls_left,
            attack_dice: Vec::new(),
            defense_dice: Vec::new(),
            attack_selection: None,
            defense_selection: None,
            attack_preview: Vec::new(),
            defense_preview: Vec::new(),
            attack_value: None,
            defense_value: None,
            pierce: false,
            extra_attack_queued: false,
            last_damage: None,
            winner: None,
            journal,
            log: VecDeque::with_capacity(LOG_CAPACITY),
        };
        let opener = game.seat(first_attacker).name.clone();
        game.note(format!("The match begins. {opener} attacks first."));
        game
    }

    /// Creates a game with the first attacker chosen by coin flip.
    pub fn start<R: Rng + ?Sized>(loadouts: [Loadout; 2], config: GameConfig, rng: &mut R) -> Self {
        let first_attacker = if rng.random_bool(0.5) {
            Seat::First
        } else {
            Seat::Second
        };
        let [first, second] = loadouts;
        Self::new(first, second, first_attacker, config)
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    /// The attacker rolls their pool and begins the round.
    pub fn roll_attack<R: Rng + ?Sized>(&mut self, actor: PlayerId, rng: &mut R) -> Result<(), EngineError> {
        self.ensure_turn(actor, Role::Attack, Phase::AttackRoll)?;

        self.reset_round_state();
        let seat = self.attacker;
        self.attack_dice = dice::roll_pool(&self.seat(seat).dice_sides, rng);
        self.phase = Phase::AttackRerollOrSelect;
        let line = format!(
            "Round {}: {} rolls {}.",
            self.round,
            self.seat(seat).name,
            labels(&self.attack_dice)
        );
        self.note(line);
        Ok(())
    }

    /// Adds one freshly rolled aurora die to the acting player's dice.
    pub fn use_aurora_die<R: Rng + ?Sized>(&mut self, actor: PlayerId, rng: &mut R) -> Result<(), EngineError> {
        let role = self.selecting_role()?;
        let seat = self.ensure_actor(actor, role)?;
        let aurora = abilities::check_aurora_use(self.seat(seat), role)?;

        let die = Die::roll_aurora(aurora, rng);
        let line = format!("{} adds {} showing {}.", self.seat(seat).name, aurora.name, die.label);
        let combatant = self.seat_mut(seat);
        combatant.aurora_uses -= 1;
        combatant.aurora_used_this_round = true;
        let active = self.dice_mut(role);
        active.push(die);
        dice::sort_dice(active);
        self.preview_mut(role).clear();
        self.note(line);
        Ok(())
    }

    /// Rerolls the attack dice at `indices`, consuming one reroll.
    pub fn reroll_attack<R: Rng + ?Sized>(
        &mut self,
        actor: PlayerId,
        indices: &[usize],
        rng: &mut R,
    ) -> Result<(), EngineError> {
        self.ensure_turn(actor, Role::Attack, Phase::AttackRerollOrSelect)?;
        if self.rerolls_left == 0 {
            return Err(EngineError::NoRerollsLeft);
        }
        dice::check_distinct(indices, self.attack_dice.len())?;

        for &i in indices {
            self.attack_dice[i] = self.attack_dice[i].reroll(rng);
        }
        dice::sort_dice(&mut self.attack_dice);
        self.rerolls_left -= 1;
        self.attack_preview.clear();
        let line = format!(
            "{} rerolls {} dice: {}.",
            self.seat(self.attacker).name,
            indices.len(),
            labels(&self.attack_dice)
        );
        self.note(line);
        Ok(())
    }

    /// Mirrors the acting player's tentative selection to the opponent.
    pub fn update_live_selection(&mut self, actor: PlayerId, indices: &[usize]) -> Result<(), EngineError> {
        let role = self.selecting_role()?;
        let seat = self.ensure_actor(actor, role)?;
        dice::check_distinct(indices, self.dice(role).len())?;
        if role == Role::Defense {
            let max = self.seat(seat).defense_level;
            if indices.len() > max {
                return Err(EngineError::PreviewTooLarge { max });
            }
        }

        *self.preview_mut(role) = indices.to_vec();
        Ok(())
    }

    /// Commits the attack selection and hands the turn to the defender.
    pub fn confirm_attack(&mut self, actor: PlayerId, indices: &[usize]) -> Result<(), EngineError> {
        let seat = self.ensure_turn(actor, Role::Attack, Phase::AttackRerollOrSelect)?;
        let need = self.required_count(seat, Role::Attack);
        dice::check_selection(indices, need, self.attack_dice.len())?;

        self.commit_selection(Role::Attack, indices);
        self.phase = Phase::DefenseRoll;
        let line = format!(
            "{} attacks for {}{}.",
            self.seat(seat).name,
            self.attack_value.unwrap_or(0),
            if self.pierce { " (pierce)" } else { "" }
        );
        self.note(line);
        Ok(())
    }

    /// The defender rolls their pool.
    pub fn roll_defense<R: Rng + ?Sized>(&mut self, actor: PlayerId, rng: &mut R) -> Result<(), EngineError> {
        let seat = self.ensure_turn(actor, Role::Defense, Phase::DefenseRoll)?;

        self.defense_dice = dice::roll_pool(&self.seat(seat).dice_sides, rng);
        self.phase = Phase::DefenseSelect;
        let line = format!("{} rolls {}.", self.seat(seat).name, labels(&self.defense_dice));
        self.note(line);
        Ok(())
    }

    /// Commits the defense selection and resolves the round.
    pub fn confirm_defense(&mut self, actor: PlayerId, indices: &[usize]) -> Result<(), EngineError> {
        let seat = self.ensure_turn(actor, Role::Defense, Phase::DefenseSelect)?;
        let need = self.required_count(seat, Role::Defense);
        dice::check_selection(indices, need, self.defense_dice.len())?;

        self.commit_selection(Role::Defense, indices);
        let line = format!(
            "{} defends with {}.",
            self.seat(seat).name,
            self.defense_value.unwrap_or(0)
        );
        self.note(line);
        resolve::resolve_round(self);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::Ended
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn attacker_id(&self) -> PlayerId {
        self.seat(self.attacker).player_id
    }

    pub fn defender_id(&self) -> PlayerId {
        self.seat(self.attacker.other()).player_id
    }

    /// The player whose move the game is waiting on, if any.
    pub fn acting_player(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::AttackRoll | Phase::AttackRerollOrSelect => Some(self.attacker_id()),
            Phase::DefenseRoll | Phase::DefenseSelect => Some(self.defender_id()),
            Phase::Ended => None,
        }
    }

    pub fn rerolls_left(&self) -> u32 {
        self.rerolls_left
    }

    pub fn attack_dice(&self) -> &[Die] {
        &self.attack_dice
    }

    pub fn defense_dice(&self) -> &[Die] {
        &self.defense_dice
    }

    pub fn attack_value(&self) -> Option<u32> {
        self.attack_value
    }

    pub fn defense_value(&self) -> Option<u32> {
        self.defense_value
    }

    pub fn attack_preview(&self) -> &[usize] {
        &self.attack_preview
    }

    pub fn defense_preview(&self) -> &[usize] {
        &self.defense_preview
    }

    pub fn pierce(&self) -> bool {
        self.pierce
    }

    pub fn last_damage(&self) -> Option<u32> {
        self.last_damage
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn combatants(&self) -> &[Combatant; 2] {
        &self.seats
    }

    pub fn combatant(&self, id: PlayerId) -> Option<&Combatant> {
        self.seats.iter().find(|c| c.player_id == id)
    }

    pub fn journal(&self) -> &EffectJournal {
        &self.journal
    }

    pub fn log(&self) -> &VecDeque<String> {
        &self.log
    }

    // -----------------------------------------------------------------------
    // Internals shared with the resolver
    // -----------------------------------------------------------------------

    pub(crate) fn seat(&self, seat: Seat) -> &Combatant {
        &self.seats[seat.index()]
    }

    pub(crate) fn seat_mut(&mut self, seat: Seat) -> &mut Combatant {
        &mut self.seats[seat.index()]
    }

    pub(crate) fn role_seat(&self, role: Role) -> Seat {
        match role {
            Role::Attack => self.attacker,
            Role::Defense => self.attacker.other(),
        }
    }

    pub(crate) fn dice(&self, role: Role) -> &[Die] {
        match role {
            Role::Attack => &self.attack_dice,
            Role::Defense => &self.defense_dice,
        }
    }

    pub(crate) fn dice_mut(&mut self, role: Role) -> &mut Vec<Die> {
        match role {
            Role::Attack => &mut self.attack_dice,
            Role::Defense => &mut self.defense_dice,
        }
    }

    /// Dice the seat must confirm: exactly its current level for `role`.
    /// A level above the dice on the table blocks the confirm until an
    /// aurora die adds one more.
    pub fn required_count(&self, seat: Seat, role: Role) -> usize {
        self.seat(seat).level(role)
    }

    fn preview_mut(&mut self, role: Role) -> &mut Vec<usize> {
        match role {
            Role::Attack => &mut self.attack_preview,
            Role::Defense => &mut self.defense_preview,
        }
    }

    pub(crate) fn role_value_mut(&mut self, role: Role) -> &mut Option<u32> {
        match role {
            Role::Attack => &mut self.attack_value,
            Role::Defense => &mut self.defense_value,
        }
    }

    /// Appends a player-facing log line, dropping the oldest past capacity.
    pub(crate) fn note(&mut self, line: String) {
        while self.log.len() >= LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }

    /// Checks the match is live, the actor holds `role`, and the phase is
    /// `phase`. Returns the actor's seat.
    fn ensure_turn(&self, actor: PlayerId, role: Role, phase: Phase) -> Result<Seat, EngineError> {
        let seat = self.ensure_actor(actor, role)?;
        if self.phase != phase {
            return Err(EngineError::WrongPhase(self.phase));
        }
        Ok(seat)
    }

    fn ensure_actor(&self, actor: PlayerId, role: Role) -> Result<Seat, EngineError> {
        if self.is_over() {
            return Err(EngineError::MatchOver);
        }
        let seat = self.role_seat(role);
        if self.seat(seat).player_id != actor {
            return Err(EngineError::NotYourTurn);
        }
        Ok(seat)
    }

    /// The role currently choosing dice, for intents valid in either
    /// selection phase.
    fn selecting_role(&self) -> Result<Role, EngineError> {
        match self.phase {
            Phase::AttackRerollOrSelect => Ok(Role::Attack),
            Phase::DefenseSelect => Ok(Role::Defense),
            Phase::Ended => Err(EngineError::MatchOver),
            other => Err(EngineError::WrongPhase(other)),
        }
    }

    /// Runs the confirm pipeline on an already validated selection.
    fn commit_selection(&mut self, role: Role, indices: &[usize]) {
        let seat = self.role_seat(role);

        let fours = indices
            .iter()
            .filter(|&&i| self.dice(role)[i].value == 4)
            .count() as u32;
        self.seat_mut(seat).selected_fours += fours;

        abilities::ascend(self, role, indices);
        match role {
            Role::Attack => abilities::on_attack_confirm(self, indices),
            Role::Defense => abilities::on_defense_confirm(self, indices),
        }

        let value = dice::sum_selected(self.dice(role), indices);
        *self.role_value_mut(role) = Some(value);
        match role {
            Role::Attack => self.attack_selection = Some(indices.to_vec()),
            Role::Defense => self.defense_selection = Some(indices.to_vec()),
        }
        *self.preview_mut(role) = indices.to_vec();

        abilities::on_aurora_bonus(self, role, indices);
    }

    /// Clears everything scoped to one round. Guard-used and all
    /// cumulative counters survive.
    pub(crate) fn reset_round_state(&mut self) {
        for combatant in &mut self.seats {
            combatant.reset_round_flags();
        }
        self.rerolls_left = self.config.rerolls_per_round;
        self.attack_dice.clear();
        self.defense_dice.clear();
        self.attack_selection = None;
        self.defense_selection = None;
        self.attack_preview.clear();
        self.defense_preview.clear();
        self.attack_value = None;
        self.defense_value = None;
        self.pierce = false;
        self.extra_attack_queued = false;
    }
}

fn labels(dice: &[Die]) -> String {
    let labels: Vec<&str> = dice.iter().map(|d| d.label.as_str()).collect();
    format!("[{}]", labels.join(", "))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::catalog::AuroraDieId;

    const P1: PlayerId = PlayerId(1);
    const P2: PlayerId = PlayerId(2);

    fn loadout(id: PlayerId, character: CharacterId, aurora: Option<AuroraDieId>) -> Loadout {
        Loadout {
            player_id: id,
            name: format!("player{}", id.0),
            character,
            aurora,
        }
    }

    fn game(a: CharacterId, a_aurora: Option<AuroraDieId>, b: CharacterId, b_aurora: Option<AuroraDieId>) -> Game {
        Game::new(
            loadout(P1, a, a_aurora),
            loadout(P2, b, b_aurora),
            Seat::First,
            GameConfig::default(),
        )
    }

    fn pool(values: &[(u32, u32)]) -> Vec<Die> {
        values
            .iter()
            .enumerate()
            .map(|(slot, &(value, sides))| Die::pool(value, sides, slot))
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_new_game_seeds_from_catalog() {
        let g = game(CharacterId::Daheita, Some(AuroraDieId::Medic), CharacterId::Baie, None);
        assert_eq!(g.round(), 1);
        assert_eq!(g.phase(), Phase::AttackRoll);
        assert_eq!(g.attacker_id(), P1);
        assert_eq!(g.defender_id(), P2);
        let daheita = g.combatant(P1).unwrap();
        assert_eq!((daheita.hp, daheita.max_hp), (42, 42));
        assert_eq!(daheita.attack_level, 3);
        assert_eq!(daheita.dice_sides, vec![8, 8, 6, 6, 6]);
        assert_eq!(g.rerolls_left(), 2);
    }

    #[test]
    fn test_start_coin_flip_picks_either_seat() {
        let mut rng = rng();
        let mut seen = [false, false];
        for _ in 0..64 {
            let g = Game::start(
                [
                    loadout(P1, CharacterId::Xiadie, Some(AuroraDieId::Medic)),
                    loadout(P2, CharacterId::Baie, Some(AuroraDieId::Medic)),
                ],
                GameConfig::default(),
                &mut rng,
            );
            seen[g.attacker.index()] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn test_roll_attack_rejects_defender() {
        let mut g = game(CharacterId::Xiadie, None, CharacterId::Baie, None);
        let err = g.roll_attack(P2, &mut rng()).unwrap_err();
        assert_eq!(err, EngineError::NotYourTurn);
        assert_eq!(g.phase(), Phase::AttackRoll);
    }

    #[test]
    fn test_roll_attack_moves_to_select() {
        let mut g = game(CharacterId::Xiadie, None, CharacterId::Baie, None);
        g.roll_attack(P1, &mut rng()).unwrap();
        assert_eq!(g.phase(), Phase::AttackRerollOrSelect);
        assert_eq!(g.attack_dice().len(), 5);
        let err = g.roll_attack(P1, &mut rng()).unwrap_err();
        assert_eq!(err, EngineError::WrongPhase(Phase::AttackRerollOrSelect));
    }

    #[test]
    fn test_reroll_attack_consumes_budget_and_clears_preview() {
        let mut g = game(CharacterId::Xiadie, None, CharacterId::Baie, None);
        let mut rng = rng();
        g.roll_attack(P1, &mut rng).unwrap();
        g.update_live_selection(P1, &[0, 1]).unwrap();
        g.reroll_attack(P1, &[0, 4], &mut rng).unwrap();
        assert_eq!(g.rerolls_left(), 1);
        assert!(g.attack_preview().is_empty());
        g.reroll_attack(P1, &[], &mut rng).unwrap();
        assert_eq!(g.reroll_attack(P1, &[1], &mut rng), Err(EngineError::NoRerollsLeft));
    }

    #[test]
    fn test_reroll_attack_rejects_duplicates_without_spending() {
        let mut g = game(CharacterId::Xiadie, None, CharacterId::Baie, None);
        let mut rng = rng();
        g.roll_attack(P1, &mut rng).unwrap();
        let before = g.attack_dice().to_vec();
        assert_eq!(g.reroll_attack(P1, &[2, 2], &mut rng), Err(EngineError::DuplicateIndex(2)));
        assert_eq!(g.rerolls_left(), 2);
        assert_eq!(g.attack_dice(), before.as_slice());
    }

    #[test]
    fn test_confirm_attack_requires_exact_level() {
        let mut g = game(CharacterId::Xiadie, None, CharacterId::Baie, None);
        g.roll_attack(P1, &mut rng()).unwrap();
        let err = g.confirm_attack(P1, &[0, 1]).unwrap_err();
        assert_eq!(err, EngineError::WrongSelectionCount { expected: 3, got: 2 });
        assert_eq!(g.phase(), Phase::AttackRerollOrSelect);
        assert_eq!(g.attack_value(), None);
    }

    #[test]
    fn test_confirm_attack_level_above_dice_needs_aurora() {
        let mut g = game(CharacterId::Xiadie, Some(AuroraDieId::Medic), CharacterId::Baie, None);
        g.seats[0].attack_level = 6;
        g.phase = Phase::AttackRerollOrSelect;
        g.attack_dice = pool(&[(1, 4), (2, 4), (3, 6), (5, 8), (8, 8)]);

        let err = g.confirm_attack(P1, &[0, 1, 2, 3, 4]).unwrap_err();
        assert_eq!(err, EngineError::WrongSelectionCount { expected: 6, got: 5 });
        assert_eq!(g.phase(), Phase::AttackRerollOrSelect);
        assert_eq!(g.attack_value(), None);

        g.use_aurora_die(P1, &mut rng()).unwrap();
        assert_eq!(g.attack_dice().len(), 6);
        g.confirm_attack(P1, &[0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(g.phase(), Phase::DefenseRoll);
    }

    #[test]
    fn test_confirm_defense_level_above_dice_is_rejected() {
        let mut g = game(CharacterId::Baie, None, CharacterId::Xiadie, None);
        g.seats[1].defense_level = 7;
        g.phase = Phase::DefenseSelect;
        g.attack_value = Some(10);
        g.defense_dice = pool(&[(1, 8), (2, 8), (3, 6), (4, 4), (4, 4)]);

        let err = g.confirm_defense(P2, &[0, 1, 2, 3, 4]).unwrap_err();
        assert_eq!(err, EngineError::WrongSelectionCount { expected: 7, got: 5 });
        assert_eq!(g.phase(), Phase::DefenseSelect);
        assert_eq!(g.round(), 1);
        assert_eq!(g.combatant(P2).unwrap().selected_fours, 0);
    }

    #[test]
    fn test_confirm_attack_commits_sum_and_preview() {
        let mut g = game(CharacterId::Xiadie, None, CharacterId::Baie, None);
        g.phase = Phase::AttackRerollOrSelect;
        g.attack_dice = pool(&[(1, 4), (2, 4), (3, 6), (5, 8), (8, 8)]);
        g.confirm_attack(P1, &[4, 3, 2]).unwrap();
        assert_eq!(g.attack_value(), Some(16));
        assert_eq!(g.attack_preview(), &[4, 3, 2]);
        assert_eq!(g.phase(), Phase::DefenseRoll);
    }

    #[test]
    fn test_confirm_attack_counts_selected_fours() {
        let mut g = game(CharacterId::Xiadie, None, CharacterId::Baie, None);
        g.phase = Phase::AttackRerollOrSelect;
        g.attack_dice = pool(&[(4, 4), (4, 6), (4, 8), (6, 8), (8, 8)]);
        g.confirm_attack(P1, &[0, 1, 4]).unwrap();
        assert_eq!(g.combatant(P1).unwrap().selected_fours, 2);
    }

    #[test]
    fn test_update_live_selection_caps_defense_preview() {
        let mut g = game(CharacterId::Xiadie, None, CharacterId::Baie, None);
        g.phase = Phase::DefenseSelect;
        g.defense_dice = pool(&[(1, 8), (2, 8), (3, 6), (4, 6), (5, 6)]);
        assert_eq!(
            g.update_live_selection(P2, &[0, 1, 2]),
            Err(EngineError::PreviewTooLarge { max: 2 })
        );
        g.update_live_selection(P2, &[3]).unwrap();
        assert_eq!(g.defense_preview(), &[3]);
        assert_eq!(g.defense_value(), None, "preview never commits a value");
    }

    #[test]
    fn test_update_live_selection_rejects_out_of_phase() {
        let mut g = game(CharacterId::Xiadie, None, CharacterId::Baie, None);
        assert_eq!(
            g.update_live_selection(P1, &[0]),
            Err(EngineError::WrongPhase(Phase::AttackRoll))
        );
    }

    #[test]
    fn test_use_aurora_die_inserts_and_sorts() {
        let mut g = game(CharacterId::Xiadie, Some(AuroraDieId::Medic), CharacterId::Baie, None);
        let mut rng = rng();
        g.roll_attack(P1, &mut rng).unwrap();
        g.update_live_selection(P1, &[0]).unwrap();
        g.use_aurora_die(P1, &mut rng).unwrap();
        assert_eq!(g.attack_dice().len(), 6);
        assert_eq!(g.attack_dice().iter().filter(|d| d.is_aurora()).count(), 1);
        let values: Vec<u32> = g.attack_dice().iter().map(|d| d.value).collect();
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(values, sorted);
        assert!(g.attack_preview().is_empty());
        let me = g.combatant(P1).unwrap();
        assert_eq!(me.aurora_uses, 1);
        assert!(me.aurora_used_this_round);
    }

    #[test]
    fn test_use_aurora_die_twice_in_a_round_is_refused() {
        let mut g = game(CharacterId::Xiadie, Some(AuroraDieId::Medic), CharacterId::Baie, None);
        let mut rng = rng();
        g.roll_attack(P1, &mut rng).unwrap();
        g.use_aurora_die(P1, &mut rng).unwrap();
        let dice_before = g.attack_dice().to_vec();
        assert_eq!(g.use_aurora_die(P1, &mut rng), Err(EngineError::AuroraAlreadyUsed));
        assert_eq!(g.attack_dice(), dice_before.as_slice());
        assert_eq!(g.combatant(P1).unwrap().aurora_uses, 1);
    }

    #[test]
    fn test_use_aurora_die_refused_with_no_uses() {
        let mut g = game(CharacterId::Xiadie, Some(AuroraDieId::Medic), CharacterId::Baie, None);
        g.seats[0].aurora_uses = 0;
        g.roll_attack(P1, &mut rng()).unwrap();
        assert_eq!(g.use_aurora_die(P1, &mut rng()), Err(EngineError::AuroraUsesExhausted));
    }

    #[test]
    fn test_use_aurora_die_without_equipment() {
        let mut g = game(CharacterId::Zhigengniao, None, CharacterId::Baie, None);
        g.roll_attack(P1, &mut rng()).unwrap();
        assert_eq!(g.use_aurora_die(P1, &mut rng()), Err(EngineError::NoAuroraEquipped));
    }

    #[test]
    fn test_roll_defense_then_confirm_resolves_round() {
        let mut g = game(CharacterId::Daheita, None, CharacterId::Daheita, None);
        g.phase = Phase::AttackRerollOrSelect;
        g.attack_dice = pool(&[(1, 8), (2, 8), (6, 6), (6, 6), (6, 6)]);
        g.confirm_attack(P1, &[2, 3, 4]).unwrap();
        g.roll_defense(P2, &mut rng()).unwrap();
        assert_eq!(g.phase(), Phase::DefenseSelect);
        g.defense_dice = pool(&[(1, 8), (2, 8), (3, 6), (4, 6), (5, 6)]);
        g.confirm_defense(P2, &[0, 1]).unwrap();

        assert_eq!(g.last_damage(), Some(15));
        assert_eq!(g.combatant(P2).unwrap().hp, 27);
        assert_eq!(g.round(), 2);
        assert_eq!(g.attacker_id(), P2, "roles swap after resolution");
        assert_eq!(g.phase(), Phase::AttackRoll);
        assert_eq!(g.rerolls_left(), 2);
        assert!(g.attack_dice().is_empty());
    }

    #[test]
    fn test_finished_game_rejects_everything() {
        let mut g = game(CharacterId::Xiadie, None, CharacterId::Baie, None);
        g.status = GameStatus::Ended;
        g.phase = Phase::Ended;
        assert_eq!(g.roll_attack(P1, &mut rng()), Err(EngineError::MatchOver));
        assert_eq!(g.use_aurora_die(P1, &mut rng()), Err(EngineError::MatchOver));
        assert_eq!(g.acting_player(), None);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut g = game(CharacterId::Xiadie, None, CharacterId::Baie, None);
        for i in 0..(LOG_CAPACITY + 10) {
            g.note(format!("line {i}"));
        }
        assert_eq!(g.log().len(), LOG_CAPACITY);
        assert_eq!(g.log().front().map(String::as_str), Some("line 10"));
        assert_eq!(g.log().back().map(String::as_str), Some("line 109"));
    }
}
