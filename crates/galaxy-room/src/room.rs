//! The synchronous room: members, loadouts, readiness and the game.
//!
//! A [`Room`] is owned by exactly one actor task, so nothing here locks or
//! awaits. Every mutating method either succeeds or returns an error with
//! the room unchanged.

use galaxy_engine::{AuroraDieId, CharacterId, Game, Loadout, PlayerId};
use galaxy_protocol::{ClientIntent, PlayerView, RoomCode, RoomStatus, RoomView};
use rand::Rng;

use crate::config::SEATS;
use crate::{RoomConfig, RoomError};

/// A seated player and the loadout they have picked so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub player_id: PlayerId,
    pub name: String,
    pub character: CharacterId,
    pub aurora: Option<AuroraDieId>,
}

/// Character a player holds until they pick one.
pub const DEFAULT_CHARACTER: CharacterId = CharacterId::Xiadie;

/// What removing a player did to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Someone is still seated and the room lives on.
    Remaining,
    /// Nobody is left. The room should be dropped.
    Empty,
    /// A running match lost a player. The room is closed and `remaining`
    /// is detached from it.
    Closed { remaining: PlayerId },
}

/// Trims a player name and cuts it to `max_chars` characters.
///
/// # Errors
/// [`RoomError::EmptyName`] if nothing is left after trimming.
pub fn normalize_name(raw: &str, max_chars: usize) -> Result<String, RoomError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RoomError::EmptyName);
    }
    Ok(trimmed.chars().take(max_chars).collect())
}

pub struct Room {
    code: RoomCode,
    status: RoomStatus,
    waiting_reason: String,
    members: Vec<Member>,
    game: Option<Game>,
    config: RoomConfig,
}

impl Room {
    pub fn new(code: RoomCode, config: RoomConfig) -> Self {
        let mut room = Self {
            code,
            status: RoomStatus::Lobby,
            waiting_reason: String::new(),
            members: Vec::with_capacity(SEATS),
            game: None,
            config,
        };
        room.waiting_reason = room.readiness().err().unwrap_or_default();
        room
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn waiting_reason(&self) -> &str {
        &self.waiting_reason
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn is_member(&self, player_id: PlayerId) -> bool {
        self.members.iter().any(|m| m.player_id == player_id)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.config.capacity()
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Seats a player holding [`DEFAULT_CHARACTER`] and no aurora die.
    pub fn add_player<R: Rng + ?Sized>(
        &mut self,
        player_id: PlayerId,
        name: String,
        rng: &mut R,
    ) -> Result<(), RoomError> {
        if self.is_member(player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, self.code.clone()));
        }
        if self.is_full() {
            return Err(RoomError::RoomFull(self.code.clone()));
        }

        self.members.push(Member {
            player_id,
            name,
            character: DEFAULT_CHARACTER,
            aurora: None,
        });
        self.start_if_ready(rng);
        Ok(())
    }

    /// Removes a player.
    ///
    /// Leaving a running match closes the room for the other player. In the
    /// lobby readiness is re-evaluated. After a match has ended the
    /// remaining player keeps the room and its final state.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let index = self
            .members
            .iter()
            .position(|m| m.player_id == player_id)
            .ok_or(RoomError::NotInRoom)?;
        self.members.remove(index);

        if self.members.is_empty() {
            return Ok(LeaveOutcome::Empty);
        }

        if self.status == RoomStatus::InGame {
            let remaining = self.members[0].player_id;
            self.members.clear();
            self.game = None;
            return Ok(LeaveOutcome::Closed { remaining });
        }

        if self.status == RoomStatus::Lobby {
            self.refresh_waiting_reason();
        }
        Ok(LeaveOutcome::Remaining)
    }

    // -----------------------------------------------------------------------
    // Loadout
    // -----------------------------------------------------------------------

    /// Picks a character. Switching to a character that cannot use an
    /// aurora die unequips the current one.
    pub fn choose_character<R: Rng + ?Sized>(
        &mut self,
        player_id: PlayerId,
        raw_id: &str,
        rng: &mut R,
    ) -> Result<(), RoomError> {
        self.ensure_lobby()?;
        let character: CharacterId = raw_id.parse()?;
        let member = self.member_mut(player_id)?;

        member.character = character;
        if !character.character().requires_aurora() {
            member.aurora = None;
        }
        self.start_if_ready(rng);
        Ok(())
    }

    pub fn choose_aurora<R: Rng + ?Sized>(
        &mut self,
        player_id: PlayerId,
        raw_id: &str,
        rng: &mut R,
    ) -> Result<(), RoomError> {
        self.ensure_lobby()?;
        let member = self.member_mut(player_id)?;
        if !member.character.character().requires_aurora() {
            return Err(RoomError::AuroraNotAllowed);
        }
        let aurora: AuroraDieId = raw_id.parse()?;

        member.aurora = Some(aurora);
        self.start_if_ready(rng);
        Ok(())
    }

    /// Discards a finished game and goes back to the lobby. Loadouts are
    /// kept, so a rematch starts at once when both players are still
    /// seated.
    pub fn play_again<R: Rng + ?Sized>(&mut self, player_id: PlayerId, rng: &mut R) -> Result<(), RoomError> {
        if !self.is_member(player_id) {
            return Err(RoomError::NotInRoom);
        }
        if self.status != RoomStatus::Ended {
            return Err(RoomError::NotEnded);
        }

        self.status = RoomStatus::Lobby;
        self.game = None;
        self.start_if_ready(rng);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    /// Applies one in-room intent on behalf of `player_id`.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        player_id: PlayerId,
        intent: &ClientIntent,
        rng: &mut R,
    ) -> Result<(), RoomError> {
        match intent {
            ClientIntent::ChooseCharacter { character_id } => {
                return self.choose_character(player_id, character_id, rng);
            }
            ClientIntent::ChooseAuroraDie { aurora_dice_id } => {
                return self.choose_aurora(player_id, aurora_dice_id, rng);
            }
            ClientIntent::PlayAgain => return self.play_again(player_id, rng),
            ClientIntent::CreateRoom { .. }
            | ClientIntent::JoinRoom { .. }
            | ClientIntent::LeaveRoom
            | ClientIntent::DisbandRoom => return Err(RoomError::Misrouted(intent.kind())),
            _ => {}
        }

        if !self.is_member(player_id) {
            return Err(RoomError::NotInRoom);
        }
        let game = self.game.as_mut().ok_or(RoomError::NoGame)?;

        match intent {
            ClientIntent::RollAttack => game.roll_attack(player_id, rng)?,
            ClientIntent::UseAuroraDie => game.use_aurora_die(player_id, rng)?,
            ClientIntent::RerollAttack { indices } => game.reroll_attack(player_id, indices, rng)?,
            ClientIntent::UpdateLiveSelection { indices } => {
                game.update_live_selection(player_id, indices)?
            }
            ClientIntent::ConfirmAttackSelection { indices } => game.confirm_attack(player_id, indices)?,
            ClientIntent::RollDefense => game.roll_defense(player_id, rng)?,
            ClientIntent::ConfirmDefenseSelection { indices } => {
                game.confirm_defense(player_id, indices)?
            }
            _ => return Err(RoomError::Misrouted(intent.kind())),
        }

        if game.is_over() && self.status == RoomStatus::InGame {
            self.status = RoomStatus::Ended;
            tracing::info!(code = %self.code, winner = ?game.winner(), "room match ended");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Readiness
    // -----------------------------------------------------------------------

    /// Both loadouts if the room can start, otherwise the first unmet
    /// condition as a player-facing sentence.
    pub fn readiness(&self) -> Result<[Loadout; 2], String> {
        let [first, second] = self.members.as_slice() else {
            return Err("waiting for another player".to_string());
        };
        Ok([Self::loadout(first)?, Self::loadout(second)?])
    }

    fn loadout(member: &Member) -> Result<Loadout, String> {
        let character = member.character;
        match (character.character().requires_aurora(), member.aurora) {
            (true, None) => Err(format!("{} has not equipped an aurora die", member.name)),
            (false, Some(_)) => Err(format!("{}'s character cannot equip an aurora die", member.name)),
            (_, aurora) => Ok(Loadout {
                player_id: member.player_id,
                name: member.name.clone(),
                character,
                aurora,
            }),
        }
    }

    /// Starts a match if the lobby is ready. Returns whether one started.
    pub fn start_if_ready<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.status != RoomStatus::Lobby {
            return false;
        }
        match self.readiness() {
            Ok(loadouts) => {
                let game = Game::start(loadouts, self.config.game.clone(), rng);
                tracing::info!(
                    code = %self.code,
                    attacker = %game.attacker_id(),
                    "match started"
                );
                self.game = Some(game);
                self.status = RoomStatus::InGame;
                self.waiting_reason.clear();
                true
            }
            Err(reason) => {
                self.waiting_reason = reason;
                false
            }
        }
    }

    fn refresh_waiting_reason(&mut self) {
        self.waiting_reason = self.readiness().err().unwrap_or_default();
    }

    // -----------------------------------------------------------------------
    // Projection
    // -----------------------------------------------------------------------

    /// The room as `viewer` may see it. In the lobby the other members'
    /// loadouts are hidden.
    pub fn view_for(&self, viewer: PlayerId) -> RoomView {
        let players = self
            .members
            .iter()
            .map(|m| {
                if self.status == RoomStatus::Lobby && m.player_id != viewer {
                    PlayerView::redacted(m.player_id, m.name.clone())
                } else {
                    PlayerView::revealed(m.player_id, m.name.clone(), Some(m.character), m.aurora)
                }
            })
            .collect();

        RoomView {
            code: self.code.clone(),
            status: self.status,
            waiting_reason: self.waiting_reason.clone(),
            players,
            game: self.game.as_ref().map(Game::view),
        }
    }

    fn ensure_lobby(&self) -> Result<(), RoomError> {
        if self.status == RoomStatus::Lobby {
            Ok(())
        } else {
            Err(RoomError::GameAlreadyStarted)
        }
    }

    fn member_mut(&mut self, player_id: PlayerId) -> Result<&mut Member, RoomError> {
        self.members
            .iter_mut()
            .find(|m| m.player_id == player_id)
            .ok_or(RoomError::NotInRoom)
    }
}
