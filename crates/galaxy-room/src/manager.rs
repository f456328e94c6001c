//! Room registry: the directory of live rooms and who sits where.

use std::collections::HashMap;

use galaxy_engine::PlayerId;
use galaxy_protocol::{ClientIntent, RoomCode};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::actor::spawn_room;
use crate::room::{normalize_name, LeaveOutcome};
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Owns every room handle and the player → room index.
///
/// A player is in at most one room. Creating or joining another room
/// first removes them from the current one.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    player_rooms: HashMap<PlayerId, RoomCode>,
    config: RoomConfig,
    rng: StdRng,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Opens a new room with `player_id` as its first member and returns
    /// its code.
    pub async fn create_room(
        &mut self,
        player_id: PlayerId,
        name: &str,
        sender: PlayerSender,
    ) -> Result<RoomCode, RoomError> {
        let name = normalize_name(name, self.config.max_name_chars)?;
        self.leave_current(player_id).await;

        let code = self.unused_code();
        let handle = spawn_room(code.clone(), self.config.clone());
        self.rooms.insert(code.clone(), handle.clone());
        tracing::info!(%code, %player_id, "room created");

        if let Err(e) = handle.join(player_id, name, sender).await {
            self.rooms.remove(&code);
            let _ = handle.shutdown().await;
            return Err(e);
        }
        self.player_rooms.insert(player_id, code.clone());
        Ok(code)
    }

    /// Seats `player_id` in the room with the given code.
    ///
    /// Checks run in a fixed order (name, code format, existence,
    /// capacity) and all of them before the player leaves any current
    /// room.
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        name: &str,
        code: &str,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let name = normalize_name(name, self.config.max_name_chars)?;
        let code = RoomCode::parse(code).map_err(|_| RoomError::InvalidCode)?;
        let handle = self
            .rooms
            .get(&code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        if self.player_rooms.get(&player_id) == Some(&code) {
            return Err(RoomError::AlreadyInRoom(player_id, code));
        }
        if handle.get_info().await?.is_full() {
            return Err(RoomError::RoomFull(code));
        }

        self.leave_current(player_id).await;
        handle.join(player_id, name, sender).await?;
        self.player_rooms.insert(player_id, code);
        Ok(())
    }

    /// Removes a player from their room, dropping the room when it empties
    /// or closes.
    pub async fn leave(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let code = self
            .player_rooms
            .get(&player_id)
            .cloned()
            .ok_or(RoomError::NotInRoom)?;
        let handle = self
            .rooms
            .get(&code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let outcome = handle.leave(player_id).await;
        self.player_rooms.remove(&player_id);

        match outcome? {
            LeaveOutcome::Remaining => {}
            LeaveOutcome::Empty => self.forget_room(&code),
            LeaveOutcome::Closed { remaining } => {
                self.player_rooms.remove(&remaining);
                self.forget_room(&code);
            }
        }
        Ok(())
    }

    /// Tears down the caller's room. Every member gets `left_room`.
    pub async fn disband(&mut self, player_id: PlayerId) -> Result<RoomCode, RoomError> {
        let code = self
            .player_rooms
            .get(&player_id)
            .cloned()
            .ok_or(RoomError::NotInRoom)?;
        let handle = self
            .rooms
            .remove(&code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let members = handle.disband().await.unwrap_or_default();
        self.player_rooms.retain(|_, c| *c != code);
        tracing::info!(%code, %player_id, members = members.len(), "room destroyed");
        Ok(code)
    }

    /// Forwards an in-room intent to the player's room actor.
    pub async fn route_intent(&self, player_id: PlayerId, intent: ClientIntent) -> Result<(), RoomError> {
        let code = self.player_rooms.get(&player_id).ok_or(RoomError::NotInRoom)?;
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        handle.send_intent(player_id, intent).await
    }

    pub async fn room_info(&self, code: &RoomCode) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        handle.get_info().await
    }

    pub fn player_room(&self, player_id: &PlayerId) -> Option<RoomCode> {
        self.player_rooms.get(player_id).cloned()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Implicit leave before creating or joining elsewhere. A player with
    /// no room is fine here.
    async fn leave_current(&mut self, player_id: PlayerId) {
        if !self.player_rooms.contains_key(&player_id) {
            return;
        }
        if let Err(e) = self.leave(player_id).await {
            tracing::warn!(%player_id, error = %e, "implicit leave failed");
        }
    }

    fn forget_room(&mut self, code: &RoomCode) {
        if self.rooms.remove(code).is_some() {
            tracing::info!(%code, "room destroyed");
        }
    }

    fn unused_code(&mut self) -> RoomCode {
        loop {
            let code = RoomCode::random(&mut self.rng);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
