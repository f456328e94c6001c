//! Room actor: one Tokio task per room, owning the [`Room`].
//!
//! The outside world talks to it through a [`RoomHandle`]. Commands are
//! processed strictly in arrival order, so intents for one room never
//! interleave while distinct rooms run in parallel.

use std::collections::HashMap;

use galaxy_engine::PlayerId;
use galaxy_protocol::{ClientIntent, Recipient, RoomCode, RoomStatus, ServerEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};

use crate::room::{LeaveOutcome, Room};
use crate::{RoomConfig, RoomError};

/// Channel for delivering events to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Reason sent to the player left behind when a running match is closed.
pub const OPPONENT_LEFT_REASON: &str = "opponent left, room closed";

/// Reason sent to every member of a disbanded room.
pub const DISBANDED_REASON: &str = "room disbanded";

pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<LeaveOutcome, RoomError>>,
    },

    /// An in-room intent. Rejections go straight to the sender's channel.
    Intent {
        player_id: PlayerId,
        intent: ClientIntent,
    },

    /// Tell every member the room is gone and stop. Replies with the
    /// members that were detached.
    Disband {
        reply: oneshot::Sender<Vec<PlayerId>>,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown,
}

/// Room metadata, without the game.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub player_count: usize,
    pub max_players: usize,
}

impl RoomInfo {
    pub fn is_full(&self) -> bool {
        self.player_count >= self.max_players
    }
}

/// Cheap, cloneable handle to a running room actor.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.code.clone())
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn join(&self, player_id: PlayerId, name: String, sender: PlayerSender) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Join {
            player_id,
            name,
            sender,
            reply,
        })
        .await?
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        self.request(|reply| RoomCommand::Leave { player_id, reply })
            .await?
    }

    /// Queues an intent (fire-and-forget).
    pub async fn send_intent(&self, player_id: PlayerId, intent: ClientIntent) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Intent { player_id, intent })
            .await
            .map_err(|_| self.unavailable())
    }

    pub async fn disband(&self) -> Result<Vec<PlayerId>, RoomError> {
        self.request(|reply| RoomCommand::Disband { reply }).await
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

struct RoomActor {
    room: Room,
    max_players: usize,
    senders: HashMap<PlayerId, PlayerSender>,
    rng: StdRng,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        let code = self.room.code().clone();
        tracing::info!(%code, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    let closed = matches!(result, Ok(LeaveOutcome::Empty | LeaveOutcome::Closed { .. }));
                    let _ = reply.send(result);
                    if closed {
                        break;
                    }
                }
                RoomCommand::Intent { player_id, intent } => {
                    self.handle_intent(player_id, intent);
                }
                RoomCommand::Disband { reply } => {
                    let members = self.handle_disband();
                    let _ = reply.send(members);
                    break;
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(%code, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(%code, "room actor stopped");
    }

    fn handle_join(&mut self, player_id: PlayerId, name: String, sender: PlayerSender) -> Result<(), RoomError> {
        self.room.add_player(player_id, name, &mut self.rng)?;
        self.senders.insert(player_id, sender);
        tracing::info!(
            code = %self.room.code(),
            %player_id,
            players = self.room.members().len(),
            "player joined"
        );
        self.broadcast_state();
        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let outcome = self.room.remove_player(player_id)?;
        self.senders.remove(&player_id);
        tracing::info!(code = %self.room.code(), %player_id, ?outcome, "player left");

        match outcome {
            LeaveOutcome::Remaining => self.broadcast_state(),
            LeaveOutcome::Closed { remaining } => {
                self.dispatch(
                    Recipient::Player(remaining),
                    ServerEvent::left_room(Some(OPPONENT_LEFT_REASON.to_string())),
                );
                self.senders.clear();
            }
            LeaveOutcome::Empty => {}
        }
        Ok(outcome)
    }

    fn handle_intent(&mut self, player_id: PlayerId, intent: ClientIntent) {
        if !self.senders.contains_key(&player_id) {
            tracing::warn!(code = %self.room.code(), %player_id, "intent from non-member, ignoring");
            return;
        }

        match self.room.apply(player_id, &intent, &mut self.rng) {
            Ok(()) => self.broadcast_state(),
            Err(e) => {
                tracing::debug!(
                    code = %self.room.code(),
                    %player_id,
                    intent = intent.kind(),
                    error = %e,
                    "intent rejected"
                );
                self.dispatch(Recipient::Player(player_id), ServerEvent::error(e.to_string()));
            }
        }
    }

    fn handle_disband(&mut self) -> Vec<PlayerId> {
        let members: Vec<PlayerId> = self.senders.keys().copied().collect();
        self.dispatch(
            Recipient::All,
            ServerEvent::left_room(Some(DISBANDED_REASON.to_string())),
        );
        self.senders.clear();
        tracing::info!(code = %self.room.code(), members = members.len(), "room disbanded");
        members
    }

    /// Sends every member their own view of the room.
    fn broadcast_state(&self) {
        for player_id in self.senders.keys() {
            let event = ServerEvent::RoomState {
                room: self.room.view_for(*player_id),
            };
            self.send_to(*player_id, event);
        }
    }

    fn dispatch(&self, recipient: Recipient, event: ServerEvent) {
        for player_id in self.senders.keys().filter(|id| recipient.includes(**id)) {
            self.send_to(*player_id, event.clone());
        }
    }

    /// Drops the event if the player's connection is already gone.
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(event);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.room.code().clone(),
            status: self.room.status(),
            player_count: self.room.members().len(),
            max_players: self.max_players,
        }
    }
}

/// Spawns a room actor task and returns its handle.
pub(crate) fn spawn_room(code: RoomCode, config: RoomConfig) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));

    let actor = RoomActor {
        max_players: config.capacity(),
        room: Room::new(code.clone(), config),
        senders: HashMap::new(),
        rng: StdRng::from_os_rng(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
