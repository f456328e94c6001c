//! The server's record of one connected player.

use std::time::{Duration, Instant};

use galaxy_protocol::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    /// Terminal. A closed session never reopens.
    Closed,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,
    pub state: SessionState,
    pub opened_at: Instant,
}

impl Session {
    pub(crate) fn open(player_id: PlayerId) -> Self {
        Self {
            player_id,
            state: SessionState::Connected,
            opened_at: Instant::now(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// How long the connection has been (or was) open.
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }
}
