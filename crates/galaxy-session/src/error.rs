//! Error types for the session layer.

use galaxy_protocol::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No open session for this player. Closing twice lands here.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),
}
