//! Error types for the room layer.

use galaxy_engine::{EngineError, ErrorCategory, PlayerId};
use galaxy_protocol::RoomCode;

/// Reasons a room-level request is rejected. Every variant leaves room and
/// game state untouched.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A rules-engine rejection passed through unchanged.
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("please enter a player name")]
    EmptyName,

    #[error("room code must be 4 digits")]
    InvalidCode,

    #[error("room {0} does not exist")]
    NotFound(RoomCode),

    #[error("room {0} is full")]
    RoomFull(RoomCode),

    #[error("player {0} is already in room {1}")]
    AlreadyInRoom(PlayerId, RoomCode),

    #[error("you are not in a room")]
    NotInRoom,

    #[error("the match has started; loadout can no longer change")]
    GameAlreadyStarted,

    #[error("this character cannot equip an aurora die")]
    AuroraNotAllowed,

    #[error("no match in progress")]
    NoGame,

    #[error("the match has not ended")]
    NotEnded,

    /// A registry-level intent reached a room actor.
    #[error("{0} is not handled by a room")]
    Misrouted(&'static str),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl RoomError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Engine(e) => e.category(),
            Self::EmptyName => ErrorCategory::Validation,
            _ => ErrorCategory::Structural,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_keep_their_message_and_category() {
        let err = RoomError::from(EngineError::NoRerollsLeft);
        assert_eq!(err.to_string(), EngineError::NoRerollsLeft.to_string());
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err = RoomError::from(EngineError::AuroraUsesExhausted);
        assert_eq!(err.category(), ErrorCategory::AbilityPrecondition);
    }

    #[test]
    fn test_structural_errors() {
        let code = RoomCode::parse("1234").unwrap();
        assert_eq!(RoomError::RoomFull(code.clone()).category(), ErrorCategory::Structural);
        assert_eq!(RoomError::NotFound(code).to_string(), "room 1234 does not exist");
        assert_eq!(RoomError::EmptyName.category(), ErrorCategory::Validation);
    }
}
