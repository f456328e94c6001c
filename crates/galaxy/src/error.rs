//! Unified error type for the galaxy-party server.

use galaxy_protocol::ProtocolError;
use galaxy_room::RoomError;
use galaxy_session::SessionError;
use galaxy_transport::TransportError;

/// Top-level error wrapping every layer's error type, so `?` works across
/// layers.
#[derive(Debug, thiserror::Error)]
pub enum GalaxyError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use galaxy_protocol::PlayerId;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: GalaxyError = TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, GalaxyError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: GalaxyError = ProtocolError::InvalidRoomCode("12".into()).into();
        assert!(matches!(err, GalaxyError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err: GalaxyError = SessionError::NotFound(PlayerId(3)).into();
        assert!(matches!(err, GalaxyError::Session(_)));
    }

    #[test]
    fn test_from_room_error_keeps_message() {
        let err: GalaxyError = RoomError::NotInRoom.into();
        assert!(matches!(err, GalaxyError::Room(_)));
        assert_eq!(err.to_string(), "you are not in a room");
    }
}
