//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding or parsing wire data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Malformed JSON, an unknown `type`, or fields of the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    #[error("room code must be 4 digits, got {0:?}")]
    InvalidRoomCode(String),
}
