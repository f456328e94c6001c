//! Codec trait and implementations for turning intents and events into
//! frames and back.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
///
/// The server only ever holds one codec, shared by every connection task,
/// so implementations must be `Send + Sync + 'static`.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or do not
    /// match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`. Browser clients speak JSON text
/// frames, so this is the only codec the server ships with.
///
/// ```rust
/// use galaxy_protocol::{ClientIntent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let intent: ClientIntent = codec
///     .decode(br#"{"type":"reroll_attack","indices":[0,2]}"#)
///     .unwrap();
/// assert_eq!(intent, ClientIntent::RerollAttack { indices: vec![0, 2] });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
