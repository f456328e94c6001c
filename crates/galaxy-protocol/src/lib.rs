//! Wire protocol for galaxy-party.
//!
//! - **Types** ([`ClientIntent`], [`ServerEvent`], [`RoomView`], [`RoomCode`]):
//!   the messages exchanged with browser clients.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages become
//!   frames.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about connections or rooms; it sits
//! between the transport's raw frames and the room actors.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientIntent) → Room (RoomCommand)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientIntent, PlayerView, Recipient, RoomCode, RoomStatus, RoomView, ServerEvent};

pub use galaxy_engine::PlayerId;
