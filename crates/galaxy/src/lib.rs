//! # galaxy
//!
//! Authoritative WebSocket server for a two-player dice duel.
//!
//! Players connect, create or join a room by four-digit code, pick a
//! character and aurora die, and fight a round-based match whose every
//! roll and rule lives on the server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use galaxy::prelude::*;
//!
//! # async fn demo() -> Result<(), GalaxyError> {
//! let server = GalaxyServerBuilder::from_config(ServerConfig::default())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ServerArgs, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use error::GalaxyError;
pub use handler::MALFORMED_MESSAGE;
pub use server::{GalaxyServer, GalaxyServerBuilder};

pub mod prelude {
    pub use crate::{GalaxyError, GalaxyServer, GalaxyServerBuilder, ServerArgs, ServerConfig};
    pub use galaxy_protocol::{ClientIntent, PlayerId, RoomCode, RoomStatus, RoomView, ServerEvent};
    pub use galaxy_room::{RoomConfig, RoomError};
}
