//! Rooms for galaxy-party.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! members, their loadouts and the running [`Game`](galaxy_engine::Game).
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates/destroys rooms, routes players by code
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Room`]: the synchronous lobby → match → ended state the actor owns
//! - [`RoomConfig`]: capacity, name length, channel size, game tunables

mod actor;
mod config;
mod error;
mod manager;
mod room;

pub use actor::{PlayerSender, RoomHandle, RoomInfo, DISBANDED_REASON, OPPONENT_LEFT_REASON};
pub use config::{RoomConfig, SEATS};
pub use error::RoomError;
pub use manager::RoomRegistry;
pub use room::{normalize_name, LeaveOutcome, Member, Room, DEFAULT_CHARACTER};
