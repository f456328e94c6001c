//! Player sessions for galaxy-party.
//!
//! Every accepted connection gets exactly one session, and with it a
//! fresh [`PlayerId`](galaxy_protocol::PlayerId). There is no
//! authentication and no resume: a dropped connection is a departed
//! player.
//!
//! ```text
//! Room Layer (above)     ← keyed by the PlayerId a session hands out
//!     ↕
//! Session Layer (this)   ← who is connected, closed at most once
//!     ↕
//! Protocol Layer (below) ← PlayerId
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionState};
