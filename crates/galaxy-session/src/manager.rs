//! The session manager: allocates player ids and tracks open sessions.
//!
//! `SessionManager` is a plain map. The server keeps it behind a mutex and
//! holds the lock only for the duration of `open` or `close`.

use std::collections::HashMap;

use galaxy_protocol::PlayerId;

use crate::{Session, SessionError, SessionState};

/// Registry of every connected player.
///
/// ```text
/// open() ──→ [Connected] ──→ close() ──→ [Closed] (removed)
/// ```
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
    next_id: u64,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            next_id: 1,
        }
    }

    /// Opens a session under a never-before-used player id.
    pub fn open(&mut self) -> &Session {
        let player_id = PlayerId(self.next_id);
        self.next_id += 1;

        tracing::info!(%player_id, "session opened");
        self.sessions
            .entry(player_id)
            .or_insert_with(|| Session::open(player_id))
    }

    /// Closes a session and hands back its final record.
    ///
    /// Succeeds at most once per player, which is what lets the disconnect
    /// path run its room cleanup exactly once.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the player has no open session.
    pub fn close(&mut self, player_id: PlayerId) -> Result<Session, SessionError> {
        let mut session = self
            .sessions
            .remove(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        session.state = SessionState::Closed;

        tracing::info!(%player_id, secs = session.age().as_secs(), "session closed");
        Ok(session)
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    pub fn is_connected(&self, player_id: &PlayerId) -> bool {
        self.sessions
            .get(player_id)
            .is_some_and(Session::is_connected)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_returns_connected_session() {
        let mut mgr = SessionManager::new();
        let session = mgr.open();
        assert_eq!(session.state, SessionState::Connected);
        assert_eq!(session.player_id, PlayerId(1));
    }

    #[test]
    fn test_open_allocates_distinct_ids() {
        let mut mgr = SessionManager::new();
        let a = mgr.open().player_id;
        let b = mgr.open().player_id;
        let c = mgr.open().player_id;
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(mgr.len(), 3);
    }

    #[test]
    fn test_close_returns_closed_record() {
        let mut mgr = SessionManager::new();
        let id = mgr.open().player_id;

        let session = mgr.close(id).expect("first close succeeds");
        assert_eq!(session.state, SessionState::Closed);
        assert!(!session.is_connected());
        assert!(!mgr.is_connected(&id));
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_close_twice_returns_not_found() {
        let mut mgr = SessionManager::new();
        let id = mgr.open().player_id;
        mgr.close(id).unwrap();

        assert_eq!(mgr.close(id).unwrap_err(), SessionError::NotFound(id));
    }

    #[test]
    fn test_close_unknown_player_returns_not_found() {
        let mut mgr = SessionManager::new();
        assert!(matches!(
            mgr.close(PlayerId(42)),
            Err(SessionError::NotFound(PlayerId(42)))
        ));
    }

    #[test]
    fn test_ids_not_reused_after_close() {
        let mut mgr = SessionManager::new();
        let first = mgr.open().player_id;
        mgr.close(first).unwrap();
        let second = mgr.open().player_id;
        assert_ne!(first, second);
    }

    #[test]
    fn test_get_tracks_open_sessions_only() {
        let mut mgr = SessionManager::new();
        let a = mgr.open().player_id;
        let b = mgr.open().player_id;
        mgr.close(a).unwrap();

        assert!(mgr.get(&a).is_none());
        assert!(mgr.get(&b).is_some_and(Session::is_connected));
        assert_eq!(mgr.len(), 1);
    }
}
