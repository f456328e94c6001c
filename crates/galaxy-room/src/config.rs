//! Room configuration.

use galaxy_engine::GameConfig;

/// Seats in a duel. Rooms never hold more players than this.
pub const SEATS: usize = 2;

/// Settings shared by every room a registry creates.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Players allowed in a room, capped at [`SEATS`].
    pub max_players: usize,

    /// Names longer than this are truncated (in characters, not bytes).
    pub max_name_chars: usize,

    /// Capacity of each room actor's command channel.
    pub channel_size: usize,

    /// Tunables handed to every new game.
    pub game: GameConfig,
}

impl RoomConfig {
    pub(crate) fn capacity(&self) -> usize {
        self.max_players.clamp(1, SEATS)
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: SEATS,
            max_name_chars: 20,
            channel_size: 64,
            game: GameConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.max_players, 2);
        assert_eq!(config.max_name_chars, 20);
        assert_eq!(config.channel_size, 64);
        assert_eq!(config.game.rerolls_per_round, 2);
    }

    #[test]
    fn test_capacity_never_exceeds_seats() {
        let config = RoomConfig {
            max_players: 8,
            ..RoomConfig::default()
        };
        assert_eq!(config.capacity(), SEATS);
    }
}
