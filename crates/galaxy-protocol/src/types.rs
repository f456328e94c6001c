//! Everything that travels on the wire: inbound intents, outbound events
//! and the per-viewer room projection.
//!
//! Both directions are internally tagged on `type` with snake_case names
//! and camelCase fields, e.g. `{"type":"join_room","name":"Ann","code":"4821"}`.

use std::fmt;
use std::str::FromStr;

use galaxy_engine::{
    aurora_summaries, character_summaries, AuroraDieId, AuroraSummary, CharacterId,
    CharacterSummary, GameView, PlayerId,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// A four-digit code players type to find a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Validates user input. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let code = raw.trim();
        if code.len() == 4 && code.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(code.to_string()))
        } else {
            Err(ProtocolError::InvalidRoomCode(raw.to_string()))
        }
    }

    /// A random code in `1000..=9999`. Uniqueness is the caller's job.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random_range(1000..=9999u32).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room lifecycle as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Lobby,
    InGame,
    Ended,
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who a directed room notice is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every current member of the room.
    All,
    Player(PlayerId),
}

impl Recipient {
    pub fn includes(&self, player_id: PlayerId) -> bool {
        match self {
            Self::All => true,
            Self::Player(id) => *id == player_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Client -> server
// ---------------------------------------------------------------------------

/// A request sent by a client. Catalog ids stay raw strings here so an
/// unknown id is reported as a room error rather than a malformed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientIntent {
    CreateRoom {
        #[serde(default)]
        name: String,
    },
    JoinRoom {
        #[serde(default)]
        name: String,
        #[serde(default)]
        code: String,
    },
    ChooseCharacter {
        character_id: String,
    },
    ChooseAuroraDie {
        aurora_dice_id: String,
    },
    LeaveRoom,
    RollAttack,
    UseAuroraDie,
    RerollAttack {
        indices: Vec<usize>,
    },
    UpdateLiveSelection {
        indices: Vec<usize>,
    },
    ConfirmAttackSelection {
        indices: Vec<usize>,
    },
    RollDefense,
    ConfirmDefenseSelection {
        indices: Vec<usize>,
    },
    PlayAgain,
    DisbandRoom,
}

impl ClientIntent {
    /// The wire name of this intent, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "create_room",
            Self::JoinRoom { .. } => "join_room",
            Self::ChooseCharacter { .. } => "choose_character",
            Self::ChooseAuroraDie { .. } => "choose_aurora_die",
            Self::LeaveRoom => "leave_room",
            Self::RollAttack => "roll_attack",
            Self::UseAuroraDie => "use_aurora_die",
            Self::RerollAttack { .. } => "reroll_attack",
            Self::UpdateLiveSelection { .. } => "update_live_selection",
            Self::ConfirmAttackSelection { .. } => "confirm_attack_selection",
            Self::RollDefense => "roll_defense",
            Self::ConfirmDefenseSelection { .. } => "confirm_defense_selection",
            Self::PlayAgain => "play_again",
            Self::DisbandRoom => "disband_room",
        }
    }
}

// ---------------------------------------------------------------------------
// Server -> client
// ---------------------------------------------------------------------------

/// One room member as a particular viewer is allowed to see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub character_id: Option<CharacterId>,
    pub character_name: Option<String>,
    pub aurora_dice_id: Option<AuroraDieId>,
    pub aurora_dice_name: Option<String>,
}

impl PlayerView {
    /// A member with their loadout visible.
    pub fn revealed(
        id: PlayerId,
        name: impl Into<String>,
        character: Option<CharacterId>,
        aurora: Option<AuroraDieId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            character_id: character,
            character_name: character.map(|c| c.character().name.to_string()),
            aurora_dice_id: aurora,
            aurora_dice_name: aurora.map(|a| a.aurora_die().name.to_string()),
        }
    }

    /// A member whose loadout is hidden from this viewer.
    pub fn redacted(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            character_id: None,
            character_name: None,
            aurora_dice_id: None,
            aurora_dice_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub code: RoomCode,
    pub status: RoomStatus,
    /// The first unmet readiness condition; empty once a match is running.
    pub waiting_reason: String,
    pub players: Vec<PlayerView>,
    pub game: Option<GameView>,
}

/// A message pushed from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// First event on every connection.
    Welcome {
        player_id: PlayerId,
        characters: Vec<CharacterSummary>,
        aurora_dice: Vec<AuroraSummary>,
    },
    RoomState {
        room: RoomView,
    },
    /// The recipient is no longer in a room.
    LeftRoom {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// A rejected intent. Sent only to the connection that sent it.
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn welcome(player_id: PlayerId) -> Self {
        Self::Welcome {
            player_id,
            characters: character_summaries(),
            aurora_dice: aurora_summaries(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn left_room(reason: Option<String>) -> Self {
        Self::LeftRoom { reason }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_room_code_parse_accepts_four_digits() {
        let code = RoomCode::parse(" 0427 ").unwrap();
        assert_eq!(code.as_str(), "0427");
    }

    #[test]
    fn test_room_code_parse_rejects_malformed() {
        for raw in ["", "123", "12345", "12a4", "１２３４"] {
            assert!(
                matches!(RoomCode::parse(raw), Err(ProtocolError::InvalidRoomCode(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_room_code_random_is_four_digits() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let code = RoomCode::random(&mut rng);
            assert!(RoomCode::parse(code.as_str()).is_ok(), "{code}");
            assert!(!code.as_str().starts_with('0'));
        }
    }

    #[test]
    fn test_recipient_includes() {
        assert!(Recipient::All.includes(PlayerId(1)));
        assert!(Recipient::Player(PlayerId(1)).includes(PlayerId(1)));
        assert!(!Recipient::Player(PlayerId(1)).includes(PlayerId(2)));
    }

    #[test]
    fn test_intent_decodes_camel_case_fields() {
        let intent: ClientIntent =
            serde_json::from_str(r#"{"type":"choose_aurora_die","auroraDiceId":"medic"}"#).unwrap();
        assert_eq!(
            intent,
            ClientIntent::ChooseAuroraDie {
                aurora_dice_id: "medic".into()
            }
        );

        let intent: ClientIntent =
            serde_json::from_str(r#"{"type":"join_room","name":"Ann","code":"1234"}"#).unwrap();
        assert_eq!(intent.kind(), "join_room");
    }

    #[test]
    fn test_intent_unit_variants_ignore_extra_fields() {
        let intent: ClientIntent =
            serde_json::from_str(r#"{"type":"roll_attack","junk":true}"#).unwrap();
        assert_eq!(intent, ClientIntent::RollAttack);
    }

    #[test]
    fn test_intent_create_room_without_name_decodes_empty() {
        let intent: ClientIntent = serde_json::from_str(r#"{"type":"create_room"}"#).unwrap();
        assert_eq!(intent, ClientIntent::CreateRoom { name: String::new() });
    }

    #[test]
    fn test_intent_negative_index_is_malformed() {
        let result: Result<ClientIntent, _> =
            serde_json::from_str(r#"{"type":"reroll_attack","indices":[-1]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_welcome_carries_both_catalogs() {
        let json = serde_json::to_value(ServerEvent::welcome(PlayerId(3))).unwrap();
        assert_eq!(json["type"], "welcome");
        assert_eq!(json["playerId"], 3);
        assert_eq!(json["characters"].as_array().unwrap().len(), 5);
        assert_eq!(json["auroraDice"].as_array().unwrap().len(), 4);
        assert_eq!(json["characters"][0]["shortSpec"], "2x8 1x6 2x4 2A 3+2");
    }

    #[test]
    fn test_left_room_omits_missing_reason() {
        let json = serde_json::to_string(&ServerEvent::left_room(None)).unwrap();
        assert_eq!(json, r#"{"type":"left_room"}"#);
        let json = serde_json::to_value(ServerEvent::left_room(Some("closed".into()))).unwrap();
        assert_eq!(json["reason"], "closed");
    }

    #[test]
    fn test_redacted_player_hides_loadout() {
        let view = PlayerView::redacted(PlayerId(2), "Bo");
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["characterId"].is_null());
        assert!(json["auroraDiceName"].is_null());

        let view = PlayerView::revealed(
            PlayerId(2),
            "Bo",
            Some(CharacterId::Baie),
            Some(AuroraDieId::Medic),
        );
        assert_eq!(view.character_name.as_deref(), Some("白厄"));
        assert_eq!(view.aurora_dice_name.as_deref(), Some("医嘱"));
    }

    #[test]
    fn test_room_status_snake_case() {
        assert_eq!(serde_json::to_string(&RoomStatus::InGame).unwrap(), "\"in_game\"");
    }
}
