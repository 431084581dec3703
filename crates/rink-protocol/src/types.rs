//! Identity newtypes and the streaming game-message types.
//!
//! Everything here either travels on the wire (the prost messages) or
//! names something that does (the ID newtypes). The registries never
//! store references to each other's records — they cross-reference by
//! these opaque IDs and resolve them at lookup time, which keeps
//! deletion safe under concurrent access.

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Opaque string, server- or client-supplied (historically a UUID, but
/// the server never inspects the contents). Newtype wrapper so a
/// `RoomId` can't be passed where a `PlayerId` is expected.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
    serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Returns the raw string form used on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a room.
///
/// Generated by the server (32 hex chars), globally unique for the
/// server's lifetime. Same newtype pattern as [`PlayerId`].
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
    serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Streaming message payloads
// ---------------------------------------------------------------------------

/// Match lifecycle phase carried by [`GameState`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    prost::Enumeration,
)]
#[repr(i32)]
pub enum MatchPhase {
    /// Room exists, match has not started.
    Lobby = 0,
    /// Match is running.
    Playing = 1,
    /// Match ended (target score reached or host left).
    Finished = 2,
}

/// Match lifecycle transition: start, end, score change, member left.
///
/// Routed to **every** member of `room_id`, including the sender.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GameState {
    #[prost(string, tag = "1")]
    pub room_id: String,
    #[prost(enumeration = "MatchPhase", tag = "2")]
    pub phase: i32,
    #[prost(uint32, tag = "3")]
    pub score_a: u32,
    #[prost(uint32, tag = "4")]
    pub score_b: u32,
}

/// Continuous simulated-object state (puck, striker positions).
///
/// Routed to every member of `room_id` **except** the sender — the
/// sender already knows where its own entities are.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EntityState {
    #[prost(string, tag = "1")]
    pub room_id: String,
    #[prost(uint32, tag = "2")]
    pub entity_id: u32,
    #[prost(float, tag = "3")]
    pub x: f32,
    #[prost(float, tag = "4")]
    pub y: f32,
    #[prost(float, tag = "5")]
    pub dx: f32,
    #[prost(float, tag = "6")]
    pub dy: f32,
}

/// A guest's control input.
///
/// Routed to exactly one player: the host of `room_id`, who is the
/// authoritative simulator for the match.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PlayerInput {
    #[prost(string, tag = "1")]
    pub room_id: String,
    #[prost(float, tag = "2")]
    pub x: f32,
    #[prost(float, tag = "3")]
    pub y: f32,
}

/// Empty liveness/handshake message. The server acknowledges it back
/// to the sender's own mailbox.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Handshake {}

/// The action carried by a [`GameMessage`].
///
/// Tags 2–5; tag 1 of the enclosing message is the sender. New kinds
/// get fresh tags — old servers drop what they don't recognize, which
/// is the routing table's "unknown kind" row, not an error.
#[derive(Clone, PartialEq, prost::Oneof)]
pub enum Action {
    #[prost(message, tag = "2")]
    GameState(GameState),
    #[prost(message, tag = "3")]
    EntityState(EntityState),
    #[prost(message, tag = "4")]
    PlayerInput(PlayerInput),
    #[prost(message, tag = "5")]
    Handshake(Handshake),
}

/// One message on the bidirectional game stream.
///
/// Immutable once constructed; every routing decision is made exactly
/// once, at receipt. `action` is optional on the wire (a peer speaking
/// a newer schema may send a kind this build doesn't know), and an
/// absent action is dropped by the router.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GameMessage {
    /// The player ID of whoever sent this message.
    #[prost(string, tag = "1")]
    pub sender: String,
    #[prost(oneof = "Action", tags = "2, 3, 4, 5")]
    pub action: Option<Action>,
}

impl GameMessage {
    /// The room this message should be routed within, if its kind
    /// carries one. `Handshake` is sender-addressed and has no room.
    pub fn room_id(&self) -> Option<&str> {
        match &self.action {
            Some(Action::GameState(g)) => Some(&g.room_id),
            Some(Action::EntityState(e)) => Some(&e.room_id),
            Some(Action::PlayerInput(i)) => Some(&i.room_id),
            Some(Action::Handshake(_)) | None => None,
        }
    }

    /// Short kind name for log lines.
    pub fn kind(&self) -> &'static str {
        match &self.action {
            Some(Action::GameState(_)) => "game_state",
            Some(Action::EntityState(_)) => "entity_state",
            Some(Action::PlayerInput(_)) => "player_input",
            Some(Action::Handshake(_)) => "handshake",
            None => "none",
        }
    }

    /// A handshake message from `sender`.
    pub fn handshake(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            action: Some(Action::Handshake(Handshake {})),
        }
    }
}

// ---------------------------------------------------------------------------
// Skins
// ---------------------------------------------------------------------------

/// The three cosmetic slots a player owns skins for.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    prost::Enumeration,
)]
#[repr(i32)]
pub enum SkinKind {
    Puck = 0,
    Striker = 1,
    Table = 2,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The wire format is field-number versioned; these tests pin the
    //! shapes we promise to clients, because a tag change breaks every
    //! already-shipped client build.

    use prost::Message;

    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_player_id_display_is_raw_string() {
        let id = PlayerId::from("ab12");
        assert_eq!(id.to_string(), "ab12");
        assert_eq!(id.as_str(), "ab12");
    }

    #[test]
    fn test_room_id_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(RoomId::from("r1"), 1);
        map.insert(RoomId::from("r2"), 2);
        assert_eq!(map[&RoomId::from("r1")], 1);
    }

    // =====================================================================
    // GameMessage round trips, one per action kind
    // =====================================================================

    #[test]
    fn test_game_message_game_state_round_trip() {
        let msg = GameMessage {
            sender: "host".into(),
            action: Some(Action::GameState(GameState {
                room_id: "room-1".into(),
                phase: MatchPhase::Playing as i32,
                score_a: 3,
                score_b: 1,
            })),
        };
        let bytes = msg.encode_to_vec();
        let decoded = GameMessage::decode(bytes.as_slice()).unwrap();
        assert_eq!(msg, decoded);
        assert_eq!(decoded.kind(), "game_state");
        assert_eq!(decoded.room_id(), Some("room-1"));
    }

    #[test]
    fn test_game_message_entity_state_round_trip() {
        let msg = GameMessage {
            sender: "guest".into(),
            action: Some(Action::EntityState(EntityState {
                room_id: "room-1".into(),
                entity_id: 7,
                x: 0.5,
                y: -1.25,
                dx: 0.0,
                dy: 2.0,
            })),
        };
        let decoded =
            GameMessage::decode(msg.encode_to_vec().as_slice()).unwrap();
        assert_eq!(msg, decoded);
        assert_eq!(decoded.kind(), "entity_state");
    }

    #[test]
    fn test_game_message_player_input_round_trip() {
        let msg = GameMessage {
            sender: "guest".into(),
            action: Some(Action::PlayerInput(PlayerInput {
                room_id: "room-9".into(),
                x: 10.0,
                y: 20.0,
            })),
        };
        let decoded =
            GameMessage::decode(msg.encode_to_vec().as_slice()).unwrap();
        assert_eq!(msg, decoded);
        assert_eq!(decoded.room_id(), Some("room-9"));
    }

    #[test]
    fn test_game_message_handshake_has_no_room() {
        let msg = GameMessage::handshake("p1");
        assert_eq!(msg.room_id(), None);
        assert_eq!(msg.kind(), "handshake");
        let decoded =
            GameMessage::decode(msg.encode_to_vec().as_slice()).unwrap();
        assert_eq!(msg, decoded);
    }

    // =====================================================================
    // Schema evolution
    // =====================================================================

    #[test]
    fn test_decode_tolerates_unknown_fields() {
        // A newer peer may append fields under fresh tags. Simulate by
        // appending an unknown varint field (tag 15) to a valid message.
        let msg = GameMessage::handshake("p1");
        let mut bytes = msg.encode_to_vec();
        bytes.extend_from_slice(&[0x78, 0x2a]); // field 15, varint 42
        let decoded = GameMessage::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_decode_unknown_action_kind_yields_none() {
        // An action kind from a future schema version arrives as a tag
        // outside 2..=5. The oneof decodes to a message with whatever
        // known fields were present, and the router treats an absent
        // action as "drop and log".
        let mut bytes = Vec::new();
        // field 1 (sender), string "x"
        bytes.extend_from_slice(&[0x0a, 0x01, b'x']);
        // field 9 (unknown kind), empty message
        bytes.extend_from_slice(&[0x4a, 0x00]);
        let decoded = GameMessage::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.sender, "x");
        assert!(decoded.action.is_none());
        assert_eq!(decoded.kind(), "none");
    }

    #[test]
    fn test_decode_garbage_returns_error() {
        // Truncated/invalid wire data must fail cleanly, not panic.
        let garbage = [0xff, 0xff, 0xff, 0xff];
        assert!(GameMessage::decode(&garbage[..]).is_err());
    }

    // =====================================================================
    // Enumerations
    // =====================================================================

    #[test]
    fn test_match_phase_default_is_lobby() {
        let state = GameState::default();
        assert_eq!(state.phase, MatchPhase::Lobby as i32);
    }

    #[test]
    fn test_skin_kind_values_are_stable() {
        // These discriminants are wire values; reordering the enum
        // would corrupt every stored skin set.
        assert_eq!(SkinKind::Puck as i32, 0);
        assert_eq!(SkinKind::Striker as i32, 1);
        assert_eq!(SkinKind::Table as i32, 2);
    }
}
