//! Error types for the room layer.

use rink_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
///
/// All of these are returned to the immediate caller (usually as a
/// unary RPC error reply); none of them tears down a stream or
/// affects other rooms.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is full — no more player slots available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player is already in a room. A player is allowed at most
    /// one room at a time.
    #[error("player {0} is already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The player is not a member of this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),
}
