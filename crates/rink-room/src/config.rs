//! Room configuration.

use serde::{Deserialize, Serialize};

/// Settings applied to a room at creation time.
///
/// `create_room` takes explicit values; the registry falls back to
/// these defaults when it has to create a room on a caller's behalf
/// (the empty-room-ID join path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum players allowed in the room.
    pub max_players: usize,

    /// Score at which a match in this room ends.
    pub target_score: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 2,
            target_score: 5,
        }
    }
}
