//! Persistent-side records served by a [`Directory`](crate::Directory).
//!
//! These are storage-facing shapes, separate from the wire messages in
//! `rink-protocol`; the RPC layer converts between the two at the edge.

use rink_protocol::{PlayerId, SkinKind};

/// An account profile as the directory stores it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerProfile {
    pub player_id: PlayerId,
    pub name: String,
    /// Soft currency balance.
    pub cash: i64,
    /// Ladder rank points.
    pub rank: i64,
}

/// Outcome of one finished match, submitted by the host.
///
/// Teams are lists of display names; air hockey is 1v1 today but the
/// record shape already fits doubles.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchRecord {
    /// Millisecond UNIX timestamp of match end.
    pub recorded_at: u64,
    pub team_a: Vec<String>,
    pub team_b: Vec<String>,
    pub score_a: u32,
    pub score_b: u32,
}

/// One row of the ranking ladder.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RankEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub rank: i64,
}

/// Cosmetics a player owns, one ID list per slot.
#[derive(
    Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize,
)]
pub struct SkinSet {
    pub puck: Vec<u32>,
    pub striker: Vec<u32>,
    pub table: Vec<u32>,
}

impl SkinSet {
    /// Adds a skin to the slot for `kind`, ignoring duplicates.
    pub fn add(&mut self, kind: SkinKind, skin_id: u32) {
        let slot = match kind {
            SkinKind::Puck => &mut self.puck,
            SkinKind::Striker => &mut self.striker,
            SkinKind::Table => &mut self.table,
        };
        if !slot.contains(&skin_id) {
            slot.push(skin_id);
        }
    }
}
