//! The room registry: all live rooms and who is in them.

use std::collections::HashMap;

use rand::Rng;
use rink_protocol::{PlayerId, RoomId};

use crate::{RoomConfig, RoomError};

/// One room's membership record.
///
/// Invariants, maintained by [`RoomRegistry`]:
/// - `members.len() <= max_players`
/// - `host` is always one of `members`
/// - a `Room` with no members is removed from the registry, so an
///   observable room always has at least one member
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,

    /// The authoritative member. The host's client simulates the match
    /// and is the sole receiver of the other members' inputs.
    pub host: PlayerId,

    /// Current members, host included. Order is not meaningful;
    /// removal swaps with the last element.
    pub members: Vec<PlayerId>,

    /// Maximum players allowed in this room.
    pub max_players: usize,

    /// Score at which a match in this room ends.
    pub target_score: u32,
}

impl Room {
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_players
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.members.contains(player_id)
    }
}

/// Tracks every live room and which room each player is in.
///
/// Holds two maps that are kept in sync: `rooms` (the records) and
/// `player_rooms` (the reverse index that makes the one-room-per-player
/// rule O(1) to enforce and disconnect cleanup O(1) to resolve).
///
/// Not internally synchronized; the hub guards it behind its
/// readers-writer lock.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time (key invariant).
    player_rooms: HashMap<PlayerId, RoomId>,

    /// Defaults used when a join has to create a room on the caller's
    /// behalf.
    default_config: RoomConfig,
}

impl RoomRegistry {
    pub fn new(default_config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            default_config,
        }
    }

    /// Creates a new room with `host` as its first member.
    ///
    /// # Errors
    /// [`RoomError::AlreadyInRoom`] if the host is already in a room.
    pub fn create_room(
        &mut self,
        host: PlayerId,
        max_players: usize,
        target_score: u32,
    ) -> Result<RoomId, RoomError> {
        if let Some(existing) = self.player_rooms.get(&host) {
            return Err(RoomError::AlreadyInRoom(host, existing.clone()));
        }

        let room_id = self.fresh_room_id();
        let room = Room {
            id: room_id.clone(),
            host: host.clone(),
            members: vec![host.clone()],
            max_players,
            target_score,
        };
        self.rooms.insert(room_id.clone(), room);
        self.player_rooms.insert(host.clone(), room_id.clone());
        tracing::info!(%room_id, host = %host, "room created");
        Ok(room_id)
    }

    /// Adds a player to a room.
    ///
    /// With `Some(room_id)` the target room must exist and have spare
    /// capacity. With `None` the registry picks for the caller: the
    /// first existing room with a free slot, in iteration order, or a
    /// brand-new room (defaults from [`RoomConfig`], the joiner as
    /// host) when every room is full or none exists. Either way the
    /// resolved room ID is returned.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`] — the player is in a room already
    /// - [`RoomError::NotFound`] — explicit `room_id` does not exist
    /// - [`RoomError::RoomFull`] — explicit `room_id` has no free slot
    pub fn join(
        &mut self,
        player_id: PlayerId,
        room_id: Option<RoomId>,
    ) -> Result<RoomId, RoomError> {
        if let Some(existing) = self.player_rooms.get(&player_id) {
            return Err(RoomError::AlreadyInRoom(
                player_id,
                existing.clone(),
            ));
        }

        let room_id = match room_id {
            Some(room_id) => {
                let room = self
                    .rooms
                    .get_mut(&room_id)
                    .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
                if room.is_full() {
                    return Err(RoomError::RoomFull(room_id));
                }
                room.members.push(player_id.clone());
                room_id
            }
            None => match self.first_open_room() {
                Some(room_id) => {
                    // first_open_room only returns rooms with a free
                    // slot, so this push respects max_players
                    let room = self.rooms.get_mut(&room_id).unwrap();
                    room.members.push(player_id.clone());
                    room_id
                }
                None => {
                    let config = self.default_config.clone();
                    return self.create_room(
                        player_id,
                        config.max_players,
                        config.target_score,
                    );
                }
            },
        };

        self.player_rooms
            .insert(player_id.clone(), room_id.clone());
        tracing::info!(%room_id, %player_id, "player joined room");
        Ok(room_id)
    }

    /// Removes a player from a room.
    ///
    /// If the host leaves and members remain, the first remaining
    /// member becomes the new host. If the last member leaves, the
    /// room is destroyed.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] — no such room
    /// - [`RoomError::NotInRoom`] — the player is not a member
    pub fn leave(
        &mut self,
        player_id: &PlayerId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let index = room
            .members
            .iter()
            .position(|m| m == player_id)
            .ok_or_else(|| {
                RoomError::NotInRoom(player_id.clone(), room_id.clone())
            })?;
        room.members.swap_remove(index);
        self.player_rooms.remove(player_id);

        if room.members.is_empty() {
            self.rooms.remove(room_id);
            tracing::info!(%room_id, %player_id, "last player left, room destroyed");
            return Ok(());
        }

        if &room.host == player_id {
            room.host = room.members[0].clone();
            tracing::info!(
                %room_id,
                old_host = %player_id,
                new_host = %room.host,
                "host left, host migrated"
            );
        } else {
            tracing::info!(%room_id, %player_id, "player left room");
        }
        Ok(())
    }

    /// Returns the host of a room.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room does not exist.
    pub fn host_of(&self, room_id: &RoomId) -> Result<PlayerId, RoomError> {
        self.rooms
            .get(room_id)
            .map(|r| r.host.clone())
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Returns a room's current members.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room does not exist.
    pub fn members(
        &self,
        room_id: &RoomId,
    ) -> Result<&[PlayerId], RoomError> {
        self.rooms
            .get(room_id)
            .map(|r| r.members.as_slice())
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Returns the room a player is currently in, if any.
    pub fn room_of(&self, player_id: &PlayerId) -> Option<RoomId> {
        self.player_rooms.get(player_id).cloned()
    }

    /// Looks up a room record.
    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// First room with a free slot, in map iteration order.
    fn first_open_room(&self) -> Option<RoomId> {
        self.rooms
            .values()
            .find(|r| !r.is_full())
            .map(|r| r.id.clone())
    }

    /// 128 random bits as 32 lowercase hex chars, re-rolled on the
    /// (astronomically unlikely) collision with a live room.
    fn fresh_room_id(&self) -> RoomId {
        loop {
            let mut rng = rand::rng();
            let bytes: [u8; 16] = rng.random();
            let id = RoomId::from(
                bytes
                    .iter()
                    .map(|b| format!("{b:02x}"))
                    .collect::<String>(),
            );
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    // =====================================================================
    // create_room()
    // =====================================================================

    #[test]
    fn test_create_room_seeds_membership_with_host() {
        let mut reg = RoomRegistry::default();

        let room_id = reg.create_room(pid("host"), 2, 5).unwrap();

        assert_eq!(room_id.as_str().len(), 32);
        assert_eq!(reg.host_of(&room_id).unwrap(), pid("host"));
        assert_eq!(reg.members(&room_id).unwrap(), &[pid("host")]);
        assert_eq!(reg.room_of(&pid("host")), Some(room_id));
    }

    #[test]
    fn test_create_room_host_already_in_room_errors() {
        let mut reg = RoomRegistry::default();
        let first = reg.create_room(pid("host"), 2, 5).unwrap();

        let result = reg.create_room(pid("host"), 2, 5);

        assert!(matches!(
            result,
            Err(RoomError::AlreadyInRoom(p, r)) if p == pid("host") && r == first
        ));
        assert_eq!(reg.room_count(), 1);
    }

    // =====================================================================
    // join() — explicit room ID
    // =====================================================================

    #[test]
    fn test_join_explicit_room_adds_member() {
        let mut reg = RoomRegistry::default();
        let room_id = reg.create_room(pid("host"), 2, 5).unwrap();

        let resolved =
            reg.join(pid("guest"), Some(room_id.clone())).unwrap();

        assert_eq!(resolved, room_id);
        assert_eq!(
            reg.members(&room_id).unwrap(),
            &[pid("host"), pid("guest")]
        );
        // Joining never changes the host.
        assert_eq!(reg.host_of(&room_id).unwrap(), pid("host"));
    }

    #[test]
    fn test_join_unknown_room_errors_not_found() {
        let mut reg = RoomRegistry::default();

        let result = reg.join(pid("p"), Some(RoomId::from("nope")));

        assert!(matches!(result, Err(RoomError::NotFound(_))));
        assert_eq!(reg.room_of(&pid("p")), None);
    }

    #[test]
    fn test_join_full_room_errors_room_full() {
        let mut reg = RoomRegistry::default();
        let room_id = reg.create_room(pid("host"), 2, 5).unwrap();
        reg.join(pid("guest"), Some(room_id.clone())).unwrap();

        let result = reg.join(pid("third"), Some(room_id.clone()));

        assert!(matches!(result, Err(RoomError::RoomFull(_))));
        assert_eq!(reg.members(&room_id).unwrap().len(), 2);
        assert_eq!(reg.room_of(&pid("third")), None);
    }

    #[test]
    fn test_join_while_in_another_room_errors() {
        let mut reg = RoomRegistry::default();
        let first = reg.create_room(pid("host"), 2, 5).unwrap();
        let second = reg.create_room(pid("other"), 2, 5).unwrap();
        reg.join(pid("guest"), Some(first.clone())).unwrap();

        let result = reg.join(pid("guest"), Some(second));

        assert!(matches!(
            result,
            Err(RoomError::AlreadyInRoom(p, r)) if p == pid("guest") && r == first
        ));
    }

    // =====================================================================
    // join() — matchmaking (no room ID)
    // =====================================================================

    #[test]
    fn test_join_without_room_id_joins_open_room() {
        let mut reg = RoomRegistry::default();
        let room_id = reg.create_room(pid("host"), 2, 5).unwrap();

        let resolved = reg.join(pid("guest"), None).unwrap();

        assert_eq!(resolved, room_id);
        assert_eq!(reg.members(&room_id).unwrap().len(), 2);
    }

    #[test]
    fn test_join_without_room_id_no_rooms_creates_one_as_host() {
        let mut reg = RoomRegistry::default();

        let room_id = reg.join(pid("p1"), None).unwrap();

        assert_eq!(reg.room_count(), 1);
        assert_eq!(reg.host_of(&room_id).unwrap(), pid("p1"));
        assert_eq!(reg.members(&room_id).unwrap(), &[pid("p1")]);
        // New room uses the registry defaults.
        let room = reg.get(&room_id).unwrap();
        assert_eq!(room.max_players, 2);
        assert_eq!(room.target_score, 5);
    }

    #[test]
    fn test_join_without_room_id_all_full_creates_new_room() {
        let mut reg = RoomRegistry::default();
        let full = reg.create_room(pid("a"), 2, 5).unwrap();
        reg.join(pid("b"), Some(full.clone())).unwrap();

        let room_id = reg.join(pid("c"), None).unwrap();

        assert_ne!(room_id, full);
        assert_eq!(reg.room_count(), 2);
        assert_eq!(reg.host_of(&room_id).unwrap(), pid("c"));
    }

    // =====================================================================
    // leave()
    // =====================================================================

    #[test]
    fn test_leave_guest_keeps_host() {
        let mut reg = RoomRegistry::default();
        let room_id = reg.create_room(pid("host"), 2, 5).unwrap();
        reg.join(pid("guest"), Some(room_id.clone())).unwrap();

        reg.leave(&pid("guest"), &room_id).unwrap();

        assert_eq!(reg.members(&room_id).unwrap(), &[pid("host")]);
        assert_eq!(reg.host_of(&room_id).unwrap(), pid("host"));
        assert_eq!(reg.room_of(&pid("guest")), None);
    }

    #[test]
    fn test_leave_host_migrates_host_to_remaining_member() {
        let mut reg = RoomRegistry::default();
        let room_id = reg.create_room(pid("host"), 3, 5).unwrap();
        reg.join(pid("g1"), Some(room_id.clone())).unwrap();
        reg.join(pid("g2"), Some(room_id.clone())).unwrap();

        reg.leave(&pid("host"), &room_id).unwrap();

        let new_host = reg.host_of(&room_id).unwrap();
        let members = reg.members(&room_id).unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.contains(&new_host));
        assert_ne!(new_host, pid("host"));
    }

    #[test]
    fn test_leave_last_member_destroys_room() {
        let mut reg = RoomRegistry::default();
        let room_id = reg.create_room(pid("host"), 2, 5).unwrap();

        reg.leave(&pid("host"), &room_id).unwrap();

        assert_eq!(reg.room_count(), 0);
        assert!(matches!(
            reg.host_of(&room_id),
            Err(RoomError::NotFound(_))
        ));
        assert_eq!(reg.room_of(&pid("host")), None);
    }

    #[test]
    fn test_leave_unknown_room_errors_not_found() {
        let mut reg = RoomRegistry::default();

        let result = reg.leave(&pid("p"), &RoomId::from("nope"));

        assert!(matches!(result, Err(RoomError::NotFound(_))));
    }

    #[test]
    fn test_leave_non_member_errors_not_in_room() {
        let mut reg = RoomRegistry::default();
        let room_id = reg.create_room(pid("host"), 2, 5).unwrap();

        let result = reg.leave(&pid("stranger"), &room_id);

        assert!(matches!(result, Err(RoomError::NotInRoom(..))));
        assert_eq!(reg.members(&room_id).unwrap().len(), 1);
    }

    #[test]
    fn test_leave_then_rejoin_same_room_succeeds() {
        let mut reg = RoomRegistry::default();
        let room_id = reg.create_room(pid("host"), 2, 5).unwrap();
        reg.join(pid("guest"), Some(room_id.clone())).unwrap();
        reg.leave(&pid("guest"), &room_id).unwrap();

        let resolved = reg.join(pid("guest"), Some(room_id.clone())).unwrap();

        assert_eq!(resolved, room_id);
        assert_eq!(reg.members(&room_id).unwrap().len(), 2);
    }
}
