//! The session hub: shared state and its lock discipline.
//!
//! Both registries live under ONE `tokio::sync::RwLock`. That is the
//! point, not an accident: the routing path has to enumerate a room's
//! members and then enqueue to each member's mailbox as a single
//! consistent read, and a player leaving concurrently must not be
//! half-visible between the two registries. With one lock there is no
//! lock ordering to get wrong and no window where the registries
//! disagree.
//!
//! Write sections (register, join, leave, disconnect) are short and
//! purely in-memory. Read sections (routing fan-out) never block on a
//! mailbox because enqueue is non-blocking. No I/O and no `.await`
//! happens while the lock is held; directory calls run outside it.
//!
//! The hub is plain dependency-injected state: construct one, wrap it
//! in an `Arc`, hand clones to whoever needs it. Two hubs in one
//! process never interfere, which is what makes the integration tests
//! cheap to parallelize.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rink_protocol::{GameMessage, PlayerId, RoomId};
use rink_room::{RoomConfig, RoomError, RoomRegistry};
use rink_session::{
    Directory, Mailbox, PlayerRegistry, RegistryError, SessionConfig,
};
use tokio::sync::RwLock;

use crate::router;

/// Hub-wide configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HubConfig {
    /// Per-player session settings (mailbox capacity, overflow).
    pub session: SessionConfig,

    /// Defaults for rooms the hub creates on a player's behalf.
    pub room: RoomConfig,

    /// How long a connection may sit idle before it is treated as
    /// ended.
    pub idle_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            room: RoomConfig::default(),
            idle_timeout: Duration::from_secs(30),
        }
    }
}

/// Everything guarded by the hub lock.
pub struct HubState {
    pub players: PlayerRegistry,
    pub rooms: RoomRegistry,
}

/// Shared server state: the two registries under one lock, plus the
/// injected directory and a couple of observability counters.
pub struct SessionHub<D: Directory> {
    state: RwLock<HubState>,
    directory: D,
    config: HubConfig,

    /// Deliveries the router dropped (unknown kind, dead room/host,
    /// missing target session).
    routing_drops: AtomicU64,
}

impl<D: Directory> SessionHub<D> {
    pub fn new(config: HubConfig, directory: D) -> Self {
        Self {
            state: RwLock::new(HubState {
                players: PlayerRegistry::new(config.session.clone()),
                rooms: RoomRegistry::new(config.room.clone()),
            }),
            directory,
            config,
            routing_drops: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Total routed deliveries dropped since startup.
    pub fn routing_drops(&self) -> u64 {
        self.routing_drops.load(Ordering::Relaxed)
    }

    /// Registers a player (or replaces their live session) and returns
    /// the new session's mailbox.
    pub async fn register_player(
        &self,
        player_id: PlayerId,
        name: impl Into<String>,
    ) -> Arc<Mailbox> {
        let mut state = self.state.write().await;
        state.players.register(player_id, name)
    }

    /// Adds a player to a room; `None` asks the hub to pick one (first
    /// room with a free slot, else a fresh room with this player as
    /// host).
    pub async fn join_room(
        &self,
        player_id: PlayerId,
        room_id: Option<RoomId>,
    ) -> Result<RoomId, RoomError> {
        let mut state = self.state.write().await;
        state.rooms.join(player_id, room_id)
    }

    /// Creates a room with the given host and settings.
    pub async fn create_room(
        &self,
        host: PlayerId,
        max_players: usize,
        target_score: u32,
    ) -> Result<RoomId, RoomError> {
        let mut state = self.state.write().await;
        state.rooms.create_room(host, max_players, target_score)
    }

    /// Removes a player from a room, migrating the host or destroying
    /// the room as membership dictates.
    pub async fn leave_room(
        &self,
        player_id: &PlayerId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        let mut state = self.state.write().await;
        state.rooms.leave(player_id, room_id)
    }

    /// A room's current members.
    pub async fn room_members(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<PlayerId>, RoomError> {
        let state = self.state.read().await;
        state.rooms.members(room_id).map(<[PlayerId]>::to_vec)
    }

    /// Full teardown for a departing player: leave their room (if any)
    /// and deregister their session. Used by the per-connection
    /// cleanup; both halves are best-effort because a reconnect may
    /// already have replaced the session.
    pub async fn disconnect(&self, player_id: &PlayerId) {
        let mut state = self.state.write().await;
        cleanup_locked(&mut state, player_id);
    }

    /// Teardown for a specific connection's session. No-op if the
    /// registered session is no longer `mailbox` — that means a
    /// reconnect already replaced this connection, and the replacement
    /// (still in its room, still live) must not be torn down by the
    /// stale connection's cleanup. Checked and applied under one write
    /// section so a reconnect can't slip in between.
    pub async fn disconnect_session(
        &self,
        player_id: &PlayerId,
        mailbox: &Arc<Mailbox>,
    ) {
        let mut state = self.state.write().await;
        match state.players.mailbox(player_id) {
            Some(current) if Arc::ptr_eq(&current, mailbox) => {}
            _ => {
                tracing::debug!(
                    %player_id,
                    "skipping cleanup, session was replaced"
                );
                return;
            }
        }
        cleanup_locked(&mut state, player_id);
    }

    /// Routes one game message to its targets' mailboxes.
    ///
    /// Takes the read lock only: enumeration and enqueue are both
    /// non-blocking, so concurrent streams route in parallel. Dropped
    /// deliveries are counted, never surfaced to the sender.
    pub async fn route(&self, msg: GameMessage) {
        let state = self.state.read().await;
        let summary = router::route(&msg, &state);
        if summary.dropped > 0 {
            self.routing_drops
                .fetch_add(summary.dropped, Ordering::Relaxed);
        }
    }

    /// Runs `f` with the read lock held. Test and RPC hook for
    /// one-off consistent reads.
    pub async fn with_state<R>(
        &self,
        f: impl FnOnce(&HubState) -> R,
    ) -> R {
        let state = self.state.read().await;
        f(&state)
    }
}

/// Leave-room plus deregister, under an already-held write section.
fn cleanup_locked(state: &mut HubState, player_id: &PlayerId) {
    if let Some(room_id) = state.rooms.room_of(player_id) {
        if let Err(e) = state.rooms.leave(player_id, &room_id) {
            tracing::debug!(%player_id, error = %e, "room cleanup failed");
        }
    }
    match state.players.deregister(player_id) {
        Ok(()) => {}
        Err(RegistryError::PlayerNotFound(_)) => {
            tracing::debug!(%player_id, "already deregistered");
        }
        Err(e) => {
            tracing::debug!(%player_id, error = %e, "session cleanup failed");
        }
    }
}
