//! The player registry: authoritative map of connected players.
//!
//! One [`PlayerSession`] exists per live player ID at any time. The
//! registry owns the sessions and their mailboxes; everything else
//! refers to players by opaque [`PlayerId`] and resolves through here.
//!
//! ## Lifecycle
//!
//! ```text
//! register() ──→ [live] ──→ deregister() ──→ gone
//!     │            ▲
//!     └────────────┘  re-register under the same ID replaces the
//!                     session (reconnect-replaces-session policy)
//! ```
//!
//! Replacement is deliberate, not an accident of map overwrite: the
//! prior session's mailbox is closed and anything still queued in it
//! is discarded. A client that reconnects gets a clean slate; this is
//! the documented at-most-once delivery weakening.

use std::collections::HashMap;
use std::sync::Arc;

use rink_protocol::{GameMessage, PlayerId};

use crate::{Delivery, Mailbox, OverflowPolicy, RegistryError};

/// Configuration for player sessions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionConfig {
    /// Mailbox capacity in messages.
    pub mailbox_capacity: usize,

    /// What to do when a mailbox is full.
    #[serde(skip)]
    pub overflow: OverflowPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 100,
            overflow: OverflowPolicy::DropOldest,
        }
    }
}

/// A single connected player's session record.
pub struct PlayerSession {
    /// Which player this session belongs to.
    pub player_id: PlayerId,

    /// Display name, as supplied at registration (login).
    pub name: String,

    /// The outbound mailbox, shared with the owning connection's
    /// dispatch loop. Its open/closed flag is the session's liveness
    /// flag.
    pub mailbox: Arc<Mailbox>,
}

impl PlayerSession {
    /// `false` once teardown has begun — no further deliveries land.
    pub fn is_live(&self) -> bool {
        self.mailbox.is_open()
    }
}

/// Authoritative mapping of player ID → session.
///
/// Not internally synchronized; the hub guards it (together with the
/// room registry) behind one readers-writer lock.
pub struct PlayerRegistry {
    sessions: HashMap<PlayerId, PlayerSession>,
    config: SessionConfig,
}

impl PlayerRegistry {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
        }
    }

    /// Inserts or replaces the session for `player_id`.
    ///
    /// Returns the new session's mailbox so the connection can hold a
    /// drain handle without going through the registry again.
    ///
    /// If a session already exists under this ID it is replaced — its
    /// mailbox is closed and queued messages are discarded (counted in
    /// the log line so the loss is observable).
    pub fn register(
        &mut self,
        player_id: PlayerId,
        name: impl Into<String>,
    ) -> Arc<Mailbox> {
        if let Some(old) = self.sessions.remove(&player_id) {
            let discarded = old.mailbox.close();
            tracing::info!(
                %player_id,
                discarded,
                "re-registration replaced a live session"
            );
        }

        let mailbox = Arc::new(Mailbox::new(
            self.config.mailbox_capacity,
            self.config.overflow,
        ));
        let session = PlayerSession {
            player_id: player_id.clone(),
            name: name.into(),
            mailbox: Arc::clone(&mailbox),
        };
        self.sessions.insert(player_id.clone(), session);
        tracing::info!(%player_id, "player registered");
        mailbox
    }

    /// `true` if a session exists for this player.
    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.sessions.contains_key(player_id)
    }

    /// Looks up a session by player ID.
    pub fn get(&self, player_id: &PlayerId) -> Option<&PlayerSession> {
        self.sessions.get(player_id)
    }

    /// Returns a drain handle to a player's mailbox.
    pub fn mailbox(&self, player_id: &PlayerId) -> Option<Arc<Mailbox>> {
        self.sessions
            .get(player_id)
            .map(|s| Arc::clone(&s.mailbox))
    }

    /// Removes a player's session and closes their mailbox.
    ///
    /// # Errors
    /// [`RegistryError::PlayerNotFound`] if no session exists; in that
    /// case nothing is modified (deregistration is idempotent in
    /// effect).
    pub fn deregister(
        &mut self,
        player_id: &PlayerId,
    ) -> Result<(), RegistryError> {
        let session = self
            .sessions
            .remove(player_id)
            .ok_or_else(|| {
                RegistryError::PlayerNotFound(player_id.clone())
            })?;
        let discarded = session.mailbox.close();
        tracing::info!(%player_id, discarded, "player deregistered");
        Ok(())
    }

    /// Appends a message to the target player's mailbox.
    ///
    /// Never blocks: overflow is resolved by the configured policy at
    /// the moment of the call.
    ///
    /// # Errors
    /// - [`RegistryError::PlayerNotFound`] — no session for the target
    /// - [`RegistryError::MailboxFull`] — at capacity under `Reject`
    pub fn enqueue(
        &self,
        player_id: &PlayerId,
        msg: GameMessage,
    ) -> Result<Delivery, RegistryError> {
        let session = self.sessions.get(player_id).ok_or_else(|| {
            RegistryError::PlayerNotFound(player_id.clone())
        })?;
        session.mailbox.enqueue(msg).map_err(|_| {
            RegistryError::MailboxFull(player_id.clone())
        })
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// All registered player IDs (iteration order is arbitrary).
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.sessions.keys().cloned().collect()
    }
}

// =========================================================================
// Tests
// =========================================================================
