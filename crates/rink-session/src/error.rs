//! Error types for the session layer.

use rink_protocol::PlayerId;

/// Errors from player-registry operations.
///
/// Both are recoverable for the caller: a not-found is returned to the
/// immediate caller of the failing call, and a full mailbox is a
/// backpressure signal, never a reason to tear a stream down.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No session exists for the given player.
    #[error("player {0} is not registered")]
    PlayerNotFound(PlayerId),

    /// The target mailbox is at capacity and the overflow policy is
    /// [`Reject`](crate::OverflowPolicy::Reject).
    #[error("mailbox full for player {0}")]
    MailboxFull(PlayerId),
}

/// Errors from the external [`Directory`](crate::Directory)
/// collaborator.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Bad credentials or duplicate registration. Terminal for the
    /// specific call only.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The referenced player/record does not exist in the store.
    #[error("no directory entry for player {0}")]
    NotFound(PlayerId),

    /// The backing store could not be reached or failed mid-operation.
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
