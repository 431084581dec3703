//! Unified error type for the Rink server.

use rink_protocol::ProtocolError;
use rink_room::RoomError;
use rink_session::{DirectoryError, RegistryError};
use rink_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `rink` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RinkError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (decode, invalid frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A player-registry error (unknown player, full mailbox).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A room-level error (full, not found, membership).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A directory error (auth, missing record, store down).
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rink_protocol::{PlayerId, RoomId};

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let rink_err: RinkError = err.into();
        assert!(matches!(rink_err, RinkError::Transport(_)));
        assert!(rink_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_registry_error() {
        let err = RegistryError::PlayerNotFound(PlayerId::from("p1"));
        let rink_err: RinkError = err.into();
        assert!(matches!(rink_err, RinkError::Registry(_)));
        assert!(rink_err.to_string().contains("p1"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomId::from("r1"));
        let rink_err: RinkError = err.into();
        assert!(matches!(rink_err, RinkError::Room(_)));
    }

    #[test]
    fn test_from_directory_error() {
        let err = DirectoryError::Auth("bad password".into());
        let rink_err: RinkError = err.into();
        assert!(matches!(rink_err, RinkError::Directory(_)));
        assert!(rink_err.to_string().contains("bad password"));
    }
}
