//! Transport abstraction layer for Rink.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract
//! over the underlying network protocol, plus the WebSocket
//! implementation used in production.
//!
//! A connection here is message-framed and *splittable*: the session
//! engine runs a dedicated inbound task that owns the receive half
//! while the dispatch loop writes to the send half, so the two
//! directions must not be serialized behind one lock. That's why
//! [`Connection::into_split`] consumes the connection and hands back
//! independently owned halves.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    WebSocketConnection, WebSocketSink, WebSocketSource, WebSocketTransport,
};

use std::fmt;
use std::future::Future;

/// Opaque identifier for a connection, used only for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
///
/// The methods here (and on the connection-half traits below) return
/// `impl Future + Send` rather than being plain `async fn`s: callers
/// hold them across `tokio::spawn`, so the futures must be provably
/// `Send` for generic implementations, not just the shipped WebSocket
/// one.
pub trait Transport: Send + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// A single accepted, message-framed connection.
pub trait Connection: Send + 'static {
    /// The outbound (write) half.
    type Sink: MessageSink;
    /// The inbound (read) half.
    type Source: MessageSource;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Splits the connection into independently owned halves so reads
    /// and writes can proceed concurrently.
    fn into_split(self) -> (Self::Sink, Self::Source);
}

/// The write half of a connection.
pub trait MessageSink: Send + 'static {
    /// Sends one message to the remote peer.
    fn send(
        &mut self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Closes the connection gracefully.
    fn close(
        &mut self,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// The read half of a connection.
pub trait MessageSource: Send + 'static {
    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the peer closed the stream cleanly
    /// (end-of-stream); `Err` for transport failures.
    fn recv(
        &mut self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;
}
