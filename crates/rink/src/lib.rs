//! # Rink
//!
//! Session backbone for real-time multiplayer games where the clients
//! simulate the match and the server relays: it keeps persistent
//! bidirectional streams, tracks who is connected and which room they
//! are in, and routes every stream message by kind and by the
//! sender's role (host or guest). Account, record, ranking, and skin
//! calls ride the same connection as unary request/response frames.
//!
//! The server never inspects game payloads beyond their routing
//! fields. One member per room — the host — runs the authoritative
//! simulation; everyone else sends inputs and renders what the host
//! publishes.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use rink::{MemoryDirectory, RinkServerBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rink::RinkError> {
//!     tracing_subscriber::fmt::init();
//!     let server = RinkServerBuilder::new()
//!         .bind("0.0.0.0:8080")
//!         .build(MemoryDirectory::new())
//!         .await?;
//!     server.run().await
//! }
//! ```

mod engine;
mod error;
pub mod hub;
pub mod router;
mod rpc;
mod server;

pub use error::RinkError;
pub use hub::{HubConfig, HubState, SessionHub};
pub use router::RouteSummary;
pub use server::{RinkServer, RinkServerBuilder};

// The pieces a deployment wires together or a client crate needs.
pub use rink_protocol::{
    ClientFrame, GameMessage, PlayerId, RoomId, ServerFrame,
};
pub use rink_room::RoomConfig;
pub use rink_session::{
    Directory, MemoryDirectory, OverflowPolicy, SessionConfig,
};
