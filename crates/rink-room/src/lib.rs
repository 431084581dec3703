//! Room membership for Rink.
//!
//! A room is a lightweight record: an ID, a host, a member list, and
//! a capacity. Rooms carry no game logic and run no tasks of their
//! own — the engine routes messages between members, and the clients
//! simulate the match. What this crate enforces is the membership
//! rules:
//!
//! - a player is in at most one room at a time
//! - `members.len()` never exceeds the room's capacity
//! - the host is always a member while the room exists
//! - a room with zero members does not exist
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates rooms, joins/removes players
//! - [`Room`] — one room's membership record
//! - [`RoomConfig`] — capacity and target score defaults
//!
//! Like the player registry, [`RoomRegistry`] is a plain struct with
//! no internal locking; the hub guards both registries behind a single
//! readers-writer lock so membership reads and mailbox fan-out see one
//! consistent snapshot.

mod config;
mod error;
mod registry;

pub use config::RoomConfig;
pub use error::RoomError;
pub use registry::{Room, RoomRegistry};
