//! Player session management for Rink.
//!
//! This crate owns the server's notion of "who is connected":
//!
//! 1. **Player registry** — the authoritative map from player ID to
//!    session state ([`PlayerRegistry`], [`PlayerSession`])
//! 2. **Mailboxes** — the bounded per-player outbound queue drained by
//!    that player's stream ([`Mailbox`])
//! 3. **Directory** — the narrow seam to the external account / record
//!    / ranking / skin stores ([`Directory`] trait, with
//!    [`MemoryDirectory`] for development and tests)
//!
//! # How it fits in the stack
//!
//! ```text
//! Engine (above)    ← routes messages into mailboxes, drains its own
//!     ↕
//! Session layer (this crate)  ← player identity + outbound queues
//!     ↕
//! Protocol layer (below)      ← PlayerId, GameMessage types
//! ```
//!
//! # Concurrency note
//!
//! `PlayerRegistry` is NOT thread-safe by itself — it uses a plain
//! `HashMap`, not a concurrent one. This is intentional: the registry
//! lives inside the hub's readers-writer lock together with the room
//! registry, so that "enumerate a room's members, then enqueue to each"
//! is one critical section. Only the [`Mailbox`] carries its own
//! (per-player) synchronization, because a single mailbox never needs
//! to be serialized against unrelated players.

#![allow(async_fn_in_trait)]

mod directory;
mod error;
mod mailbox;
mod model;
mod registry;

pub use directory::{Directory, MemoryDirectory};
pub use error::{DirectoryError, RegistryError};
pub use mailbox::{Delivery, Mailbox, MailboxFull, OverflowPolicy};
pub use model::{MatchRecord, PlayerProfile, RankEntry, SkinSet};
pub use registry::{PlayerRegistry, PlayerSession, SessionConfig};
