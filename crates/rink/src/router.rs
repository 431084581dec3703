//! Message routing: who receives which stream message.
//!
//! The routing table, by message kind:
//!
//! | kind          | targets                                  |
//! |---------------|------------------------------------------|
//! | `GameState`   | every member of the room                 |
//! | `EntityState` | every member of the room except the sender |
//! | `PlayerInput` | the room's host, only                    |
//! | `Handshake`   | ack back to the sender                   |
//! | absent/unknown| dropped                                  |
//!
//! Routing is a pure function over the two registries: it enumerates
//! targets and appends to mailboxes, nothing else. An unresolvable
//! room, a dead target session, or a rejected enqueue drops that
//! single delivery with a warning; the sender's stream never learns
//! about it and the remaining targets still receive theirs. The caller
//! holds the hub lock for the duration, so the member list and the
//! mailboxes it resolves are one consistent snapshot.

use rink_protocol::{Action, GameMessage, PlayerId, RoomId};
use rink_session::RegistryError;

use crate::hub::HubState;

/// What happened to one routed message.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouteSummary {
    /// Deliveries appended to a mailbox.
    pub delivered: u64,
    /// Deliveries that could not be made (dead room, missing session,
    /// rejected enqueue).
    pub dropped: u64,
}

/// Routes `msg` to its targets per the table above.
pub fn route(msg: &GameMessage, state: &HubState) -> RouteSummary {
    let mut summary = RouteSummary::default();
    let sender = PlayerId::from(msg.sender.as_str());

    match &msg.action {
        Some(Action::GameState(_)) => {
            fan_out(msg, state, &mut summary, |_| true);
        }
        Some(Action::EntityState(_)) => {
            fan_out(msg, state, &mut summary, |m| m != &sender);
        }
        Some(Action::PlayerInput(_)) => {
            route_to_host(msg, state, &mut summary);
        }
        Some(Action::Handshake(_)) => {
            deliver(msg.clone(), &sender, state, &mut summary);
        }
        None => {
            tracing::warn!(
                sender = %msg.sender,
                "dropping message with no recognized action"
            );
            summary.dropped += 1;
        }
    }
    summary
}

/// Delivers to every room member passing `include`.
fn fan_out(
    msg: &GameMessage,
    state: &HubState,
    summary: &mut RouteSummary,
    include: impl Fn(&PlayerId) -> bool,
) {
    let Some(room_id) = msg.room_id() else {
        return drop_no_room(msg, summary);
    };
    let room_id = RoomId::from(room_id);

    let members = match state.rooms.members(&room_id) {
        Ok(members) => members,
        Err(_) => {
            tracing::warn!(
                kind = msg.kind(),
                sender = %msg.sender,
                %room_id,
                "dropping message for unknown room"
            );
            summary.dropped += 1;
            return;
        }
    };

    // members() hands back a borrow into the same locked state we
    // enqueue through, so collect the targets first.
    let targets: Vec<PlayerId> =
        members.iter().filter(|m| include(m)).cloned().collect();
    for target in &targets {
        deliver(msg.clone(), target, state, summary);
    }
}

/// Delivers to the room's host, the match's authoritative simulator.
fn route_to_host(
    msg: &GameMessage,
    state: &HubState,
    summary: &mut RouteSummary,
) {
    let Some(room_id) = msg.room_id() else {
        return drop_no_room(msg, summary);
    };
    let room_id = RoomId::from(room_id);

    match state.rooms.host_of(&room_id) {
        Ok(host) => deliver(msg.clone(), &host, state, summary),
        Err(_) => {
            tracing::warn!(
                sender = %msg.sender,
                %room_id,
                "dropping input for unknown room"
            );
            summary.dropped += 1;
        }
    }
}

fn deliver(
    msg: GameMessage,
    target: &PlayerId,
    state: &HubState,
    summary: &mut RouteSummary,
) {
    match state.players.enqueue(target, msg) {
        Ok(_) => summary.delivered += 1,
        Err(RegistryError::PlayerNotFound(_)) => {
            tracing::warn!(%target, "dropping delivery to missing session");
            summary.dropped += 1;
        }
        Err(RegistryError::MailboxFull(_)) => {
            tracing::warn!(%target, "dropping delivery to full mailbox");
            summary.dropped += 1;
        }
    }
}

fn drop_no_room(msg: &GameMessage, summary: &mut RouteSummary) {
    tracing::warn!(
        kind = msg.kind(),
        sender = %msg.sender,
        "dropping room-scoped message without a room id"
    );
    summary.dropped += 1;
}

// =========================================================================
// Tests
// =========================================================================
