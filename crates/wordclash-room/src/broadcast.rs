//! Broadcast intents.
//!
//! Room operations do not talk to sockets. They return a list of
//! `Broadcast` values — who should hear what — and the dispatcher
//! delivers them. Recipients are resolved from the room snapshot the
//! operation itself produced, so a room deleted a microsecond later
//! still gets its final `user left` to the right connections.

use wordclash_protocol::{Room, ServerEvent};
use wordclash_transport::ConnectionId;

/// One outbound event and the connections that should receive it.
#[derive(Debug, Clone, PartialEq)]
pub struct Broadcast {
    pub recipients: Vec<ConnectionId>,
    pub event: ServerEvent,
}

impl Broadcast {
    /// Addresses every player currently seated in `room`.
    pub fn to_room(room: &Room, event: ServerEvent) -> Self {
        Self {
            recipients: room.connection_ids(),
            event,
        }
    }

    /// Addresses a single connection.
    pub fn to_connection(
        connection_id: ConnectionId,
        event: ServerEvent,
    ) -> Self {
        Self {
            recipients: vec![connection_id],
            event,
        }
    }
}
