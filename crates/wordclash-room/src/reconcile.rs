//! Disconnect and leave reconciliation.
//!
//! One routine covers both exits: the graceful `leave room` (matched by
//! username in a named room) and the transport's own disconnect signal
//! (matched by connection id, room unknown). A client that leaves and
//! then drops its socket triggers both — the second call finds nothing
//! and is a harmless no-op, which is exactly the contract.

use wordclash_protocol::ServerEvent;

use crate::{Broadcast, PlayerMatcher, RoomStore, StoreError};

/// Removes the matched player from whichever room seats them, then
/// deletes the room if it emptied or tells the remaining connections
/// who left.
///
/// The removal itself (clear votes, reset the round, drop the seat) is
/// one atomic store operation. An empty room never survives this call:
/// nothing can join a zero-player room in the window before `delete`,
/// because matchmaking only targets rooms with exactly one player.
pub async fn reconcile(
    store: &RoomStore,
    matcher: PlayerMatcher,
) -> Vec<Broadcast> {
    match store.remove_player(&matcher).await {
        Ok(departed) => {
            if departed.room.players.is_empty() {
                store.delete(departed.room.room_id).await;
                Vec::new()
            } else {
                vec![Broadcast::to_room(
                    &departed.room,
                    ServerEvent::UserLeft {
                        connection_id: departed.player.connection_id,
                    },
                )]
            }
        }
        // Already reconciled (or never seated): nothing to do.
        Err(StoreError::NoMatch) | Err(StoreError::NotFound(_)) => {
            Vec::new()
        }
        Err(err) => {
            tracing::error!(error = %err, "reconciliation failed");
            Vec::new()
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
