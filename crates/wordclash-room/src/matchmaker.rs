//! Matchmaking: find an open room or create one, without ever
//! overfilling.
//!
//! The algorithm leans entirely on the store's conditional operations:
//! the lookup and the join are separate steps, so two connections can
//! race for the same last seat — the loser gets a `Conflict` and simply
//! tries again. A freshly created room is never contended (its id is
//! new), so the retry loop is bounded.

use std::sync::atomic::{AtomicU64, Ordering};

use wordclash_protocol::{Player, Room, RoomId};
use wordclash_transport::ConnectionId;

use crate::{RoomStore, StoreError};

/// Counter for generating room IDs. Monotonic, so ids double as
/// creation order.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// Join attempts against open rooms before giving up and creating a
/// fresh one.
const MAX_JOIN_ATTEMPTS: usize = 3;

/// What matchmaking decided for one `set username` request.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The name is already in play somewhere; nothing was mutated.
    UsernameTaken,
    /// The player is seated. `is_initializer` is true when a new room
    /// was created for them.
    Joined { room: Room, is_initializer: bool },
}

/// Seats `username` in the earliest open room, or a new one.
///
/// Username uniqueness is checked globally first — a name already in
/// play anywhere is rejected even though the store only enforces
/// per-room uniqueness. The scan and the join are not atomic with each
/// other; the per-room predicate is what actually protects the room.
///
/// # Errors
/// Only [`StoreError::InvariantViolation`] can escape; conflicts are
/// consumed by the retry loop.
pub async fn request_match(
    store: &RoomStore,
    username: &str,
    connection_id: ConnectionId,
) -> Result<MatchOutcome, StoreError> {
    if store.username_in_play(username).await {
        tracing::debug!(username, "username already in play");
        return Ok(MatchOutcome::UsernameTaken);
    }

    for _ in 0..MAX_JOIN_ATTEMPTS {
        let Some(open) = store.find_open_room().await else {
            break;
        };

        match store
            .conditional_add_player(
                open.room_id,
                Player::new(connection_id, username),
            )
            .await
        {
            Ok(room) => {
                return Ok(MatchOutcome::Joined {
                    room,
                    is_initializer: false,
                });
            }
            // Lost the race for the last seat, or the room vanished
            // under us: look again.
            Err(StoreError::Conflict(room_id)) => {
                tracing::debug!(
                    %room_id,
                    username,
                    "open room filled first, retrying"
                );
            }
            Err(StoreError::NotFound(_)) => {}
            Err(err) => return Err(err),
        }
    }

    // No open room (or too much contention): create one with this
    // player as the sole occupant and initializer. The store, not the
    // counter, is the authority on id uniqueness.
    loop {
        let room_id =
            RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let mut room = Room::new(room_id);
        room.players.push(Player::new(connection_id, username));

        match store.create_if_absent(room).await {
            Ok(room) => {
                return Ok(MatchOutcome::Joined {
                    room,
                    is_initializer: true,
                });
            }
            Err(StoreError::Conflict(_)) => continue,
            Err(err) => return Err(err),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
