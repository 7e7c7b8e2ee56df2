//! The room store: single source of truth, atomic conditional writes.
//!
//! Connection handlers never share room state directly. They share this
//! store, and every write goes through one of its predicate-gated
//! operations: lock, check, mutate, verify invariants, unlock. If the
//! predicate fails at commit time the caller gets
//! [`StoreError::Conflict`] and decides whether to retry — nothing is
//! ever half-applied.
//!
//! No operation awaits anything while holding the lock, so a slow word
//! fetch on one room never stalls writes to another.

use std::collections::HashMap;

use tokio::sync::Mutex;
use wordclash_protocol::{Player, Room, RoomId, MAX_PLAYERS};
use wordclash_transport::ConnectionId;

use crate::StoreError;

/// Selects the player a removal targets.
///
/// A transport disconnect only knows the connection id; a graceful
/// `leave room` names the room and username explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerMatcher {
    /// Match by connection id, searching every room (ungraceful
    /// disconnect).
    ByConnection(ConnectionId),
    /// Match by username inside a known room (graceful leave).
    ByUsername { room_id: RoomId, username: String },
}

/// The result of a successful [`RoomStore::remove_player`].
#[derive(Debug, Clone)]
pub struct Departed {
    /// The player that was removed.
    pub player: Player,
    /// The room after removal — possibly with zero players left, in
    /// which case the caller is expected to delete it.
    pub room: Room,
}

/// Holds every room record and owns all synchronization over them.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: Mutex<HashMap<RoomId, Room>>,
}

impl RoomStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `room` if its id is unused.
    ///
    /// # Errors
    /// [`StoreError::Conflict`] if a room with this id already exists.
    pub async fn create_if_absent(
        &self,
        room: Room,
    ) -> Result<Room, StoreError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&room.room_id) {
            return Err(StoreError::Conflict(room.room_id));
        }
        verify_invariants(&room)?;
        tracing::info!(room_id = %room.room_id, "room created");
        rooms.insert(room.room_id, room.clone());
        Ok(room)
    }

    /// Returns the earliest-created room with exactly one player.
    ///
    /// "Earliest" is the smallest room id — ids are monotonic, so this
    /// is the documented matchmaking tie-break, not an accident of map
    /// order.
    pub async fn find_open_room(&self) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms
            .values()
            .filter(|room| room.is_open())
            .min_by_key(|room| room.room_id.0)
            .cloned()
    }

    /// Adds `player` to the room, gated on a free seat and a fresh
    /// username.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] — the room vanished
    /// - [`StoreError::Conflict`] — the room filled up, or the
    ///   username is already seated there
    pub async fn conditional_add_player(
        &self,
        room_id: RoomId,
        player: Player,
    ) -> Result<Room, StoreError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(&room_id)
            .ok_or(StoreError::NotFound(room_id))?;

        if room.is_full() || room.has_username(&player.username) {
            return Err(StoreError::Conflict(room_id));
        }

        room.players.push(player);
        verify_invariants(room)?;
        tracing::info!(
            %room_id,
            players = room.players.len(),
            "player joined"
        );
        Ok(room.clone())
    }

    /// Applies `mutation` to the room if `predicate` holds, returning
    /// the mutation's result together with the committed snapshot.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] — the room vanished
    /// - [`StoreError::Conflict`] — the predicate failed at commit time
    pub async fn conditional_update<P, M, R>(
        &self,
        room_id: RoomId,
        predicate: P,
        mutation: M,
    ) -> Result<(R, Room), StoreError>
    where
        P: FnOnce(&Room) -> bool,
        M: FnOnce(&mut Room) -> R,
    {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(&room_id)
            .ok_or(StoreError::NotFound(room_id))?;

        if !predicate(room) {
            return Err(StoreError::Conflict(room_id));
        }

        let result = mutation(room);
        verify_invariants(room)?;
        Ok((result, room.clone()))
    }

    /// Removes the matched player, atomically clearing the room's round
    /// state first: play-again votes, letter count, and the fetch guard
    /// all reset whenever membership changes.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] — the named room vanished
    /// - [`StoreError::NoMatch`] — no stored room holds the player
    pub async fn remove_player(
        &self,
        matcher: &PlayerMatcher,
    ) -> Result<Departed, StoreError> {
        let mut rooms = self.rooms.lock().await;

        let room = match matcher {
            PlayerMatcher::ByConnection(connection_id) => rooms
                .values_mut()
                .find(|room| {
                    room.players
                        .iter()
                        .any(|p| p.connection_id == *connection_id)
                })
                .ok_or(StoreError::NoMatch)?,
            PlayerMatcher::ByUsername { room_id, .. } => rooms
                .get_mut(room_id)
                .ok_or(StoreError::NotFound(*room_id))?,
        };

        let index = room
            .players
            .iter()
            .position(|p| match matcher {
                PlayerMatcher::ByConnection(connection_id) => {
                    p.connection_id == *connection_id
                }
                PlayerMatcher::ByUsername { username, .. } => {
                    p.username == *username
                }
            })
            .ok_or(StoreError::NoMatch)?;

        room.reset_round();
        let player = room.players.remove(index);
        verify_invariants(room)?;

        tracing::info!(
            room_id = %room.room_id,
            username = %player.username,
            remaining = room.players.len(),
            "player removed"
        );
        Ok(Departed {
            player,
            room: room.clone(),
        })
    }

    /// Deletes the room unconditionally. Deleting a missing room is a
    /// no-op.
    pub async fn delete(&self, room_id: RoomId) {
        let mut rooms = self.rooms.lock().await;
        if rooms.remove(&room_id).is_some() {
            tracing::info!(%room_id, "room deleted");
        }
    }

    /// Returns `true` if any room seats a player with this username.
    ///
    /// Uniqueness is enforced per-room by
    /// [`conditional_add_player`](Self::conditional_add_player); this
    /// global scan backs the matchmaker's observable "name already in
    /// play anywhere" rejection.
    pub async fn username_in_play(&self, username: &str) -> bool {
        let rooms = self.rooms.lock().await;
        rooms.values().any(|room| room.has_username(username))
    }

    /// A point-in-time copy of one room.
    pub async fn snapshot(&self, room_id: RoomId) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(&room_id).cloned()
    }

    /// A point-in-time copy of every room.
    pub async fn all_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        rooms.values().cloned().collect()
    }

    /// Number of stored rooms.
    pub async fn room_count(&self) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.len()
    }
}

/// Checks the data-model invariants after a mutation, before the lock
/// is released. A failure here is a caller bug, not a race.
fn verify_invariants(room: &Room) -> Result<(), StoreError> {
    if room.players.len() > MAX_PLAYERS {
        return Err(StoreError::InvariantViolation(format!(
            "{} holds {} players",
            room.room_id,
            room.players.len()
        )));
    }

    for (i, player) in room.players.iter().enumerate() {
        if room.players[i + 1..]
            .iter()
            .any(|other| other.username == player.username)
        {
            return Err(StoreError::InvariantViolation(format!(
                "{} has duplicate username {:?}",
                room.room_id, player.username
            )));
        }
    }

    if let Some(vote) = room
        .play_again_votes
        .iter()
        .find(|vote| !room.has_username(vote))
    {
        return Err(StoreError::InvariantViolation(format!(
            "{} has vote from non-member {vote:?}",
            room.room_id
        )));
    }

    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
