//! Error types for the room layer.

use wordclash_protocol::RoomId;

/// Errors from [`RoomStore`](crate::RoomStore) operations.
///
/// `Conflict` and `NotFound` are part of normal operation under
/// concurrency — callers retry or ignore them. `InvariantViolation`
/// is not: it means a mutation produced a room that breaks the data
/// model, which is a bug in the caller, and it is surfaced rather
/// than repaired.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A conditional operation's predicate failed at commit time —
    /// another connection got there first.
    #[error("conditional update on {0} lost the race")]
    Conflict(RoomId),

    /// The room vanished between read and write.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// No stored room matched the departing player.
    #[error("no room holds the departing player")]
    NoMatch,

    /// A committed mutation would have left the room in a state the
    /// data model forbids.
    #[error("room invariant violated: {0}")]
    InvariantViolation(String),
}
