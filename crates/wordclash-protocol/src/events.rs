//! The event surface: every message a client may send and every
//! broadcast the server emits.
//!
//! Events are internally tagged — `{"type": "set username", ...}` —
//! with plain spaced names, and payload fields are camelCase; this is
//! the wire shape the game clients consume. Unknown tags and malformed
//! payloads fail to decode and are rejected at the dispatcher boundary
//! before they reach any room operation.

use serde::{Deserialize, Serialize};
use wordclash_transport::ConnectionId;

use crate::types::{Room, RoomId, WordInfo};

/// Everything a connection may ask the server to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Request matchmaking under this name.
    #[serde(rename = "set username")]
    SetUsername { username: String },

    /// Start a round: fetch a word for the room.
    #[serde(rename = "initialize game", rename_all = "camelCase")]
    InitializeGame { room_id: RoomId },

    /// Report a scored guess. `correct_guessed_letters` is how many
    /// letters the guess revealed; the validation itself happened
    /// client-side.
    #[serde(rename = "handle guess", rename_all = "camelCase")]
    HandleGuess {
        room_id: RoomId,
        username: String,
        correct: bool,
        #[serde(default)]
        correct_guessed_letters: u32,
    },

    /// Vote to start another round in the same room.
    #[serde(rename = "play again", rename_all = "camelCase")]
    PlayAgain { room_id: RoomId, username: String },

    /// Graceful departure from a specific room.
    #[serde(rename = "leave room", rename_all = "camelCase")]
    LeaveRoom { room_id: RoomId, username: String },
}

/// Everything the server broadcasts back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// The requested name is already in play somewhere. Sent only to
    /// the requesting connection.
    #[serde(rename = "username taken")]
    UsernameTaken,

    /// A join succeeded; every connection in the room gets the full
    /// player list plus who initialized the room.
    #[serde(rename = "room joined")]
    RoomJoined {
        room: Room,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initializer: Option<String>,
    },

    /// A round started: the word, its meaning, and the room snapshot.
    #[serde(rename = "get word", rename_all = "camelCase")]
    GetWord { word_info: WordInfo, room: Room },

    /// A guess was applied; here is the updated room.
    #[serde(rename = "update scoreboard")]
    UpdateScoreboard { room: Room },

    /// Play-again progress: `wait` after the first vote, `play` once
    /// both players opted in and the room was reset.
    #[serde(rename = "play again")]
    PlayAgain {
        info: PlayAgainInfo,
        room: Room,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initializer: Option<String>,
    },

    /// A player left; remaining connections learn which one.
    #[serde(rename = "user left", rename_all = "camelCase")]
    UserLeft { connection_id: ConnectionId },

    /// Something went wrong that the client should hear about, e.g. a
    /// failed word fetch.
    #[serde(rename = "error")]
    Error { message: String },
}

/// The two phases of the play-again protocol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlayAgainInfo {
    /// One vote recorded, waiting for the other player.
    Wait,
    /// Both voted; the room was reset for a new round.
    Play,
}
