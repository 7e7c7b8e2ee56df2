//! Room records and word data as they travel on the wire.
//!
//! Every field serializes camelCase, the shape the game clients
//! consume: a room snapshot looks like
//! `{"roomId":3,"players":[...],"totalLetters":0,"fetchingWord":false,
//! "playAgainVotes":[]}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use wordclash_transport::ConnectionId;

/// Maximum players a room can hold. The whole matchmaking and voting
/// design assumes exactly two seats.
pub const MAX_PLAYERS: usize = 2;

/// A unique identifier for a room.
///
/// Newtype over `u64`. IDs are handed out monotonically, so a smaller
/// id also means an earlier-created room — the matchmaker leans on that
/// for its "earliest open room wins" tie-break.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room-{}", self.0)
    }
}

/// Per-player scoring state for the current round.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Letters guessed correctly this round.
    pub correct_guesses: u32,
    /// Tries left. Signed on purpose: failed guesses decrement with no
    /// floor at this layer — exhaustion semantics live with the guess
    /// validator, not here.
    pub remaining_tries: i32,
}

impl Score {
    /// Tries a player starts each round with.
    pub const INITIAL_TRIES: i32 = 6;

    /// The score every player starts (and resets) with.
    pub fn initial() -> Self {
        Self {
            correct_guesses: 0,
            remaining_tries: Self::INITIAL_TRIES,
        }
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::initial()
    }
}

/// One seat in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// The live connection occupying this seat.
    pub connection_id: ConnectionId,
    /// Unique within the room (and checked globally at matchmaking).
    pub username: String,
    pub score: Score,
}

impl Player {
    /// Creates a player with the initial score.
    pub fn new(
        connection_id: ConnectionId,
        username: impl Into<String>,
    ) -> Self {
        Self {
            connection_id,
            username: username.into(),
            score: Score::initial(),
        }
    }
}

/// A session pairing up to two players around one word-guessing round.
///
/// The player order is meaningful: `players[0]` is the room's
/// initializer (the one who created it), announced to every joiner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: RoomId,
    pub players: Vec<Player>,
    /// Letter count of the current round's word; 0 until a round is
    /// initialized.
    pub total_letters: u32,
    /// True only while a word fetch is outstanding for this room.
    pub fetching_word: bool,
    /// Usernames that opted into another round. At most one entry in
    /// practice — the second distinct vote triggers the reset.
    pub play_again_votes: Vec<String>,
}

impl Room {
    /// Creates an empty room.
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            players: Vec::new(),
            total_letters: 0,
            fetching_word: false,
            play_again_votes: Vec::new(),
        }
    }

    /// An open room has exactly one player and is eligible for
    /// matchmaking.
    pub fn is_open(&self) -> bool {
        self.players.len() == 1
    }

    /// Returns `true` when no seat is left.
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Returns `true` if any player in this room uses `username`.
    pub fn has_username(&self, username: &str) -> bool {
        self.players.iter().any(|p| p.username == username)
    }

    /// Mutable access to the player with the given username.
    pub fn player_mut(&mut self, username: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.username == username)
    }

    /// The username of the player who created the room.
    pub fn initializer(&self) -> Option<&str> {
        self.players.first().map(|p| p.username.as_str())
    }

    /// Connection ids of everyone currently seated.
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.players.iter().map(|p| p.connection_id).collect()
    }

    /// Clears the round: votes, letter count, and the fetch guard.
    ///
    /// Scores are untouched — reconciliation resets the round but keeps
    /// the remaining player's tally.
    pub fn reset_round(&mut self) {
        self.play_again_votes.clear();
        self.total_letters = 0;
        self.fetching_word = false;
    }

    /// Puts every seated player back on the initial score.
    pub fn reset_scores(&mut self) {
        for player in &mut self.players {
            player.score = Score::initial();
        }
    }
}

/// A word and its dictionary meaning, as delivered to a room when a
/// round starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordInfo {
    pub word: String,
    /// May be empty — the meaning lookup is best-effort.
    #[serde(default)]
    pub meaning: Vec<Meaning>,
}

/// One sense block from the dictionary source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

/// A single definition within a meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_room_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&RoomId(99)).unwrap();
        assert_eq!(json, "99");
    }

    #[test]
    fn test_room_id_display() {
        assert_eq!(RoomId(3).to_string(), "room-3");
    }

    #[test]
    fn test_score_initial_is_zero_and_six() {
        let score = Score::initial();
        assert_eq!(score.correct_guesses, 0);
        assert_eq!(score.remaining_tries, 6);
    }

    #[test]
    fn test_score_serializes_camel_case() {
        let json: serde_json::Value =
            serde_json::to_value(Score::initial()).unwrap();
        assert_eq!(json["correctGuesses"], 0);
        assert_eq!(json["remainingTries"], 6);
    }

    #[test]
    fn test_room_serializes_camel_case() {
        let mut room = Room::new(RoomId(1));
        room.players.push(Player::new(cid(10), "alice"));
        let json: serde_json::Value =
            serde_json::to_value(&room).unwrap();

        assert_eq!(json["roomId"], 1);
        assert_eq!(json["totalLetters"], 0);
        assert_eq!(json["fetchingWord"], false);
        assert_eq!(json["playAgainVotes"], serde_json::json!([]));
        assert_eq!(json["players"][0]["username"], "alice");
        assert_eq!(json["players"][0]["connectionId"], 10);
    }

    #[test]
    fn test_room_open_and_full() {
        let mut room = Room::new(RoomId(1));
        assert!(!room.is_open());
        assert!(!room.is_full());

        room.players.push(Player::new(cid(1), "alice"));
        assert!(room.is_open());
        assert!(!room.is_full());

        room.players.push(Player::new(cid(2), "bob"));
        assert!(!room.is_open());
        assert!(room.is_full());
    }

    #[test]
    fn test_room_initializer_is_first_player() {
        let mut room = Room::new(RoomId(1));
        assert_eq!(room.initializer(), None);
        room.players.push(Player::new(cid(1), "alice"));
        room.players.push(Player::new(cid(2), "bob"));
        assert_eq!(room.initializer(), Some("alice"));
    }

    #[test]
    fn test_room_reset_round_keeps_scores() {
        let mut room = Room::new(RoomId(1));
        room.players.push(Player::new(cid(1), "alice"));
        room.players[0].score.correct_guesses = 4;
        room.total_letters = 7;
        room.fetching_word = true;
        room.play_again_votes.push("alice".into());

        room.reset_round();

        assert_eq!(room.total_letters, 0);
        assert!(!room.fetching_word);
        assert!(room.play_again_votes.is_empty());
        assert_eq!(room.players[0].score.correct_guesses, 4);
    }

    #[test]
    fn test_room_reset_scores() {
        let mut room = Room::new(RoomId(1));
        room.players.push(Player::new(cid(1), "alice"));
        room.players.push(Player::new(cid(2), "bob"));
        room.players[0].score.correct_guesses = 4;
        room.players[1].score.remaining_tries = -1;

        room.reset_scores();

        for player in &room.players {
            assert_eq!(player.score, Score::initial());
        }
    }

    #[test]
    fn test_meaning_parses_dictionary_shape() {
        // The shape the dictionary API actually returns for one sense.
        let json = r#"{
            "partOfSpeech": "noun",
            "definitions": [
                { "definition": "a set of things working together" },
                { "definition": "the human body", "example": "the digestive system" }
            ]
        }"#;
        let meaning: Meaning = serde_json::from_str(json).unwrap();
        assert_eq!(meaning.part_of_speech, "noun");
        assert_eq!(meaning.definitions.len(), 2);
        assert_eq!(meaning.definitions[0].example, None);
        assert_eq!(
            meaning.definitions[1].example.as_deref(),
            Some("the digestive system")
        );
    }

    #[test]
    fn test_word_info_meaning_defaults_to_empty() {
        let info: WordInfo =
            serde_json::from_str(r#"{"word":"systems"}"#).unwrap();
        assert_eq!(info.word, "systems");
        assert!(info.meaning.is_empty());
    }
}
