//! The per-room session state machine.
//!
//! A room's lifecycle state is derived from its record, never stored
//! separately:
//!
//! ```text
//! Open (1 player)
//!   → Active (2 players, totalLetters == 0)
//!   → RoundInProgress (totalLetters > 0)
//!   → PlayAgainPending (one vote recorded)
//!   → Active again (reset) … or gone (reconciler deleted it)
//! ```
//!
//! Every operation here is a single conditional store write plus the
//! broadcasts it implies. The one suspension point is the word fetch,
//! which runs with no lock held; the `fetching_word` guard is what
//! keeps concurrent `initialize game` requests down to exactly one
//! upstream call.

use wordclash_protocol::{
    PlayAgainInfo, RoomId, ServerEvent,
};
use wordclash_words::WordProvider;

use crate::{Broadcast, RoomStore, StoreError};

/// Which branch of the voting protocol a cast landed on.
enum VoteBranch {
    /// First vote: recorded, waiting for the other player.
    Recorded,
    /// Second distinct vote: the room was reset for a new round.
    Reset,
    /// Same player voting twice: nothing changed.
    Ignored,
}

/// Starts a round for `room_id`: one word fetch, gated so concurrent
/// callers trigger exactly one.
///
/// The guard is taken with a conditional update (`fetching_word` must
/// be false); a caller who loses that race returns quietly with no
/// broadcasts — idempotent by design. After the fetch, the commit is
/// again conditional on the guard still being held: if reconciliation
/// reset the room mid-fetch (a player left), or the room is gone
/// entirely, the result is discarded rather than applied to a round
/// that no longer exists.
///
/// On a provider failure the guard is released and the room hears an
/// `error` event — a failed fetch must never leave the room wedged.
pub async fn initialize_round<P: WordProvider>(
    store: &RoomStore,
    provider: &P,
    room_id: RoomId,
) -> Vec<Broadcast> {
    match store
        .conditional_update(
            room_id,
            |room| !room.fetching_word,
            |room| room.fetching_word = true,
        )
        .await
    {
        Ok(_) => {}
        Err(StoreError::Conflict(_)) => {
            tracing::debug!(%room_id, "word fetch already in flight");
            return Vec::new();
        }
        Err(StoreError::NotFound(_)) => return Vec::new(),
        Err(err) => {
            tracing::error!(%room_id, error = %err, "guard acquisition failed");
            return Vec::new();
        }
    }

    match provider.fetch_word_and_meaning().await {
        Ok(word_info) => {
            let total_letters = word_info.word.chars().count() as u32;
            match store
                .conditional_update(
                    room_id,
                    |room| room.fetching_word,
                    |room| {
                        room.total_letters = total_letters;
                        room.fetching_word = false;
                    },
                )
                .await
            {
                Ok((_, room)) => {
                    tracing::info!(
                        %room_id,
                        total_letters,
                        "round initialized"
                    );
                    vec![Broadcast::to_room(
                        &room,
                        ServerEvent::GetWord {
                            word_info,
                            room: room.clone(),
                        },
                    )]
                }
                Err(StoreError::NotFound(_))
                | Err(StoreError::Conflict(_)) => {
                    tracing::debug!(
                        %room_id,
                        "room reset or gone mid-fetch, discarding word"
                    );
                    Vec::new()
                }
                Err(err) => {
                    tracing::error!(%room_id, error = %err, "round commit failed");
                    Vec::new()
                }
            }
        }
        Err(err) => {
            tracing::warn!(%room_id, error = %err, "word fetch failed");
            // Release the guard whatever state the room is in; the
            // failure must not gate the room forever.
            match store
                .conditional_update(room_id, |_| true, |room| {
                    room.fetching_word = false;
                })
                .await
            {
                Ok((_, room)) => vec![Broadcast::to_room(
                    &room,
                    ServerEvent::Error {
                        message: format!("word fetch failed: {err}"),
                    },
                )],
                Err(_) => Vec::new(),
            }
        }
    }
}

/// Applies a scored guess to `username` and broadcasts the updated
/// scoreboard.
///
/// A correct guess adds the revealed letter count; an incorrect one
/// costs a try, with no floor — going negative is the guess
/// validator's concern, not ours. The broadcast is unconditional: even
/// a guess naming an unknown player yields a scoreboard snapshot.
pub async fn apply_guess(
    store: &RoomStore,
    room_id: RoomId,
    username: &str,
    correct: bool,
    correct_guessed_letters: u32,
) -> Vec<Broadcast> {
    let result = store
        .conditional_update(room_id, |_| true, |room| {
            if let Some(player) = room.player_mut(username) {
                if correct {
                    player.score.correct_guesses +=
                        correct_guessed_letters;
                } else {
                    player.score.remaining_tries -= 1;
                }
            }
        })
        .await;

    match result {
        Ok((_, room)) => {
            vec![Broadcast::to_room(
                &room,
                ServerEvent::UpdateScoreboard { room: room.clone() },
            )]
        }
        Err(StoreError::NotFound(_)) => Vec::new(),
        Err(err) => {
            tracing::error!(%room_id, error = %err, "guess update failed");
            Vec::new()
        }
    }
}

/// Records a play-again vote for `username`.
///
/// Two-of-two, order-independent: the first vote broadcasts `wait`,
/// the second *distinct* vote resets the room (votes, letter count,
/// fetch guard, every score) and broadcasts `play`. The same player
/// voting twice changes nothing. A vote from someone not seated in the
/// room fails the predicate and is dropped, keeping the vote set a
/// subset of the membership.
pub async fn cast_play_again_vote(
    store: &RoomStore,
    room_id: RoomId,
    username: &str,
) -> Vec<Broadcast> {
    let result = store
        .conditional_update(
            room_id,
            |room| room.has_username(username),
            |room| {
                if room.play_again_votes.is_empty() {
                    room.play_again_votes.push(username.to_string());
                    VoteBranch::Recorded
                } else if room.play_again_votes.len() == 1
                    && room.play_again_votes[0] != username
                {
                    room.reset_round();
                    room.reset_scores();
                    VoteBranch::Reset
                } else {
                    VoteBranch::Ignored
                }
            },
        )
        .await;

    match result {
        Ok((branch, room)) => {
            let initializer = room.initializer().map(String::from);
            let info = match branch {
                VoteBranch::Recorded => PlayAgainInfo::Wait,
                VoteBranch::Reset => {
                    tracing::info!(%room_id, "room reset for a new round");
                    PlayAgainInfo::Play
                }
                VoteBranch::Ignored => return Vec::new(),
            };
            vec![Broadcast::to_room(
                &room,
                ServerEvent::PlayAgain {
                    info,
                    room: room.clone(),
                    initializer,
                },
            )]
        }
        Err(StoreError::Conflict(_)) => {
            tracing::debug!(
                %room_id,
                username,
                "play-again vote from non-member dropped"
            );
            Vec::new()
        }
        Err(StoreError::NotFound(_)) => Vec::new(),
        Err(err) => {
            tracing::error!(%room_id, error = %err, "vote update failed");
            Vec::new()
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
