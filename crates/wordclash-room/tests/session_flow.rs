//! Integration tests for the room system: the full session walkthrough
//! plus the concurrency properties the store's conditional operations
//! are supposed to guarantee.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use wordclash_protocol::{PlayAgainInfo, RoomId, ServerEvent, WordInfo};
use wordclash_room::{
    engine, reconcile, request_match, MatchOutcome, PlayerMatcher,
    RoomStore,
};
use wordclash_transport::ConnectionId;
use wordclash_words::{WordProvider, WordsError};

// =========================================================================
// Scripted providers
// =========================================================================

/// Returns a fixed word immediately.
struct ScriptedProvider {
    word: &'static str,
}

impl WordProvider for ScriptedProvider {
    async fn fetch_word_and_meaning(
        &self,
    ) -> Result<WordInfo, WordsError> {
        Ok(WordInfo {
            word: self.word.to_string(),
            meaning: Vec::new(),
        })
    }
}

/// A provider that parks inside the fetch until the test releases it,
/// counting how many times it was actually invoked. This is how the
/// tests hold a fetch "outstanding" at a precise point.
struct GateProvider {
    calls: AtomicU32,
    entered: Notify,
    release: Notify,
}

impl GateProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

impl WordProvider for GateProvider {
    async fn fetch_word_and_meaning(
        &self,
    ) -> Result<WordInfo, WordsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(WordInfo {
            word: "systems".to_string(),
            meaning: Vec::new(),
        })
    }
}

fn cid(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

async fn joined_room(
    store: &RoomStore,
    username: &str,
    conn: u64,
) -> RoomId {
    match request_match(store, username, cid(conn)).await.unwrap() {
        MatchOutcome::Joined { room, .. } => room.room_id,
        MatchOutcome::UsernameTaken => {
            panic!("{username} unexpectedly taken")
        }
    }
}

// =========================================================================
// Full session walkthrough
// =========================================================================

#[tokio::test]
async fn test_full_session_walkthrough() {
    let store = RoomStore::new();
    let provider = ScriptedProvider { word: "systems" };

    // alice and bob end up paired in one room.
    let room_id = joined_room(&store, "alice", 1).await;
    let bob_room = joined_room(&store, "bob", 2).await;
    assert_eq!(room_id, bob_room);
    let room = store.snapshot(room_id).await.unwrap();
    assert_eq!(room.players.len(), 2);

    // A third client trying "alice" is rejected with no state change.
    let outcome = request_match(&store, "alice", cid(3)).await.unwrap();
    assert_eq!(outcome, MatchOutcome::UsernameTaken);
    assert_eq!(store.room_count().await, 1);

    // The round starts: "systems" has 7 letters.
    let broadcasts =
        engine::initialize_round(&store, &provider, room_id).await;
    assert_eq!(broadcasts.len(), 1);
    let room = store.snapshot(room_id).await.unwrap();
    assert_eq!(room.total_letters, 7);
    assert!(!room.fetching_word);

    // alice reveals 3 letters, then misses once.
    engine::apply_guess(&store, room_id, "alice", true, 3).await;
    engine::apply_guess(&store, room_id, "alice", false, 0).await;
    let room = store.snapshot(room_id).await.unwrap();
    assert_eq!(room.players[0].score.correct_guesses, 3);
    assert_eq!(room.players[0].score.remaining_tries, 5);

    // Both vote to play again: the room resets.
    engine::cast_play_again_vote(&store, room_id, "alice").await;
    let broadcasts =
        engine::cast_play_again_vote(&store, room_id, "bob").await;
    let ServerEvent::PlayAgain { info, .. } = &broadcasts[0].event
    else {
        panic!("expected play again event");
    };
    assert_eq!(*info, PlayAgainInfo::Play);
    let room = store.snapshot(room_id).await.unwrap();
    assert_eq!(room.total_letters, 0);
    assert_eq!(room.players[0].score.correct_guesses, 0);
    assert_eq!(room.players[0].score.remaining_tries, 6);

    // bob disconnects; alice is told and the votes are gone.
    let broadcasts =
        reconcile(&store, PlayerMatcher::ByConnection(cid(2))).await;
    assert_eq!(broadcasts[0].recipients, vec![cid(1)]);
    let room = store.snapshot(room_id).await.unwrap();
    assert_eq!(room.players.len(), 1);

    // alice leaves gracefully; the room is gone.
    reconcile(
        &store,
        PlayerMatcher::ByUsername {
            room_id,
            username: "alice".into(),
        },
    )
    .await;
    assert_eq!(store.room_count().await, 0);
}

// =========================================================================
// Concurrency properties
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_never_overfill_a_room() {
    let store = Arc::new(RoomStore::new());

    let mut handles = Vec::new();
    for i in 0..16u64 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            request_match(&store, &format!("player{i}"), cid(i + 1))
                .await
                .unwrap()
        }));
    }

    let mut joined = 0;
    let mut initializers = 0;
    for handle in handles {
        match handle.await.unwrap() {
            MatchOutcome::Joined { is_initializer, .. } => {
                joined += 1;
                if is_initializer {
                    initializers += 1;
                }
            }
            MatchOutcome::UsernameTaken => {
                panic!("distinct usernames must all join")
            }
        }
    }
    assert_eq!(joined, 16);

    let rooms = store.all_rooms().await;
    let seated: usize =
        rooms.iter().map(|room| room.players.len()).sum();
    assert_eq!(seated, 16, "every player seated exactly once");
    assert_eq!(initializers, rooms.len(), "one initializer per room");
    for room in &rooms {
        assert!(
            room.players.len() <= 2,
            "{} overfilled with {} players",
            room.room_id,
            room.players.len()
        );
        for (i, player) in room.players.iter().enumerate() {
            assert!(
                room.players[i + 1..]
                    .iter()
                    .all(|other| other.username != player.username),
                "duplicate username in {}",
                room.room_id
            );
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_username_seats_at_most_one_per_room() {
    // Two connections race with the same name. The global scan may let
    // both through, but the per-room predicate must keep any single
    // room free of duplicates.
    let store = Arc::new(RoomStore::new());

    let a = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            request_match(&store, "alice", cid(1)).await.unwrap()
        })
    };
    let b = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            request_match(&store, "alice", cid(2)).await.unwrap()
        })
    };
    let _ = a.await.unwrap();
    let _ = b.await.unwrap();

    for room in store.all_rooms().await {
        assert!(
            room.players
                .iter()
                .filter(|p| p.username == "alice")
                .count()
                <= 1,
            "room {} seated the same name twice",
            room.room_id
        );
    }
}

#[tokio::test]
async fn test_concurrent_initialize_round_fetches_once() {
    let store = Arc::new(RoomStore::new());
    let room_id = joined_room(&store, "alice", 1).await;
    joined_room(&store, "bob", 2).await;

    let provider = GateProvider::new();

    // First caller takes the guard and parks inside the fetch.
    let first = {
        let store = Arc::clone(&store);
        let provider = Arc::clone(&provider);
        tokio::spawn(async move {
            engine::initialize_round(
                store.as_ref(),
                provider.as_ref(),
                room_id,
            )
            .await
        })
    };
    provider.entered.notified().await;

    // Second caller finds the guard held: no second fetch, no output.
    let broadcasts = engine::initialize_round(
        store.as_ref(),
        provider.as_ref(),
        room_id,
    )
    .await;
    assert!(broadcasts.is_empty());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    // Release the fetch; the winner completes normally.
    provider.release.notify_one();
    let broadcasts = first.await.unwrap();
    assert_eq!(broadcasts.len(), 1);
    assert!(matches!(
        broadcasts[0].event,
        ServerEvent::GetWord { .. }
    ));

    let room = store.snapshot(room_id).await.unwrap();
    assert_eq!(room.total_letters, 7);
    assert!(!room.fetching_word);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_result_discarded_when_player_left_mid_fetch() {
    let store = Arc::new(RoomStore::new());
    let room_id = joined_room(&store, "alice", 1).await;
    joined_room(&store, "bob", 2).await;

    let provider = GateProvider::new();
    let fetch = {
        let store = Arc::clone(&store);
        let provider = Arc::clone(&provider);
        tokio::spawn(async move {
            engine::initialize_round(
                store.as_ref(),
                provider.as_ref(),
                room_id,
            )
            .await
        })
    };
    provider.entered.notified().await;

    // bob leaves while the fetch is outstanding: reconciliation resets
    // the round, including the fetch guard.
    reconcile(&store, PlayerMatcher::ByConnection(cid(2))).await;
    assert!(!store.snapshot(room_id).await.unwrap().fetching_word);

    // The completing fetch loses its conditional commit and the word
    // is dropped on the floor.
    provider.release.notify_one();
    let broadcasts = fetch.await.unwrap();
    assert!(broadcasts.is_empty());
    assert_eq!(store.snapshot(room_id).await.unwrap().total_letters, 0);
}

#[tokio::test]
async fn test_fetch_result_discarded_when_room_emptied_mid_fetch() {
    let store = Arc::new(RoomStore::new());
    let room_id = joined_room(&store, "alice", 1).await;
    joined_room(&store, "bob", 2).await;

    let provider = GateProvider::new();
    let fetch = {
        let store = Arc::clone(&store);
        let provider = Arc::clone(&provider);
        tokio::spawn(async move {
            engine::initialize_round(
                store.as_ref(),
                provider.as_ref(),
                room_id,
            )
            .await
        })
    };
    provider.entered.notified().await;

    // Both players vanish; the room is deleted entirely.
    reconcile(&store, PlayerMatcher::ByConnection(cid(1))).await;
    reconcile(&store, PlayerMatcher::ByConnection(cid(2))).await;
    assert_eq!(store.room_count().await, 0);

    provider.release.notify_one();
    let broadcasts = fetch.await.unwrap();
    assert!(broadcasts.is_empty(), "stale fetch must go nowhere");
}

#[tokio::test]
async fn test_room_is_reusable_after_guarded_fetch_completes() {
    // After a full round the guard must be free for the next
    // initialization.
    let store = RoomStore::new();
    let room_id = joined_room(&store, "alice", 1).await;
    joined_room(&store, "bob", 2).await;
    let provider = ScriptedProvider { word: "letters" };

    engine::initialize_round(&store, &provider, room_id).await;
    engine::cast_play_again_vote(&store, room_id, "alice").await;
    engine::cast_play_again_vote(&store, room_id, "bob").await;

    let broadcasts =
        engine::initialize_round(&store, &provider, room_id).await;
    assert_eq!(broadcasts.len(), 1);
    assert_eq!(
        store.snapshot(room_id).await.unwrap().total_letters,
        7
    );
}

#[tokio::test]
async fn test_matchmaking_reuses_room_after_a_player_left() {
    // alice+bob pair up, bob leaves, carol should land in alice's
    // room — it is open again.
    let store = RoomStore::new();
    let room_id = joined_room(&store, "alice", 1).await;
    joined_room(&store, "bob", 2).await;
    reconcile(&store, PlayerMatcher::ByConnection(cid(2))).await;

    let carol_room = joined_room(&store, "carol", 3).await;

    assert_eq!(carol_room, room_id);
    let room = store.snapshot(room_id).await.unwrap();
    assert_eq!(room.players.len(), 2);
    // And bob's name is free again.
    assert!(!store.username_in_play("bob").await);
}
