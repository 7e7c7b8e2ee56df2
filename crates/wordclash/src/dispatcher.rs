//! Per-connection handling and event dispatch.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]:
//!
//!   1. register an outbound channel for the connection
//!   2. spawn a writer task draining that channel into the socket
//!   3. loop: decode one [`ClientEvent`], route it to the matching
//!      room operation, deliver the returned broadcasts
//!   4. on any exit, reconcile the connection out of whichever room
//!      holds it
//!
//! Events from one connection are handled in the order the connection
//! sent them; a slow word fetch blocks only its own connection's loop.
//! Step 4 runs after a graceful `leave room` too — the second
//! reconciliation finds nothing and does nothing.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use wordclash_protocol::{ClientEvent, Codec, ServerEvent};
use wordclash_room::{
    engine, reconcile, request_match, Broadcast, MatchOutcome,
    PlayerMatcher,
};
use wordclash_transport::{
    Connection, ConnectionId, WebSocketConnection,
};
use wordclash_words::WordProvider;

use crate::server::ServerState;
use crate::ServerError;

/// Maps live connections to their outbound event channels.
///
/// Broadcast recipients are resolved here: a room operation names
/// connection ids, the registry owns the senders. A recipient that
/// already unregistered is skipped silently.
#[derive(Default)]
pub struct ConnectionRegistry {
    senders: Mutex<
        HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
    >,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection's outbound channel.
    pub async fn register(
        &self,
        connection_id: ConnectionId,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) {
        let mut senders = self.senders.lock().await;
        senders.insert(connection_id, sender);
    }

    /// Drops a connection's channel. The writer task drains and exits
    /// once the last sender is gone.
    pub async fn unregister(&self, connection_id: ConnectionId) {
        let mut senders = self.senders.lock().await;
        senders.remove(&connection_id);
    }

    /// Sends one event to one connection, if it is still registered.
    pub async fn send(
        &self,
        connection_id: ConnectionId,
        event: ServerEvent,
    ) {
        let senders = self.senders.lock().await;
        if let Some(sender) = senders.get(&connection_id) {
            let _ = sender.send(event);
        }
    }

    /// Fans out a batch of broadcast intents.
    pub async fn deliver(&self, broadcasts: Vec<Broadcast>) {
        if broadcasts.is_empty() {
            return;
        }
        let senders = self.senders.lock().await;
        for broadcast in broadcasts {
            for connection_id in &broadcast.recipients {
                if let Some(sender) = senders.get(connection_id) {
                    let _ = sender.send(broadcast.event.clone());
                }
            }
        }
    }

    /// Number of registered connections.
    pub async fn len(&self) -> usize {
        self.senders.lock().await.len()
    }

    /// Returns `true` if no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.senders.lock().await.is_empty()
    }
}

/// Handles a single connection from accept to reconciliation.
pub(crate) async fn handle_connection<P, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<P, C>>,
) -> Result<(), ServerError>
where
    P: WordProvider,
    C: Codec + Clone,
{
    let connection_id = conn.id();
    tracing::debug!(%connection_id, "handling new connection");

    let (tx, mut rx) = mpsc::unbounded_channel();
    state.registry.register(connection_id, tx).await;

    let conn = Arc::new(conn);
    let writer = {
        let conn = Arc::clone(&conn);
        let codec = state.codec.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let bytes = match codec.encode(&event) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        tracing::error!(
                            %connection_id,
                            error = %err,
                            "failed to encode outbound event"
                        );
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    break;
                }
            }
        })
    };

    loop {
        match conn.recv().await {
            Ok(Some(data)) => {
                match state.codec.decode::<ClientEvent>(&data) {
                    Ok(event) => {
                        dispatch_event(&state, connection_id, event)
                            .await;
                    }
                    Err(err) => {
                        // Rejected at the boundary; the offender is
                        // told, no room operation sees it.
                        tracing::debug!(
                            %connection_id,
                            error = %err,
                            "rejecting malformed event"
                        );
                        state
                            .registry
                            .send(
                                connection_id,
                                ServerEvent::Error {
                                    message: format!(
                                        "invalid event: {err}"
                                    ),
                                },
                            )
                            .await;
                    }
                }
            }
            Ok(None) => {
                tracing::info!(%connection_id, "connection closed");
                break;
            }
            Err(err) => {
                tracing::debug!(%connection_id, error = %err, "recv error");
                break;
            }
        }
    }

    // The transport-level disconnect: pull the connection out of
    // whichever room seats it. Harmless if a `leave room` already did.
    let broadcasts = reconcile(
        &state.store,
        PlayerMatcher::ByConnection(connection_id),
    )
    .await;
    state.registry.unregister(connection_id).await;
    state.registry.deliver(broadcasts).await;

    let _ = writer.await;
    let _ = conn.close().await;
    Ok(())
}

/// Routes one decoded event to the room layer and fans out the result.
async fn dispatch_event<P, C>(
    state: &Arc<ServerState<P, C>>,
    connection_id: ConnectionId,
    event: ClientEvent,
) where
    P: WordProvider,
    C: Codec + Clone,
{
    match event {
        ClientEvent::SetUsername { username } => {
            match request_match(&state.store, &username, connection_id)
                .await
            {
                Ok(MatchOutcome::UsernameTaken) => {
                    state
                        .registry
                        .send(connection_id, ServerEvent::UsernameTaken)
                        .await;
                }
                Ok(MatchOutcome::Joined {
                    room,
                    is_initializer,
                }) => {
                    tracing::info!(
                        room_id = %room.room_id,
                        %connection_id,
                        username,
                        is_initializer,
                        "player matched"
                    );
                    let initializer =
                        room.initializer().map(String::from);
                    state
                        .registry
                        .deliver(vec![Broadcast::to_room(
                            &room,
                            ServerEvent::RoomJoined {
                                room: room.clone(),
                                initializer,
                            },
                        )])
                        .await;
                }
                Err(err) => {
                    tracing::error!(
                        %connection_id,
                        error = %err,
                        "matchmaking failed"
                    );
                }
            }
        }

        ClientEvent::InitializeGame { room_id } => {
            let broadcasts = engine::initialize_round(
                &state.store,
                &state.provider,
                room_id,
            )
            .await;
            state.registry.deliver(broadcasts).await;
        }

        ClientEvent::HandleGuess {
            room_id,
            username,
            correct,
            correct_guessed_letters,
        } => {
            let broadcasts = engine::apply_guess(
                &state.store,
                room_id,
                &username,
                correct,
                correct_guessed_letters,
            )
            .await;
            state.registry.deliver(broadcasts).await;
        }

        ClientEvent::PlayAgain { room_id, username } => {
            let broadcasts = engine::cast_play_again_vote(
                &state.store,
                room_id,
                &username,
            )
            .await;
            state.registry.deliver(broadcasts).await;
        }

        ClientEvent::LeaveRoom { room_id, username } => {
            let broadcasts = reconcile(
                &state.store,
                PlayerMatcher::ByUsername { room_id, username },
            )
            .await;
            state.registry.deliver(broadcasts).await;
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
