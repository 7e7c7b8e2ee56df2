//! `WordclashServer` builder and accept loop.
//!
//! Ties the layers together: the WebSocket transport feeds connection
//! handlers, handlers drive the room layer through the shared store,
//! and the health endpoint runs on its own listener beside it all.

use std::sync::Arc;

use wordclash_protocol::{Codec, JsonCodec};
use wordclash_room::RoomStore;
use wordclash_transport::{Transport, WebSocketTransport};
use wordclash_words::WordProvider;

use crate::dispatcher::{handle_connection, ConnectionRegistry};
use crate::{health, ServerError};

/// Addresses the server listens on.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// WebSocket listener for the game event surface.
    pub bind_addr: String,
    /// HTTP listener for the health endpoint.
    pub health_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            health_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads `WORDCLASH_BIND_ADDR` and `WORDCLASH_HEALTH_ADDR`,
    /// falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("WORDCLASH_BIND_ADDR")
                .unwrap_or(defaults.bind_addr),
            health_addr: std::env::var("WORDCLASH_HEALTH_ADDR")
                .unwrap_or(defaults.health_addr),
        }
    }
}

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<P: WordProvider, C: Codec> {
    pub(crate) store: RoomStore,
    pub(crate) registry: ConnectionRegistry,
    pub(crate) provider: P,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Wordclash server.
///
/// # Example
///
/// ```rust,ignore
/// let server = WordclashServer::builder()
///     .config(ServerConfig::from_env())
///     .build(HttpWordProvider::new(WordsConfig::from_env()))
///     .await?;
/// server.run().await
/// ```
pub struct WordclashServerBuilder {
    config: ServerConfig,
}

impl WordclashServerBuilder {
    /// Creates a new builder with default addresses.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces the whole config.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the WebSocket bind address.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the health endpoint address.
    pub fn health(mut self, addr: &str) -> Self {
        self.config.health_addr = addr.to_string();
        self
    }

    /// Binds both listeners and assembles the server around the given
    /// word provider. Uses `JsonCodec` — the wire the clients speak.
    pub async fn build<P: WordProvider>(
        self,
        provider: P,
    ) -> Result<WordclashServer<P, JsonCodec>, ServerError> {
        let transport =
            WebSocketTransport::bind(&self.config.bind_addr).await?;
        let health_listener =
            tokio::net::TcpListener::bind(&self.config.health_addr)
                .await
                .map_err(ServerError::Health)?;

        let state = Arc::new(ServerState {
            store: RoomStore::new(),
            registry: ConnectionRegistry::new(),
            provider,
            codec: JsonCodec,
        });

        Ok(WordclashServer {
            transport,
            health_listener,
            state,
        })
    }
}

impl Default for WordclashServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Wordclash server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WordclashServer<P: WordProvider, C: Codec> {
    transport: WebSocketTransport,
    health_listener: tokio::net::TcpListener,
    state: Arc<ServerState<P, C>>,
}

impl<P, C> WordclashServer<P, C>
where
    P: WordProvider,
    C: Codec + Clone,
{
    /// Creates a new builder.
    pub fn builder() -> WordclashServerBuilder {
        WordclashServerBuilder::new()
    }

    /// Returns the local address of the WebSocket listener.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the local address of the health listener.
    pub fn health_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.health_listener.local_addr()
    }

    /// Runs the accept loop and the health endpoint until the process
    /// is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("Wordclash server running");

        let health_listener = self.health_listener;
        tokio::spawn(async move {
            if let Err(err) =
                axum::serve(health_listener, health::router()).await
            {
                tracing::error!(error = %err, "health endpoint failed");
            }
        });

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(err) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %err,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(err) => {
                    tracing::error!(error = %err, "accept failed");
                }
            }
        }
    }
}
