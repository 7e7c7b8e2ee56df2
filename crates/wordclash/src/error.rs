//! Unified error type for the server.

use wordclash_protocol::ProtocolError;
use wordclash_room::StoreError;
use wordclash_transport::TransportError;
use wordclash_words::WordsError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attributes auto-generate `From` impls, so `?`
/// converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-store error that escaped local recovery.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A word-provider error.
    #[error(transparent)]
    Words(#[from] WordsError),

    /// Binding or serving the health endpoint failed.
    #[error("health endpoint failed: {0}")]
    Health(#[source] std::io::Error),
}
