//! # Wordclash
//!
//! A real-time server that pairs anonymous clients into two-player
//! word-guessing sessions over WebSockets.
//!
//! The layering, bottom to top: transport (sockets) → protocol (tagged
//! JSON events) → room (store, matchmaking, state machine,
//! reconciliation) → this crate, which owns the dispatcher that routes
//! inbound events to room operations and fans the resulting broadcasts
//! back out, plus the HTTP health endpoint and the server binary.

mod dispatcher;
mod error;
mod health;
mod server;

pub use dispatcher::ConnectionRegistry;
pub use error::ServerError;
pub use server::{
    ServerConfig, WordclashServer, WordclashServerBuilder,
};
