//! Wire protocol for Wordclash.
//!
//! This crate defines the language clients and server speak:
//!
//! - **Records** ([`Room`], [`Player`], [`Score`], [`WordInfo`]) — the
//!   room state that rides inside broadcasts. The stored room record and
//!   the broadcast room record are the same type; there is no separate
//!   persistence layout.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — every inbound and
//!   outbound message, tagged with plain spaced event names
//!   (`"set username"`, `"room joined"`, ...).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events become
//!   bytes and back.
//!
//! The protocol layer knows nothing about sockets or the room store —
//! it only shapes data.

mod codec;
mod error;
mod events;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use events::{ClientEvent, PlayAgainInfo, ServerEvent};
pub use types::{
    Definition, Meaning, Player, Room, RoomId, Score, WordInfo,
    MAX_PLAYERS,
};
