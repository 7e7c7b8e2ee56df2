//! Room coordination for Wordclash: the store, the matchmaker, the
//! per-room state machine, and disconnect reconciliation.
//!
//! The design rule that everything here follows: **no component reads
//! room state and writes it back in two steps**. The [`RoomStore`] is
//! the single source of truth, and every mutation is one predicate-
//! gated operation under its lock. A lost race comes back as an
//! explicit [`StoreError::Conflict`], never as a corrupted room — which
//! is what keeps "no third player", "no duplicate username", and "one
//! fetch in flight" true no matter how connections interleave.
//!
//! # Key pieces
//!
//! - [`RoomStore`] — atomic, conditional mutation of room records
//! - [`request_match`] — find-or-create pairing with bounded retry
//! - [`engine`] — round initialization, guesses, play-again voting
//! - [`reconcile`] — membership teardown on leave/disconnect
//! - [`Broadcast`] — the fan-out intents every operation returns, so
//!   the whole layer is testable without a live transport

mod broadcast;
pub mod engine;
mod error;
mod matchmaker;
mod reconcile;
mod store;

pub use broadcast::Broadcast;
pub use error::StoreError;
pub use matchmaker::{request_match, MatchOutcome};
pub use reconcile::reconcile;
pub use store::{Departed, PlayerMatcher, RoomStore};
