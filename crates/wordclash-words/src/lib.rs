//! Word Provider Adapter: one call that wraps two upstreams — a random
//! word source and a dictionary — into the [`WordInfo`] a round needs.
//!
//! The contract the session engine relies on:
//!
//! - a **word** fetch failure is fatal to the call and propagates,
//! - a **meaning** fetch failure is not: the call still succeeds with
//!   an empty meaning list, and the word is never swapped for a new one.
//!
//! The adapter holds no state of its own; retry/backoff is the
//! upstreams' business.

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod provider;

pub use config::WordsConfig;
pub use error::WordsError;
pub use provider::HttpWordProvider;

use std::future::Future;

use wordclash_protocol::WordInfo;

/// The seam between the session engine and the outside world.
///
/// The engine is generic over this trait so tests can script exactly
/// when a fetch starts, how long it stays outstanding, and whether it
/// fails — without any network.
pub trait WordProvider: Send + Sync + 'static {
    /// Fetches a word and, best-effort, its meaning.
    fn fetch_word_and_meaning(
        &self,
    ) -> impl Future<Output = Result<WordInfo, WordsError>> + Send;
}
