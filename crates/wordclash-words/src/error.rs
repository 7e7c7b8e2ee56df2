//! Error types for the word provider.

/// Errors from the word and meaning upstreams.
///
/// Only [`WordFetch`](Self::WordFetch) and
/// [`EmptyWordResponse`](Self::EmptyWordResponse) ever reach the
/// session engine — a meaning failure is swallowed inside the adapter.
#[derive(Debug, thiserror::Error)]
pub enum WordsError {
    /// The word source was unreachable or answered badly. Fatal to the
    /// call.
    #[error("word fetch failed: {0}")]
    WordFetch(#[source] reqwest::Error),

    /// The word source answered with an empty list.
    #[error("word source returned no words")]
    EmptyWordResponse,

    /// The dictionary lookup failed. Best-effort: the caller keeps the
    /// word and proceeds with an empty meaning.
    #[error("meaning fetch failed: {0}")]
    MeaningFetch(#[source] reqwest::Error),
}
