//! The HTTP-backed [`WordProvider`].

use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use wordclash_protocol::{Meaning, WordInfo};

use crate::{WordProvider, WordsConfig, WordsError};

/// Fetches words from a random-word API and meanings from a dictionary
/// API.
#[derive(Debug, Clone)]
pub struct HttpWordProvider {
    client: Client,
    config: WordsConfig,
}

/// One entry of the dictionary response; everything but `meanings` is
/// ignored.
#[derive(Debug, Deserialize)]
struct DictionaryEntry {
    #[serde(default)]
    meanings: Vec<Meaning>,
}

impl HttpWordProvider {
    /// Creates a provider with the given config.
    pub fn new(config: WordsConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    /// Draws a length from the configured range and fetches one word of
    /// that length.
    async fn fetch_word(&self) -> Result<String, WordsError> {
        let length = rand::rng().random_range(
            self.config.min_word_length..=self.config.max_word_length,
        );
        let url = format!(
            "{}/word?length={length}",
            self.config.word_api_url.trim_end_matches('/')
        );

        let words: Vec<String> = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(WordsError::WordFetch)?
            .json()
            .await
            .map_err(WordsError::WordFetch)?;

        words
            .into_iter()
            .next()
            .ok_or(WordsError::EmptyWordResponse)
    }

    /// Looks up the meanings of `word`.
    async fn fetch_meaning(
        &self,
        word: &str,
    ) -> Result<Vec<Meaning>, WordsError> {
        let url = format!(
            "{}{}",
            self.config.meaning_api_url,
            word.to_lowercase()
        );

        let entries: Vec<DictionaryEntry> = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(WordsError::MeaningFetch)?
            .json()
            .await
            .map_err(WordsError::MeaningFetch)?;

        Ok(entries
            .into_iter()
            .next()
            .map(|entry| entry.meanings)
            .unwrap_or_default())
    }
}

impl WordProvider for HttpWordProvider {
    async fn fetch_word_and_meaning(
        &self,
    ) -> Result<WordInfo, WordsError> {
        let word = self.fetch_word().await?;

        // Meaning is best-effort: keep the word, log, move on. Never
        // fetch a replacement word here — that would hand the two
        // players different rounds.
        let meaning = match self.fetch_meaning(&word).await {
            Ok(meaning) => meaning,
            Err(err) => {
                tracing::debug!(
                    %word,
                    error = %err,
                    "meaning lookup failed, keeping word"
                );
                Vec::new()
            }
        };

        Ok(WordInfo { word, meaning })
    }
}
