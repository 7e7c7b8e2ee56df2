//! Provider configuration.

use std::time::Duration;

/// Where the words and meanings come from, and how long a word may be.
#[derive(Debug, Clone)]
pub struct WordsConfig {
    /// Base URL of the random-word source.
    pub word_api_url: String,
    /// Base URL of the dictionary; the lowercased word is appended.
    pub meaning_api_url: String,
    /// Inclusive lower bound of the word-length draw.
    pub min_word_length: u32,
    /// Inclusive upper bound of the word-length draw.
    pub max_word_length: u32,
    /// Per-request timeout for both upstreams.
    pub request_timeout: Duration,
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            word_api_url: "https://random-word-api.herokuapp.com"
                .to_string(),
            meaning_api_url:
                "https://api.dictionaryapi.dev/api/v2/entries/en/"
                    .to_string(),
            min_word_length: 5,
            max_word_length: 12,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl WordsConfig {
    /// Builds a config from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    ///
    /// Recognized: `WORD_API_URL`, `MEANING_API_URL`,
    /// `WORD_LENGTH_MIN`, `WORD_LENGTH_MAX`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            word_api_url: std::env::var("WORD_API_URL")
                .unwrap_or(defaults.word_api_url),
            meaning_api_url: std::env::var("MEANING_API_URL")
                .unwrap_or(defaults.meaning_api_url),
            min_word_length: env_u32("WORD_LENGTH_MIN")
                .unwrap_or(defaults.min_word_length),
            max_word_length: env_u32("WORD_LENGTH_MAX")
                .unwrap_or(defaults.max_word_length),
            request_timeout: defaults.request_timeout,
        }
    }
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok()?.parse().ok()
}
