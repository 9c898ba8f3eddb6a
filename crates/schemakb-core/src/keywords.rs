//! Keyword extraction from a free-form user question.
//!
//! Quoted spans are kept verbatim. The rest is lower-cased, stripped of date
//! vocabulary (which instead raises `date_present` and appends the datetime
//! markers), reduced to alphanumeric tokens and filtered by a noise-word list.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use tracing::debug;

use crate::types::QueryTokens;

/// Tokens that match the dtype names embedded in datetime columns' synonyms.
pub const DATETIME_MARKERS: [&str; 2] = ["datetime64", "datetime32"];

const DEFAULT_NOISE_WORDS: &str = include_str!("../data/noise_words.txt");

#[allow(clippy::unwrap_used)]
static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]*)"|'([^']*)'"#).unwrap());

#[allow(clippy::unwrap_used)]
static DATE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:january|jan|february|feb|march|mar|april|apr|may|june|jun|july|jul|august|aug|september|sept|sep|october|oct|november|nov|december|dec|20[0-4][0-9]|2050|quarter|year|month|ytd|mtd|today|yesterday|tomorrow|qtd)\b",
    )
    .unwrap()
});

#[allow(clippy::unwrap_used)]
static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").unwrap());

#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    noise_words: HashSet<String>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_WORDS.lines())
    }
}

impl KeywordExtractor {
    pub fn new<I, S>(noise_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let noise_words = noise_words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { noise_words }
    }

    /// Load a newline-separated noise-word file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read noise words from {}", path.display()))?;
        Ok(Self::new(content.lines()))
    }

    pub fn is_noise(&self, word: &str) -> bool {
        self.noise_words.contains(&word.to_lowercase())
    }

    pub fn extract(&self, text: &str) -> QueryTokens {
        let quoted: Vec<String> = QUOTED
            .captures_iter(text)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let remainder = QUOTED.replace_all(text, " ").to_lowercase();
        let date_present = DATE_WORDS.is_match(&remainder);
        let remainder = DATE_WORDS.replace_all(&remainder, "");
        let remainder = NON_ALNUM.replace_all(&remainder, " ");

        let mut free: Vec<String> = remainder
            .split_whitespace()
            .filter(|w| !self.is_noise(w))
            .map(str::to_string)
            .collect();
        if date_present {
            free.extend(DATETIME_MARKERS.iter().map(|m| (*m).to_string()));
        }

        let tokens = QueryTokens { quoted, free, date_present };
        debug!(keywords = ?tokens.all(), date_present, "extracted keywords");
        tokens
    }
}
