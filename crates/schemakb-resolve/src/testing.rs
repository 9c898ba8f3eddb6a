//! In-memory search backend for unit tests.

use schemakb_core::error::ResolutionError;
use schemakb_core::traits::{QueryPattern, SearchBackend, Wildcard};
use schemakb_core::types::{KbField, MatchResult};

struct Column {
    name: String,
    score: f32,
    entries: Vec<String>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    synonyms: Vec<Column>,
    values: Vec<Column>,
    corrections: Vec<(String, String)>,
    fail: bool,
}

fn column(name: &str, score: f32, entries: &[&str]) -> Column {
    Column { name: name.to_string(), score, entries: entries.iter().map(|e| (*e).to_string()).collect() }
}

impl FakeBackend {
    pub(crate) fn new() -> Self { Self::default() }

    pub(crate) fn synonym(mut self, name: &str, score: f32, entries: &[&str]) -> Self {
        self.synonyms.push(column(name, score, entries));
        self
    }

    pub(crate) fn value(mut self, name: &str, score: f32, entries: &[&str]) -> Self {
        self.values.push(column(name, score, entries));
        self
    }

    pub(crate) fn correction(mut self, typo: &str, fixed: &str) -> Self {
        self.corrections.push((typo.to_string(), fixed.to_string()));
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

fn word_matches(word: &str, pattern: &QueryPattern) -> bool {
    let needle = pattern.text.to_lowercase();
    match pattern.wildcard {
        Wildcard::Exact => word == needle,
        Wildcard::Prefix => word.starts_with(&needle),
        Wildcard::Contains => word.contains(&needle),
    }
}

impl SearchBackend for FakeBackend {
    fn search(&self, field: KbField, pattern: &QueryPattern, limit: Option<usize>) -> Result<Vec<MatchResult>, ResolutionError> {
        if self.fail { return Err(ResolutionError::search(field, "backend unavailable")); }
        let columns = match field {
            KbField::Synonyms => &self.synonyms,
            KbField::UniqueValues => &self.values,
        };
        let mut hits: Vec<MatchResult> = columns
            .iter()
            .filter_map(|c| {
                let matched: Vec<String> = c
                    .entries
                    .iter()
                    .filter(|e| e.to_lowercase().split_whitespace().any(|w| word_matches(w, pattern)))
                    .cloned()
                    .collect();
                (!matched.is_empty()).then(|| MatchResult { column_name: c.name.clone(), matched_terms: matched, score: c.score })
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit.unwrap_or(usize::MAX));
        Ok(hits)
    }

    fn spell_correct(&self, _field: KbField, term: &str) -> Result<Option<String>, ResolutionError> {
        if self.fail { return Err(ResolutionError::search("spelling", "backend unavailable")); }
        Ok(self.corrections.iter().find(|(typo, _)| typo == term).map(|(_, fixed)| fixed.clone()))
    }
}
