use std::collections::HashSet;

use tracing::{debug, warn};

use schemakb_core::config::SuggestSettings;
use schemakb_core::error::ResolutionError;
use schemakb_core::traits::{QueryPattern, SearchBackend, AUTOCOMPLETE_FUZZINESS};
use schemakb_core::types::{KbField, MatchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestOptions {
    pub top_k: usize,
    pub fuzzy: bool,
    pub spell_correct: bool,
    pub min_stem_len: usize,
}

impl From<&SuggestSettings> for SuggestOptions {
    fn from(s: &SuggestSettings) -> Self {
        Self { top_k: s.top_k, fuzzy: s.fuzzy, spell_correct: s.spell_correct, min_stem_len: s.min_stem_len }
    }
}

impl Default for SuggestOptions {
    fn default() -> Self { Self::from(&SuggestSettings::default()) }
}

/// How a matched categorical value is offered: `East <'Region'>`.
pub fn value_candidate(value: &str, column: &str) -> String {
    format!("{value} <'{column}'>")
}

/// Highest score first; equal scores keep their input order. The first
/// occurrence of a candidate wins.
pub fn rank_candidates(mut candidates: Vec<(String, f32)>, top_k: usize) -> Vec<String> {
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|(candidate, _)| candidate)
        .filter(|c| seen.insert(c.clone()))
        .take(top_k)
        .collect()
}

/// Completes the last, partially typed word of a sentence with column names
/// and categorical values from the index.
///
/// Suggestions are advisory: without an index, or when anything fails, the
/// result is simply empty.
pub struct Autocomplete<'a, B: SearchBackend + ?Sized> {
    backend: Option<&'a B>,
    options: SuggestOptions,
}

impl<'a, B: SearchBackend + ?Sized> Autocomplete<'a, B> {
    pub fn new(backend: Option<&'a B>, options: SuggestOptions) -> Self { Self { backend, options } }

    pub fn suggest(&self, text: &str) -> Vec<String> {
        match self.try_suggest(text) {
            Ok(sentences) => sentences,
            Err(e) => {
                warn!(error = %e, "autocomplete failed");
                Vec::new()
            }
        }
    }

    fn try_suggest(&self, text: &str) -> anyhow::Result<Vec<String>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let Some((stem, head)) = words.split_last() else { return Ok(Vec::new()) };
        if stem.chars().count() < self.options.min_stem_len { return Ok(Vec::new()); }
        let Some(backend) = self.backend else {
            debug!("no index available for suggestions");
            return Ok(Vec::new());
        };

        let mut candidates: Vec<(String, f32)> = self
            .search_field(backend, KbField::Synonyms, stem)?
            .into_iter()
            .map(|hit| (hit.column_name, hit.score))
            .collect();
        for hit in self.search_field(backend, KbField::UniqueValues, stem)? {
            for value in &hit.matched_terms {
                candidates.push((value_candidate(value, &hit.column_name), hit.score));
            }
        }

        let ranked = rank_candidates(candidates, self.options.top_k);
        debug!(stem = %stem, suggestions = ranked.len(), "autocomplete");
        Ok(ranked
            .iter()
            .map(|candidate| {
                let mut sentence: Vec<&str> = head.to_vec();
                sentence.push(candidate);
                sentence.join(" ")
            })
            .collect())
    }

    /// Prefix search for `stem`. When nothing matches and spelling
    /// correction is on, the corrected stem is searched as a whole term.
    fn search_field(&self, backend: &B, field: KbField, stem: &str) -> Result<Vec<MatchResult>, ResolutionError> {
        let fuzzy = self.options.fuzzy.then_some(AUTOCOMPLETE_FUZZINESS);
        let mut hits = backend.search(field, &QueryPattern::prefix(stem).with_fuzzy(fuzzy), None)?;
        if hits.is_empty() && self.options.spell_correct {
            let corrected = correct_terms(backend, field, stem)?;
            if !corrected.eq_ignore_ascii_case(stem) {
                debug!(%field, stem = %stem, corrected = %corrected, "spelling correction");
                hits.extend(backend.search(field, &QueryPattern::exact(corrected), None)?);
            }
        }
        Ok(hits)
    }
}

/// Best correction per whitespace-separated term; terms without one are kept.
fn correct_terms<B: SearchBackend + ?Sized>(backend: &B, field: KbField, text: &str) -> Result<String, ResolutionError> {
    let mut corrected = Vec::new();
    for term in text.split_whitespace() {
        corrected.push(backend.spell_correct(field, term)?.unwrap_or_else(|| term.to_string()));
    }
    Ok(corrected.join(" "))
}
