//! Maps extracted keywords to the columns they refer to.
//!
//! Every keyword is searched twice: against column synonyms (always as a
//! substring) and against categorical values (substring in `flexi` mode,
//! whole term in `strict` mode). The two column sets are then combined and
//! rendered as a schema fragment, one line per column.

use tracing::{debug, info};

use schemakb_core::config::{CombineMode, ResolveSettings, SearchMode};
use schemakb_core::error::ResolutionError;
use schemakb_core::traits::{Fuzziness, QueryPattern, SearchBackend};
use schemakb_core::types::{quote_list, KbField, QueryTokens};

/// Edit distance 1, no required prefix.
pub const RESOLVE_FUZZINESS: Fuzziness = Fuzziness { max_distance: 1, prefix_len: 0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub mode: SearchMode,
    pub combine: CombineMode,
    pub fuzzy: bool,
    pub synonym_limit: usize,
    pub value_limit: usize,
}

impl From<&ResolveSettings> for ResolveOptions {
    fn from(s: &ResolveSettings) -> Self {
        Self { mode: s.mode, combine: s.combine, fuzzy: s.fuzzy, synonym_limit: s.synonym_limit, value_limit: s.value_limit }
    }
}

impl Default for ResolveOptions {
    fn default() -> Self { Self::from(&ResolveSettings::default()) }
}

/// Matched entries per column. Columns keep first-seen order and a column's
/// entries are never listed twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMatches {
    columns: Vec<(String, Vec<String>)>,
}

impl ColumnMatches {
    pub fn new() -> Self { Self::default() }

    pub fn record<I: IntoIterator<Item = String>>(&mut self, column: &str, terms: I) {
        let idx = match self.columns.iter().position(|(c, _)| c == column) {
            Some(idx) => idx,
            None => {
                self.columns.push((column.to_string(), Vec::new()));
                self.columns.len() - 1
            }
        };
        let entries = &mut self.columns[idx].1;
        for term in terms {
            if !entries.contains(&term) { entries.push(term); }
        }
    }

    pub fn contains(&self, column: &str) -> bool { self.columns.iter().any(|(c, _)| c == column) }

    /// Entries recorded for `column`, empty when the column never matched.
    pub fn terms(&self, column: &str) -> &[String] {
        self.columns.iter().find(|(c, _)| c == column).map(|(_, t)| t.as_slice()).unwrap_or_default()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> + '_ { self.columns.iter().map(|(c, _)| c.as_str()) }

    pub fn len(&self) -> usize { self.columns.len() }

    pub fn is_empty(&self) -> bool { self.columns.is_empty() }
}

/// Union keeps synonym-path columns first, then value-only columns.
/// Intersection keeps synonym-path order.
pub fn combine(synonyms: &ColumnMatches, values: &ColumnMatches, mode: CombineMode) -> Vec<String> {
    match mode {
        CombineMode::Union => synonyms
            .columns()
            .chain(values.columns().filter(|c| !synonyms.contains(c)))
            .map(str::to_string)
            .collect(),
        CombineMode::Intersection => synonyms.columns().filter(|c| values.contains(c)).map(str::to_string).collect(),
    }
}

/// One line per column: matched values when there are any, otherwise the
/// synonyms that matched.
pub fn render_schema(columns: &[String], synonyms: &ColumnMatches, values: &ColumnMatches) -> String {
    let mut schema = String::new();
    for column in columns {
        let matched_values = values.terms(column);
        if matched_values.is_empty() {
            schema.push_str(&format!("{column} -- also referred to as: {}\n", quote_list(synonyms.terms(column))));
        } else {
            schema.push_str(&format!("{column} -- has these unique values: {}\n", quote_list(matched_values)));
        }
    }
    schema
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub columns: Vec<String>,
    pub synonym_matches: ColumnMatches,
    pub value_matches: ColumnMatches,
    pub schema: String,
}

pub struct ColumnResolver<'a, B: SearchBackend + ?Sized> {
    backend: &'a B,
    options: ResolveOptions,
}

impl<'a, B: SearchBackend + ?Sized> ColumnResolver<'a, B> {
    pub fn new(backend: &'a B, options: ResolveOptions) -> Self { Self { backend, options } }

    fn fuzziness(&self) -> Option<Fuzziness> { self.options.fuzzy.then_some(RESOLVE_FUZZINESS) }

    pub fn match_synonyms(&self, keywords: &[String]) -> Result<ColumnMatches, ResolutionError> {
        let mut matches = ColumnMatches::new();
        for keyword in keywords {
            let pattern = QueryPattern::contains(keyword.as_str()).with_fuzzy(self.fuzziness());
            let hits = self.backend.search(KbField::Synonyms, &pattern, Some(self.options.synonym_limit))?;
            debug!(keyword = %keyword, hits = hits.len(), "synonym path");
            for hit in hits {
                matches.record(&hit.column_name, hit.matched_terms);
            }
        }
        Ok(matches)
    }

    pub fn match_values(&self, keywords: &[String]) -> Result<ColumnMatches, ResolutionError> {
        let mut matches = ColumnMatches::new();
        for keyword in keywords {
            let pattern = match self.options.mode {
                SearchMode::Strict => QueryPattern::exact(keyword.as_str()),
                SearchMode::Flexi => QueryPattern::contains(keyword.as_str()),
            }
            .with_fuzzy(self.fuzziness());
            let hits = self.backend.search(KbField::UniqueValues, &pattern, Some(self.options.value_limit))?;
            debug!(keyword = %keyword, hits = hits.len(), "value path");
            for hit in hits {
                matches.record(&hit.column_name, hit.matched_terms);
            }
        }
        Ok(matches)
    }

    /// Any search failure aborts the whole resolution.
    pub fn resolve(&self, tokens: &QueryTokens) -> Result<Resolution, ResolutionError> {
        let keywords = tokens.all();
        let synonym_matches = self.match_synonyms(&keywords)?;
        let value_matches = self.match_values(&keywords)?;
        let columns = combine(&synonym_matches, &value_matches, self.options.combine);
        let schema = render_schema(&columns, &synonym_matches, &value_matches);
        info!(keywords = keywords.len(), synonym_columns = synonym_matches.len(), value_columns = value_matches.len(), columns = columns.len(), "resolved columns");
        Ok(Resolution { columns, synonym_matches, value_matches, schema })
    }
}
