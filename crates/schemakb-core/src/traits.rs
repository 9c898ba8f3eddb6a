use crate::error::ResolutionError;
use crate::synonyms::Augmentation;
use crate::types::{KbField, MatchResult};

/// Supplies column metadata from an already loaded table.
pub trait TableSource {
    /// Column names in table order.
    fn column_names(&self) -> Vec<String>;
    /// Raw dtype name as reported by the loader, `None` for an unknown column.
    fn dtype(&self, column: &str) -> Option<String>;
    /// Distinct values in first-seen order, `None` for an unknown column.
    fn distinct_values(&self, column: &str) -> Option<Vec<String>>;
}

/// Read-only search capability over a built index.
///
/// Implementations must be safe for concurrent readers: nothing here mutates
/// index state.
pub trait SearchBackend: Send + Sync {
    /// Run `pattern` (see [`crate::traits::QueryPattern`]) against one field and
    /// return ranked hits, each carrying the stored entries that matched.
    /// `limit = None` returns every matching document.
    fn search(
        &self,
        field: KbField,
        pattern: &QueryPattern,
        limit: Option<usize>,
    ) -> Result<Vec<MatchResult>, ResolutionError>;

    /// Closest in-vocabulary term for `term` on `field`, if any.
    fn spell_correct(&self, field: KbField, term: &str) -> Result<Option<String>, ResolutionError>;
}

/// Optional model-assisted synonym generation. Best effort.
pub trait SynonymSource: Send + Sync {
    fn generate(&self, display_forms: &[String]) -> Augmentation;
}

/// How a token is matched against the field vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcard {
    Exact,
    Prefix,
    Contains,
}

/// Bounded edit-distance matching with a required common prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fuzziness {
    pub max_distance: u8,
    pub prefix_len: usize,
}

/// Max edit distance 1 with a 3-character common prefix.
pub const AUTOCOMPLETE_FUZZINESS: Fuzziness = Fuzziness { max_distance: 1, prefix_len: 3 };

/// A parsed search string.
///
/// Syntax: `*text*` contains, `text*` prefix, `text~D/P` fuzzy with edit
/// distance `D` and common prefix `P`, plain text exact. Wildcards and a
/// fuzzy suffix can be combined (`*text*~1/3`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPattern {
    pub text: String,
    pub wildcard: Wildcard,
    pub fuzzy: Option<Fuzziness>,
}

impl QueryPattern {
    pub fn exact(text: impl Into<String>) -> Self {
        Self { text: text.into(), wildcard: Wildcard::Exact, fuzzy: None }
    }

    pub fn contains(text: impl Into<String>) -> Self {
        Self { text: text.into(), wildcard: Wildcard::Contains, fuzzy: None }
    }

    pub fn prefix(text: impl Into<String>) -> Self {
        Self { text: text.into(), wildcard: Wildcard::Prefix, fuzzy: None }
    }

    pub fn with_fuzzy(mut self, fuzzy: Option<Fuzziness>) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn parse(input: &str) -> Self {
        let (body, fuzzy) = split_fuzzy_suffix(input.trim());
        let (body, wildcard) = match (body.strip_prefix('*'), body.ends_with('*')) {
            (Some(rest), true) => (rest.strip_suffix('*').unwrap_or(rest), Wildcard::Contains),
            (Some(rest), false) => (rest, Wildcard::Contains),
            (None, true) => (body.strip_suffix('*').unwrap_or(body), Wildcard::Prefix),
            (None, false) => (body, Wildcard::Exact),
        };
        Self { text: body.to_string(), wildcard, fuzzy }
    }
}

fn split_fuzzy_suffix(input: &str) -> (&str, Option<Fuzziness>) {
    let Some(pos) = input.rfind('~') else {
        return (input, None);
    };
    let (body, suffix) = (&input[..pos], &input[pos + 1..]);
    let mut parts = suffix.splitn(2, '/');
    let distance = parts.next().unwrap_or("");
    let distance = if distance.is_empty() { Some(1) } else { distance.parse::<u8>().ok() };
    let prefix_len = match parts.next() {
        Some(p) => p.parse::<usize>().ok(),
        None => Some(0),
    };
    match (distance, prefix_len) {
        (Some(max_distance), Some(prefix_len)) if !body.is_empty() => {
            (body, Some(Fuzziness { max_distance, prefix_len }))
        }
        _ => (input, None),
    }
}
