//! In-memory view of a field's term dictionary.
//!
//! The index is immutable once built, so the vocabulary is read once at open
//! time and reused for pattern expansion and spelling correction.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use tantivy::schema::Field;
use tantivy::Searcher;

use schemakb_core::traits::{Fuzziness, Wildcard};

/// Spelling correction searches at most this many edits away.
pub const SPELL_MAX_DISTANCE: usize = 2;
/// Suggestions must share this many leading characters with the input.
pub const SPELL_PREFIX_LEN: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
	terms: BTreeMap<String, u64>,
}

impl Vocabulary {
	/// Collect every term of `field` with its document frequency summed
	/// across segments.
	pub fn load(searcher: &Searcher, field: Field) -> tantivy::Result<Self> {
		let mut terms = BTreeMap::new();
		for segment_reader in searcher.segment_readers() {
			let inverted_index = segment_reader.inverted_index(field)?;
			let mut stream = inverted_index.terms().stream()?;
			while stream.advance() {
				if let Ok(term) = std::str::from_utf8(stream.key()) {
					*terms.entry(term.to_string()).or_insert(0) += u64::from(stream.value().doc_freq);
				}
			}
		}
		Ok(Self { terms })
	}

	pub fn from_terms<I, S>(terms: I) -> Self
	where
		I: IntoIterator<Item = (S, u64)>,
		S: Into<String>,
	{
		Self { terms: terms.into_iter().map(|(t, f)| (t.into(), f)).collect() }
	}

	pub fn len(&self) -> usize { self.terms.len() }

	pub fn is_empty(&self) -> bool { self.terms.is_empty() }

	fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a String, &'a u64)> + 'a {
		self.terms.range::<str, _>((Bound::Included(prefix), Bound::Unbounded)).take_while(move |(t, _)| t.starts_with(prefix))
	}

	/// Concrete terms a (lower-cased) token matches under `wildcard`, plus
	/// those within `fuzzy` edit distance.
	pub fn expand(&self, token: &str, wildcard: Wildcard, fuzzy: Option<Fuzziness>) -> BTreeSet<String> {
		let mut out: BTreeSet<String> = match wildcard {
			Wildcard::Exact => self.terms.get_key_value(token).map(|(t, _)| t.clone()).into_iter().collect(),
			Wildcard::Prefix => self.with_prefix(token).map(|(t, _)| t.clone()).collect(),
			Wildcard::Contains => self.terms.keys().filter(|t| t.contains(token)).cloned().collect(),
		};
		if let Some(f) = fuzzy {
			let prefix = char_prefix(token, f.prefix_len);
			let max = usize::from(f.max_distance);
			out.extend(
				self.with_prefix(prefix)
					.filter(|(t, _)| strsim::levenshtein(t, token) <= max)
					.map(|(t, _)| t.clone()),
			);
		}
		out
	}

	/// Closest term sharing the first `prefix_len` characters with `term`,
	/// at most `max_distance` edits away. Ties go to the more frequent term,
	/// then to lexical order.
	pub fn correct(&self, term: &str, max_distance: usize, prefix_len: usize) -> Option<String> {
		let term = term.to_lowercase();
		let prefix = char_prefix(&term, prefix_len);
		self.with_prefix(prefix)
			.map(|(t, freq)| (strsim::levenshtein(t, &term), Reverse(*freq), t))
			.filter(|(distance, _, _)| *distance <= max_distance)
			.min()
			.map(|(_, _, t)| t.clone())
	}
}

fn char_prefix(s: &str, n: usize) -> &str {
	match s.char_indices().nth(n) {
		Some((idx, _)) => &s[..idx],
		None => s,
	}
}
