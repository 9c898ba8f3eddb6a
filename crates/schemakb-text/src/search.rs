use std::collections::HashSet;
use std::ops::Range;
use std::path::{Path, PathBuf};

use tantivy::collector::TopDocs;
use tantivy::query::{AllQuery, BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::tokenizer::{TextAnalyzer, TokenStream};
use tantivy::{Index, IndexReader, ReloadPolicy, TantivyDocument, Term};
use tracing::debug;

use schemakb_core::error::ResolutionError;
use schemakb_core::traits::{QueryPattern, SearchBackend};
use schemakb_core::types::{bare_column_name, IndexDocument, KbField, MatchResult};

use crate::index::index_dir;
use crate::tantivy_utils::{register_tokenizer, KbFields};
use crate::vocabulary::{Vocabulary, SPELL_MAX_DISTANCE, SPELL_PREFIX_LEN};

/// Read-only handle on a built index. Cheap to share: every search takes its
/// own searcher snapshot and nothing mutates after `open`.
pub struct KbIndex {
	reader: IndexReader,
	fields: KbFields,
	analyzer: TextAnalyzer,
	synonym_terms: Vocabulary,
	value_terms: Vocabulary,
	path: PathBuf,
}

fn open_error(path: &Path, e: tantivy::TantivyError) -> ResolutionError {
	ResolutionError::Open { path: path.to_path_buf(), message: e.to_string() }
}

impl KbIndex {
	/// Open `<root>/<dataset_id>_kb_index`.
	pub fn open(root: &Path, dataset_id: &str) -> Result<Self, ResolutionError> {
		Self::open_dir(&index_dir(root, dataset_id))
	}

	pub fn open_dir(dir: &Path) -> Result<Self, ResolutionError> {
		if !dir.is_dir() { return Err(ResolutionError::IndexMissing(dir.to_path_buf())); }
		let index = Index::open_in_dir(dir).map_err(|e| open_error(dir, e))?;
		register_tokenizer(&index);
		let fields = KbFields::from_schema(&index.schema()).map_err(|e| open_error(dir, e))?;
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into().map_err(|e| open_error(dir, e))?;
		let analyzer = index.tokenizer_for_field(fields.synonyms).map_err(|e| open_error(dir, e))?;

		let searcher = reader.searcher();
		let synonym_terms = Vocabulary::load(&searcher, fields.synonyms).map_err(|e| open_error(dir, e))?;
		let value_terms = Vocabulary::load(&searcher, fields.unique_values).map_err(|e| open_error(dir, e))?;
		debug!(path = %dir.display(), docs = searcher.num_docs(), synonym_terms = synonym_terms.len(), value_terms = value_terms.len(), "opened index");

		Ok(Self { reader, fields, analyzer, synonym_terms, value_terms, path: dir.to_path_buf() })
	}

	pub fn num_docs(&self) -> u64 { self.reader.searcher().num_docs() }

	pub fn vocabulary(&self, field: KbField) -> &Vocabulary {
		match field {
			KbField::Synonyms => &self.synonym_terms,
			KbField::UniqueValues => &self.value_terms,
		}
	}

	/// Every stored document, in index order.
	pub fn documents(&self) -> Result<Vec<IndexDocument>, ResolutionError> {
		let searcher = self.reader.searcher();
		let total = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
		if total == 0 { return Ok(Vec::new()); }
		let mut top_docs = searcher.search(&AllQuery, &TopDocs::with_limit(total)).map_err(|e| open_error(&self.path, e))?;
		top_docs.sort_by_key(|(_, address)| (address.segment_ord, address.doc_id));
		let mut documents = Vec::with_capacity(top_docs.len());
		for (_, address) in top_docs {
			let doc: TantivyDocument = searcher.doc(address).map_err(|e| open_error(&self.path, e))?;
			documents.push(IndexDocument {
				column_name: first_text(&doc, self.fields.column_name).unwrap_or_default(),
				synonyms: all_text(&doc, self.fields.synonyms),
				unique_values: all_text(&doc, self.fields.unique_values),
			});
		}
		Ok(documents)
	}

	/// Lower-cased tokens of `text`, produced by the index tokenizer.
	pub fn analyze(&self, text: &str) -> Vec<String> {
		self.tokens_with_offsets(text).into_iter().map(|(t, _)| t).collect()
	}

	fn tokens_with_offsets(&self, text: &str) -> Vec<(String, Range<usize>)> {
		let mut analyzer = self.analyzer.clone();
		let mut stream = analyzer.token_stream(text);
		let mut tokens = Vec::new();
		while stream.advance() {
			let token = stream.token();
			tokens.push((token.text.clone(), token.offset_from..token.offset_to));
		}
		tokens
	}

	/// Byte ranges of `entry` whose tokens are among `terms`.
	pub fn highlights(&self, entry: &str, terms: &HashSet<String>) -> Vec<Range<usize>> {
		self.tokens_with_offsets(entry).into_iter().filter(|(t, _)| terms.contains(t)).map(|(_, span)| span).collect()
	}

	fn matched_entries(&self, entries: Vec<String>, terms: &HashSet<String>) -> Vec<String> {
		let mut matched: Vec<String> = Vec::new();
		for entry in entries {
			if !self.highlights(&entry, terms).is_empty() && !matched.contains(&entry) {
				matched.push(entry);
			}
		}
		matched
	}
}

impl SearchBackend for KbIndex {
	fn search(&self, field: KbField, pattern: &QueryPattern, limit: Option<usize>) -> Result<Vec<MatchResult>, ResolutionError> {
		let tokens = self.analyze(&pattern.text);
		if tokens.is_empty() { return Ok(Vec::new()); }
		let target: Field = self.fields.get(field);
		let vocabulary = self.vocabulary(field);

		// Tokens are ANDed; the concrete terms each one expands to are ORed.
		let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(tokens.len());
		let mut expanded_terms: HashSet<String> = HashSet::new();
		for token in &tokens {
			let expanded = vocabulary.expand(token, pattern.wildcard, pattern.fuzzy);
			if expanded.is_empty() {
				debug!(%field, token = %token, "no vocabulary match");
				return Ok(Vec::new());
			}
			let alternatives: Vec<(Occur, Box<dyn Query>)> = expanded
				.iter()
				.map(|t| {
					let q: Box<dyn Query> = Box::new(TermQuery::new(Term::from_field_text(target, t), IndexRecordOption::WithFreqs));
					(Occur::Should, q)
				})
				.collect();
			let clause: Box<dyn Query> = Box::new(BooleanQuery::new(alternatives));
			clauses.push((Occur::Must, clause));
			expanded_terms.extend(expanded);
		}
		let query = BooleanQuery::new(clauses);

		let searcher = self.reader.searcher();
		let total = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
		let limit = limit.unwrap_or(total).max(1);
		let top_docs = searcher.search(&query, &TopDocs::with_limit(limit)).map_err(|e| ResolutionError::search(field, e))?;

		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, address) in top_docs {
			let doc: TantivyDocument = searcher.doc(address).map_err(|e| ResolutionError::search(field, e))?;
			let label = first_text(&doc, self.fields.column_name).unwrap_or_default();
			let matched_terms = self.matched_entries(all_text(&doc, target), &expanded_terms);
			hits.push(MatchResult { column_name: bare_column_name(&label).to_string(), matched_terms, score });
		}
		debug!(%field, pattern = %pattern.text, hits = hits.len(), "search");
		Ok(hits)
	}

	fn spell_correct(&self, field: KbField, term: &str) -> Result<Option<String>, ResolutionError> {
		Ok(self.vocabulary(field).correct(term, SPELL_MAX_DISTANCE, SPELL_PREFIX_LEN))
	}
}

fn first_text(doc: &TantivyDocument, field: Field) -> Option<String> {
	doc.get_first(field).and_then(|v| v.as_str()).map(str::to_string)
}

fn all_text(doc: &TantivyDocument, field: Field) -> Vec<String> {
	doc.get_all(field).filter_map(|v| v.as_str().map(str::to_string)).collect()
}
