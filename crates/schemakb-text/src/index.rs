use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tantivy::{Index, IndexWriter, TantivyDocument};
use tracing::{debug, info, warn};

use schemakb_core::error::{BuildError, ResolutionError};
use schemakb_core::synonyms::SynonymGenerator;
use schemakb_core::table::describe_columns;
use schemakb_core::traits::TableSource;
use schemakb_core::types::{ColumnDescriptor, IndexDocument};

use crate::tantivy_utils::{build_schema, register_tokenizer, KbFields};

const WRITER_MEMORY: usize = 50_000_000;

/// `<root>/<dataset_id>_kb_index`
pub fn index_dir(root: &Path, dataset_id: &str) -> PathBuf {
	root.join(format!("{dataset_id}_kb_index"))
}

/// `<root>/<dataset_id>.json`, the raw descriptor mapping kept next to the index.
pub fn descriptors_path(root: &Path, dataset_id: &str) -> PathBuf {
	root.join(format!("{dataset_id}.json"))
}

/// An index is available when its directory exists.
pub fn index_exists(root: &Path, dataset_id: &str) -> bool {
	index_dir(root, dataset_id).is_dir()
}

pub fn load_descriptors(root: &Path, dataset_id: &str) -> Result<Vec<ColumnDescriptor>, ResolutionError> {
	let path = descriptors_path(root, dataset_id);
	let content = std::fs::read_to_string(&path).map_err(|e| ResolutionError::Open { path: path.clone(), message: e.to_string() })?;
	serde_json::from_str(&content).map_err(|e| ResolutionError::Open { path, message: e.to_string() })
}

#[derive(Debug, Clone)]
pub struct BuildReport {
	pub index_dir: PathBuf,
	pub descriptors_path: PathBuf,
	pub documents: usize,
}

/// Writes the per-dataset index. Each build replaces the previous index
/// wholesale; nothing is ever appended to an existing one.
pub struct KbIndexBuilder {
	root: PathBuf,
	synonyms: SynonymGenerator,
}

impl KbIndexBuilder {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into(), synonyms: SynonymGenerator::new() }
	}

	pub fn with_synonyms(mut self, synonyms: SynonymGenerator) -> Self {
		self.synonyms = synonyms;
		self
	}

	/// Describe every column of `table` and index it under `dataset_id`.
	pub fn build<T: TableSource + ?Sized>(&self, dataset_id: &str, table: &T) -> Result<BuildReport, BuildError> {
		let descriptors = describe_columns(table, &self.synonyms)?;
		self.build_from_descriptors(dataset_id, &descriptors)
	}

	pub fn build_from_descriptors(&self, dataset_id: &str, descriptors: &[ColumnDescriptor]) -> Result<BuildReport, BuildError> {
		if dataset_id.trim().is_empty() { return Err(BuildError::EmptyDatasetId); }
		let mut seen = HashSet::new();
		if let Some(dup) = descriptors.iter().find(|d| !seen.insert(d.name.as_str())) {
			return Err(BuildError::Dataset(format!("duplicate column '{}'", dup.name)));
		}

		let final_dir = index_dir(&self.root, dataset_id);
		let staging_dir = self.root.join(format!("{dataset_id}_kb_index.staging"));
		let io_err = |path: &Path, e: std::io::Error| BuildError::IndexWrite { path: path.to_path_buf(), message: e.to_string() };

		std::fs::create_dir_all(&self.root).map_err(|e| io_err(&self.root, e))?;
		if final_dir.exists() {
			info!(path = %final_dir.display(), "removing previous index");
			std::fs::remove_dir_all(&final_dir).map_err(|e| io_err(&final_dir, e))?;
		}
		if staging_dir.exists() {
			std::fs::remove_dir_all(&staging_dir).map_err(|e| io_err(&staging_dir, e))?;
		}

		let documents: Vec<IndexDocument> = descriptors.iter().map(IndexDocument::from_descriptor).collect();
		if let Err(e) = write_index(&staging_dir, &documents) {
			cleanup(&staging_dir);
			return Err(e);
		}
		if let Err(e) = std::fs::rename(&staging_dir, &final_dir) {
			cleanup(&staging_dir);
			return Err(io_err(&final_dir, e));
		}

		let descriptors_file = descriptors_path(&self.root, dataset_id);
		if let Err(e) = write_descriptors(&descriptors_file, descriptors) {
			cleanup(&final_dir);
			return Err(e);
		}

		info!(dataset = dataset_id, documents = documents.len(), path = %final_dir.display(), "index built");
		Ok(BuildReport { index_dir: final_dir, descriptors_path: descriptors_file, documents: documents.len() })
	}
}

fn write_index(dir: &Path, documents: &[IndexDocument]) -> Result<(), BuildError> {
	let tantivy_err = |e: tantivy::TantivyError| BuildError::IndexWrite { path: dir.to_path_buf(), message: e.to_string() };
	std::fs::create_dir_all(dir).map_err(|e| BuildError::IndexWrite { path: dir.to_path_buf(), message: e.to_string() })?;

	let schema = build_schema();
	let index = Index::create_in_dir(dir, schema.clone()).map_err(tantivy_err)?;
	register_tokenizer(&index);
	let fields = KbFields::from_schema(&schema).map_err(tantivy_err)?;

	let mut index_writer: IndexWriter = index.writer(WRITER_MEMORY).map_err(tantivy_err)?;
	for d in documents {
		debug!(column_name = %d.column_name, synonyms = %d.joined_synonyms(), unique_values = %d.joined_unique_values(), "adding document");
		let mut doc = TantivyDocument::default();
		doc.add_text(fields.column_name, &d.column_name);
		for s in &d.synonyms { doc.add_text(fields.synonyms, s); }
		for v in &d.unique_values { doc.add_text(fields.unique_values, v); }
		index_writer.add_document(doc).map_err(tantivy_err)?;
	}
	index_writer.commit().map_err(tantivy_err)?;
	index_writer.wait_merging_threads().map_err(tantivy_err)?;
	Ok(())
}

fn write_descriptors(path: &Path, descriptors: &[ColumnDescriptor]) -> Result<(), BuildError> {
	let err = |message: String| BuildError::Descriptors { path: path.to_path_buf(), message };
	let json = serde_json::to_string_pretty(descriptors).map_err(|e| err(e.to_string()))?;
	std::fs::write(path, json).map_err(|e| err(e.to_string()))
}

fn cleanup(dir: &Path) {
	if dir.exists() {
		if let Err(e) = std::fs::remove_dir_all(dir) {
			warn!(path = %dir.display(), error = %e, "failed to remove incomplete index");
		}
	}
}
