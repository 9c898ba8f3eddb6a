use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer};
use tantivy::Index;

use schemakb_core::types::KbField;

pub const TOKENIZER: &str = "kb_text";

pub const COLUMN_NAME: &str = "column_name";

#[derive(Debug, Clone, Copy)]
pub struct KbFields {
	pub column_name: Field,
	pub synonyms: Field,
	pub unique_values: Field,
}

impl KbFields {
	pub fn from_schema(schema: &Schema) -> tantivy::Result<Self> {
		Ok(Self {
			column_name: schema.get_field(COLUMN_NAME)?,
			synonyms: schema.get_field(KbField::Synonyms.name())?,
			unique_values: schema.get_field(KbField::UniqueValues.name())?,
		})
	}

	pub fn get(&self, field: KbField) -> Field {
		match field {
			KbField::Synonyms => self.synonyms,
			KbField::UniqueValues => self.unique_values,
		}
	}
}

/// `column_name` is an exact-match identifier; `synonyms` and `unique_values`
/// are tokenized, positional and stored one entry per value.
pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let _column_name = schema_builder.add_text_field(COLUMN_NAME, STRING | STORED);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing).set_stored();
	let _synonyms = schema_builder.add_text_field(KbField::Synonyms.name(), text_options.clone());
	let _unique_values = schema_builder.add_text_field(KbField::UniqueValues.name(), text_options);
	schema_builder.build()
}

pub fn analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(RemoveLongFilter::limit(40))
		.filter(LowerCaser)
		.build()
}

pub fn register_tokenizer(index: &Index) {
	index.tokenizers().register(TOKENIZER, analyzer());
}
