//! Domain types shared by the index builder, resolver and autocomplete.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type tag inferred from a column's raw dtype name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Numeric,
    Text,
    Categorical,
    DateTime,
    Other,
}

impl DataType {
    /// Classify a loader dtype name such as `int64`, `object`,
    /// `category` or `datetime64[ns]`.
    pub fn classify(dtype: &str) -> Self {
        let d = dtype.trim().to_ascii_lowercase();
        if d.contains("datetime") {
            return DataType::DateTime;
        }
        match d.as_str() {
            "object" | "string" | "str" | "text" | "utf8" => DataType::Text,
            "category" | "categorical" => DataType::Categorical,
            "numeric" | "number" => DataType::Numeric,
            _ if d.starts_with("int")
                || d.starts_with("uint")
                || d.starts_with("float")
                || d.starts_with("decimal") =>
            {
                DataType::Numeric
            }
            _ => DataType::Other,
        }
    }

    /// Text and explicitly categorical columns get their distinct values indexed.
    pub fn is_categorical(self) -> bool {
        matches!(self, DataType::Text | DataType::Categorical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Numeric => "numeric",
            DataType::Text => "text",
            DataType::Categorical => "categorical",
            DataType::DateTime => "datetime",
            DataType::Other => "other",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one source-table column.
///
/// - `name`: unique key, the literal column header
/// - `dtype`: raw type name reported by the loader (kept for display and for
///   the datetime marker embedded in the synonyms field)
/// - `data_type`: semantic tag derived from `dtype`
/// - `synonyms`: display form first, then plural, then generated synonyms
/// - `unique_values`: distinct values, empty unless the column is categorical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub dtype: String,
    pub data_type: DataType,
    pub synonyms: Vec<String>,
    pub unique_values: Vec<String>,
}

/// The two tokenized, searchable fields of an index document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KbField {
    Synonyms,
    UniqueValues,
}

impl KbField {
    pub fn name(self) -> &'static str {
        match self {
            KbField::Synonyms => "synonyms",
            KbField::UniqueValues => "unique_values",
        }
    }
}

impl fmt::Display for KbField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Persisted, searchable form of a [`ColumnDescriptor`].
///
/// `synonyms` and `unique_values` are stored one entry per value so that a
/// hit can be traced back to the exact entry that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDocument {
    pub column_name: String,
    pub synonyms: Vec<String>,
    pub unique_values: Vec<String>,
}

impl IndexDocument {
    pub fn from_descriptor(descriptor: &ColumnDescriptor) -> Self {
        let mut synonyms = descriptor.synonyms.clone();
        if descriptor.data_type == DataType::DateTime {
            synonyms.push(descriptor.dtype.clone());
        }
        let unique_values = if descriptor.data_type.is_categorical() {
            descriptor.unique_values.clone()
        } else {
            Vec::new()
        };
        Self {
            column_name: column_label(&descriptor.name, &descriptor.dtype),
            synonyms,
            unique_values,
        }
    }

    pub fn joined_synonyms(&self) -> String {
        quote_list(&self.synonyms)
    }

    /// Empty string for non-categorical columns.
    pub fn joined_unique_values(&self) -> String {
        quote_list(&self.unique_values)
    }

    pub fn bare_name(&self) -> &str {
        bare_column_name(&self.column_name)
    }
}

/// `'<name>', '<dtype>'`, the value stored in the `column_name` field.
pub fn column_label(name: &str, dtype: &str) -> String {
    format!("'{name}', '{dtype}'")
}

/// Recover `<name>` from a `'<name>', '<dtype>'` label. Labels that do not
/// follow that shape are returned unchanged.
pub fn bare_column_name(label: &str) -> &str {
    let Some(inner) = label.strip_prefix('\'') else {
        return label;
    };
    match inner.rfind("', '") {
        Some(end) => &inner[..end],
        None => label,
    }
}

/// Render entries the way the schema fragment shows them: `'a', 'b'`.
pub fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One column hit from a single search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub column_name: String,
    pub matched_terms: Vec<String>,
    pub score: f32,
}

/// Output of keyword extraction.
///
/// `quoted` keeps literals verbatim; `free` is lower-cased and noise-filtered,
/// with the datetime markers appended when a date word was present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTokens {
    pub quoted: Vec<String>,
    pub free: Vec<String>,
    pub date_present: bool,
}

impl QueryTokens {
    /// Quoted literals first, then free tokens. Duplicates are kept.
    pub fn all(&self) -> Vec<String> {
        self.quoted.iter().chain(self.free.iter()).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.quoted.is_empty() && self.free.is_empty()
    }
}
