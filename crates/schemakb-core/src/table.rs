//! Column metadata for a loaded table, and the descriptors derived from it.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::synonyms::SynonymGenerator;
use crate::traits::TableSource;
use crate::types::{ColumnDescriptor, DataType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    pub dtype: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A table held in memory, as produced by an external loader.
///
/// Serialized form: `{"columns": [{"name": .., "dtype": .., "values": [..]}]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryTable {
    pub columns: Vec<TableColumn>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column<I, S>(mut self, name: &str, dtype: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.push(TableColumn {
            name: name.to_string(),
            dtype: dtype.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn from_json_file(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BuildError::Dataset(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| BuildError::Dataset(format!("{}: {}", path.display(), e)))
    }

    fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl TableSource for InMemoryTable {
    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    fn dtype(&self, column: &str) -> Option<String> {
        self.column(column).map(|c| c.dtype.clone())
    }

    fn distinct_values(&self, column: &str) -> Option<Vec<String>> {
        let col = self.column(column)?;
        let mut seen = HashSet::new();
        Some(col.values.iter().filter(|v| seen.insert(v.as_str())).cloned().collect())
    }
}

/// Distinct values for each of `columns`. Asking for a column the table does
/// not have is an error rather than an empty list.
pub fn unique_values<T: TableSource + ?Sized>(
    table: &T,
    columns: &[String],
) -> Result<Vec<(String, Vec<String>)>, BuildError> {
    columns
        .iter()
        .map(|c| {
            table
                .distinct_values(c)
                .map(|values| (c.clone(), values))
                .ok_or_else(|| BuildError::UnknownColumn(c.clone()))
        })
        .collect()
}

/// One descriptor per table column, in table order.
pub fn describe_columns<T: TableSource + ?Sized>(
    table: &T,
    synonyms: &SynonymGenerator,
) -> Result<Vec<ColumnDescriptor>, BuildError> {
    let mut descriptors = Vec::new();
    for name in table.column_names() {
        let dtype = table.dtype(&name).ok_or_else(|| BuildError::UnknownColumn(name.clone()))?;
        let data_type = DataType::classify(&dtype);
        let unique_values = if data_type.is_categorical() {
            unique_values(table, std::slice::from_ref(&name))?
                .pop()
                .map(|(_, values)| values)
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        descriptors.push(ColumnDescriptor {
            synonyms: synonyms.synonyms_for(&name),
            name,
            dtype,
            data_type,
            unique_values,
        });
    }
    Ok(descriptors)
}
