//! schemakb-core
//!
//! Domain types and search-independent pieces of the schema knowledge base:
//! column descriptors, keyword extraction, synonym generation and the
//! capability traits implemented by the tantivy crate.

pub mod config;
pub mod error;
pub mod keywords;
pub mod synonyms;
pub mod table;
pub mod traits;
pub mod types;

pub use error::{BuildError, ResolutionError};
pub use types::{ColumnDescriptor, DataType, IndexDocument, KbField, MatchResult, QueryTokens};
