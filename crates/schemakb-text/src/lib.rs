//! schemakb-text
//!
//! Tantivy-backed schema index: the builder writes one document per column,
//! `KbIndex` reopens it read-only and implements the search capability used
//! by the resolver and autocomplete.

pub mod tantivy_utils;
pub mod vocabulary;
pub mod index;
pub mod search;

pub use index::{descriptors_path, index_dir, index_exists, load_descriptors, BuildReport, KbIndexBuilder};
pub use search::KbIndex;
pub use vocabulary::Vocabulary;
