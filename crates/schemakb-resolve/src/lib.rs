//! schemakb-resolve
//!
//! Query-time side of the schema knowledge base: the column resolver that
//! renders a schema fragment for a question, and sentence autocomplete.
//! Both only need a [`SearchBackend`].

pub mod autocomplete;
pub mod resolver;

#[cfg(test)]
mod testing;

use tracing::debug;

use schemakb_core::config::KbSettings;
use schemakb_core::error::ResolutionError;
use schemakb_core::keywords::KeywordExtractor;
use schemakb_core::traits::SearchBackend;

pub use autocomplete::{rank_candidates, value_candidate, Autocomplete, SuggestOptions};
pub use resolver::{combine, render_schema, ColumnMatches, ColumnResolver, Resolution, ResolveOptions};

/// A dataset session: one opened index plus the settings used to query it.
/// Holds no mutable state, so a single instance can serve concurrent callers.
pub struct SchemaKb<B: SearchBackend> {
    backend: B,
    extractor: KeywordExtractor,
    resolve: ResolveOptions,
    suggest: SuggestOptions,
}

impl<B: SearchBackend> SchemaKb<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, extractor: KeywordExtractor::default(), resolve: ResolveOptions::default(), suggest: SuggestOptions::default() }
    }

    pub fn from_settings(backend: B, settings: &KbSettings, extractor: KeywordExtractor) -> Self {
        Self { backend, extractor, resolve: ResolveOptions::from(&settings.resolve), suggest: SuggestOptions::from(&settings.suggest) }
    }

    pub fn with_extractor(mut self, extractor: KeywordExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_resolve_options(mut self, options: ResolveOptions) -> Self {
        self.resolve = options;
        self
    }

    pub fn with_suggest_options(mut self, options: SuggestOptions) -> Self {
        self.suggest = options;
        self
    }

    /// Extract keywords from `query` and resolve them to columns.
    pub fn resolve(&self, query: &str) -> Result<Resolution, ResolutionError> {
        let tokens = self.extractor.extract(query);
        if tokens.is_empty() {
            debug!(query, "no keywords left after extraction");
        }
        ColumnResolver::new(&self.backend, self.resolve).resolve(&tokens)
    }

    /// Schema fragment describing the columns `query` refers to.
    pub fn dynamic_schema(&self, query: &str) -> Result<String, ResolutionError> {
        Ok(self.resolve(query)?.schema)
    }

    pub fn suggest(&self, text: &str) -> Vec<String> {
        Autocomplete::new(Some(&self.backend), self.suggest).suggest(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use schemakb_core::config::{CombineMode, SearchMode};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn session_is_shareable() {
        assert_send_sync::<SchemaKb<FakeBackend>>();
    }

    #[test]
    fn dynamic_schema_end_to_end() {
        let backend = FakeBackend::new()
            .synonym("Revenue", 2.0, &["Revenue", "Revenues"])
            .synonym("Region", 1.0, &["Region", "Regions", "area"])
            .value("Region", 1.0, &["East", "West"]);
        let kb = SchemaKb::new(backend);
        let schema = kb.dynamic_schema("show revenue by area for 'East'").unwrap();
        assert_eq!(
            schema,
            "Revenue -- also referred to as: 'Revenue', 'Revenues'\nRegion -- has these unique values: 'East'\n"
        );

        let kb = kb.with_resolve_options(ResolveOptions { combine: CombineMode::Intersection, mode: SearchMode::Strict, ..ResolveOptions::default() });
        assert_eq!(kb.resolve("show revenue by area for 'East'").unwrap().columns, vec!["Region"]);
        assert_eq!(kb.suggest("sum reve"), vec!["sum Revenue"]);
    }
}
