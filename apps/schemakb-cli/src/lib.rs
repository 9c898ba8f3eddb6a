//! Shared start-up for the schemakb binaries.

use std::path::Path;

use anyhow::Context;
use schemakb_core::config::{Config, KbSettings};
use schemakb_core::keywords::KeywordExtractor;
use schemakb_resolve::SchemaKb;
use schemakb_text::KbIndex;
use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

pub fn load_settings() -> anyhow::Result<KbSettings> {
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    config.kb()
}

pub fn keyword_extractor(settings: &KbSettings) -> anyhow::Result<KeywordExtractor> {
    let cwd = std::env::current_dir()?;
    match settings.noise_words_path(&cwd) {
        Some(path) => KeywordExtractor::from_file(&path),
        None => Ok(KeywordExtractor::default()),
    }
}

/// Open the index for `dataset_id` under `index_root` (or the configured root).
pub fn open_session(settings: &KbSettings, dataset_id: &str, index_root: Option<&Path>) -> anyhow::Result<SchemaKb<KbIndex>> {
    let root = index_root.map(Path::to_path_buf).unwrap_or_else(|| settings.index_root());
    let index = KbIndex::open(&root, dataset_id).with_context(|| format!("dataset '{dataset_id}'"))?;
    Ok(SchemaKb::from_settings(index, settings, keyword_extractor(settings)?))
}
