//! Layered configuration and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_KB__RESOLVE__MODE=flexi`). Typed
//! knowledge-base settings live under the `kb` key.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::ResolutionError;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new()
            .merge(Serialized::defaults(KbSettings::default()).key("kb"))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.kb()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment: Figment::new().merge(Serialized::defaults(KbSettings::default()).key("kb")).merge(figment) }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed `kb` settings, validated.
    pub fn kb(&self) -> anyhow::Result<KbSettings> {
        let settings: KbSettings = self.get("kb")?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Value-path matching: `strict` matches whole terms, `flexi` also
/// matches any term containing the keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Strict,
    Flexi,
}

impl std::str::FromStr for SearchMode {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(SearchMode::Strict),
            "flexi" => Ok(SearchMode::Flexi),
            other => Err(ResolutionError::InvalidConfig(format!("unknown search mode '{other}'"))),
        }
    }
}

/// How the synonym-path and value-path column sets are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    #[default]
    Union,
    Intersection,
}

impl std::str::FromStr for CombineMode {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "union" => Ok(CombineMode::Union),
            "intersection" => Ok(CombineMode::Intersection),
            other => Err(ResolutionError::InvalidConfig(format!("unknown combine mode '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynonymSettings {
    pub augment: bool,
    pub accept_partial: bool,
}

impl Default for SynonymSettings {
    fn default() -> Self {
        Self { augment: false, accept_partial: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveSettings {
    pub mode: SearchMode,
    pub combine: CombineMode,
    pub fuzzy: bool,
    pub synonym_limit: usize,
    pub value_limit: usize,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self { mode: SearchMode::Strict, combine: CombineMode::Union, fuzzy: false, synonym_limit: 30, value_limit: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestSettings {
    pub top_k: usize,
    pub fuzzy: bool,
    pub spell_correct: bool,
    pub min_stem_len: usize,
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self { top_k: 5, fuzzy: false, spell_correct: true, min_stem_len: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KbSettings {
    pub index_root: String,
    pub noise_words: Option<String>,
    pub synonyms: SynonymSettings,
    pub resolve: ResolveSettings,
    pub suggest: SuggestSettings,
}

impl Default for KbSettings {
    fn default() -> Self {
        Self {
            index_root: ".".to_string(),
            noise_words: None,
            synonyms: SynonymSettings::default(),
            resolve: ResolveSettings::default(),
            suggest: SuggestSettings::default(),
        }
    }
}

impl KbSettings {
    pub fn validate(&self) -> Result<(), ResolutionError> {
        if self.resolve.synonym_limit == 0 || self.resolve.value_limit == 0 {
            return Err(ResolutionError::InvalidConfig("search limits must be positive".into()));
        }
        if self.suggest.top_k == 0 {
            return Err(ResolutionError::InvalidConfig("suggest.top_k must be positive".into()));
        }
        Ok(())
    }

    pub fn index_root(&self) -> PathBuf {
        expand_path(&self.index_root)
    }

    /// Noise-word file resolved against `base` when relative.
    pub fn noise_words_path(&self, base: &Path) -> Option<PathBuf> {
        self.noise_words.as_ref().map(|p| resolve_with_base(base, p))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let settings = Config::from_figment(Figment::new()).kb().expect("defaults");
        assert_eq!(settings, KbSettings::default());
        assert_eq!(settings.resolve.synonym_limit, 30);
        assert_eq!(settings.suggest.top_k, 5);
    }

    #[test]
    fn toml_overrides_nested_keys() {
        let figment = Figment::new().merge(Toml::string(
            r#"
            [kb]
            index_root = "/tmp/kb"
            [kb.resolve]
            mode = "flexi"
            combine = "intersection"
            [kb.suggest]
            top_k = 3
            "#,
        ));
        let settings = Config::from_figment(figment).kb().expect("settings");
        assert_eq!(settings.index_root(), PathBuf::from("/tmp/kb"));
        assert_eq!(settings.resolve.mode, SearchMode::Flexi);
        assert_eq!(settings.resolve.combine, CombineMode::Intersection);
        assert_eq!(settings.resolve.value_limit, 10);
        assert_eq!(settings.suggest.top_k, 3);
        assert!(settings.suggest.spell_correct);
    }

    #[test]
    fn rejects_unknown_modes_and_zero_limits() {
        let figment = Figment::new().merge(Toml::string("[kb.resolve]\nmode = \"loose\"\n"));
        assert!(Config::from_figment(figment).kb().is_err());

        let figment = Figment::new().merge(Toml::string("[kb.suggest]\ntop_k = 0\n"));
        assert!(Config::from_figment(figment).kb().is_err());

        assert!("flexi".parse::<SearchMode>().is_ok());
        assert!("both".parse::<CombineMode>().is_err());
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let settings = KbSettings { noise_words: Some("words.txt".into()), ..KbSettings::default() };
        assert_eq!(settings.noise_words_path(Path::new("/data")), Some(PathBuf::from("/data/words.txt")));
        assert_eq!(resolve_with_base(Path::new("/data"), "/abs/x"), PathBuf::from("/abs/x"));
    }
}
